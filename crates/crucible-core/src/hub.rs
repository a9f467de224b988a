//! The hub: request normalization and plugin dispatch.
//!
//! A `Hub` owns its registry, its two memo tables (one for transpile
//! results, one for interpreted values) and a content loader. Handles are
//! cheap to clone and share the same state, so plugins receive a `Hub` and
//! may re-enter it recursively.

use serde_json::Value;

use crate::cache::MemoTable;
use crate::error::HubError;
use crate::loader::ContentLoader;
use crate::registry::Registry;
use crate::request::{
    language_from_location, synthesize_location, CachedPayload, InterpretRequest,
    LanguageSelector, NormalizedRequest, TranspileRequest, SOURCE_PREFIX,
};

/// Result envelope of a transpile dispatch.
#[derive(Debug, Clone)]
pub struct Transpiled {
    /// The produced text.
    pub text: String,
    /// Opaque diagnostics from the compiler plugin.
    pub diagnostics: Option<Value>,
    /// The normalized request the text was produced for.
    pub request: NormalizedRequest,
}

/// Result envelope of an interpret dispatch.
#[derive(Debug, Clone)]
pub struct Interpreted {
    /// The produced value.
    pub value: Value,
    /// The normalized request the value was produced for.
    pub request: NormalizedRequest,
}

struct HubState {
    registry: Registry,
    loader: ContentLoader,
    transpile_cache: MemoTable<CachedPayload>,
    interpret_cache: MemoTable<CachedPayload>,
}

/// A compilation hub handle. Clones share registry, caches and loader.
#[derive(Clone)]
pub struct Hub {
    state: std::sync::Arc<HubState>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    /// Create a hub with an empty registry.
    pub fn new() -> Self {
        Self {
            state: std::sync::Arc::new(HubState {
                registry: Registry::new(),
                loader: ContentLoader::new(),
                transpile_cache: MemoTable::new(),
                interpret_cache: MemoTable::new(),
            }),
        }
    }

    /// Create a hub pre-populated with the built-in plugin set.
    pub fn with_builtins() -> Self {
        let hub = Self::new();
        crate::builtin::register_defaults(&hub)
            .expect("built-in language tags are valid");
        hub
    }

    /// The plugin registry.
    pub fn registry(&self) -> &Registry {
        &self.state.registry
    }

    /// The content loader.
    pub fn loader(&self) -> &ContentLoader {
        &self.state.loader
    }

    /// The directory relative locations resolve against.
    pub fn root_dir(&self) -> std::path::PathBuf {
        self.state.loader.root_dir()
    }

    /// Set the root directory for relative locations.
    pub fn set_root_dir(&self, path: impl Into<std::path::PathBuf>) -> Result<(), HubError> {
        self.state.loader.set_root_dir(path)
    }

    /// Atomically replace the transpile memo table with an empty one.
    pub fn clear_transpile_cache(&self) {
        self.state.transpile_cache.clear();
    }

    /// Atomically replace the interpret memo table with an empty one.
    pub fn clear_interpret_cache(&self) {
        self.state.interpret_cache.clear();
    }

    /// Transpile a document: normalize, consult the cache, dispatch, store.
    pub async fn transpile(&self, request: TranspileRequest) -> Result<Transpiled, HubError> {
        let mut request = self.normalize_transpile(request).await?;

        if let Some(payload) = request.take_cached() {
            let CachedPayload::Text { text, diagnostics } = payload else {
                return Err(HubError::ContractViolation(
                    "transpile cache entry has the wrong shape".into(),
                ));
            };
            return Ok(Transpiled {
                text,
                diagnostics,
                request,
            });
        }

        let LanguageSelector::Pair { input, output } = request.selector.clone() else {
            return Err(HubError::InvalidArgument(
                "a transpile request requires a language pair".into(),
            ));
        };

        let Some(plugin) = self.state.registry.transpiler(&input, &output)? else {
            if request.debug {
                tracing::warn!(
                    input = %input,
                    output = %output,
                    "no transpiler matches the language pair"
                );
            }
            return Err(HubError::UnsupportedLanguagePair { input, output });
        };

        let produced = plugin(self.clone(), request.clone()).await?;
        if produced.text.is_empty() {
            return Err(HubError::ContractViolation(
                "transpilers must produce non-empty output text".into(),
            ));
        }

        // The plugin may have suspended; the key can be populated by now.
        if request.allow_cache {
            if let Some(key) = &request.cache_key {
                if !self.state.transpile_cache.has(key) {
                    if request.debug {
                        tracing::debug!(location = %request.location, key = %key, "caching result");
                    }
                    self.state.transpile_cache.set(
                        key,
                        CachedPayload::Text {
                            text: produced.text.clone(),
                            diagnostics: produced.diagnostics.clone(),
                        },
                    );
                }
            }
        }

        Ok(Transpiled {
            text: produced.text,
            diagnostics: produced.diagnostics,
            request,
        })
    }

    /// Interpret a document into a runtime value.
    pub async fn interpret(&self, request: InterpretRequest) -> Result<Interpreted, HubError> {
        let mut request = self.normalize_interpret(request).await?;

        if let Some(payload) = request.take_cached() {
            let CachedPayload::Value(value) = payload else {
                return Err(HubError::ContractViolation(
                    "interpret cache entry has the wrong shape".into(),
                ));
            };
            return Ok(Interpreted { value, request });
        }

        let language = request.input_language().to_string();
        let Some(plugin) = self.state.registry.interpreter(&language)? else {
            if request.debug {
                tracing::warn!(language = %language, "no interpreter matches the language");
            }
            return Err(HubError::UnsupportedLanguage(language));
        };

        let value = plugin(self.clone(), request.clone()).await?;

        if request.allow_cache {
            if let Some(key) = &request.cache_key {
                if !self.state.interpret_cache.has(key) {
                    if request.debug {
                        tracing::debug!(location = %request.location, key = %key, "caching result");
                    }
                    self.state
                        .interpret_cache
                        .set(key, CachedPayload::Value(value.clone()));
                }
            }
        }

        Ok(Interpreted { value, request })
    }

    async fn normalize_transpile(
        &self,
        request: TranspileRequest,
    ) -> Result<NormalizedRequest, HubError> {
        crate::registry::validate_language(&request.output_language, "output")?;
        if let Some(input) = &request.input_language {
            crate::registry::validate_language(input, "input")?;
        }

        let TranspileRequest {
            source_text,
            location,
            input_language,
            output_language,
            debug,
            allow_cache,
            compiler_options,
            executer_options,
        } = request;

        let parts = resolve_source(source_text, location, input_language, debug)?;
        let selector = LanguageSelector::Pair {
            input: parts.language,
            output: output_language,
        };

        self.finish_normalization(
            parts.source_text,
            parts.location,
            parts.loaded_from_location,
            selector,
            debug,
            allow_cache,
            compiler_options,
            executer_options,
            &self.state.transpile_cache,
        )
        .await
    }

    async fn normalize_interpret(
        &self,
        request: InterpretRequest,
    ) -> Result<NormalizedRequest, HubError> {
        if let Some(language) = &request.language {
            crate::registry::validate_language(language, "interpreter")?;
        }

        let InterpretRequest {
            source_text,
            location,
            language,
            debug,
            allow_cache,
            compiler_options,
            executer_options,
        } = request;

        let parts = resolve_source(source_text, location, language, debug)?;
        let selector = LanguageSelector::Single {
            language: parts.language,
        };

        self.finish_normalization(
            parts.source_text,
            parts.location,
            parts.loaded_from_location,
            selector,
            debug,
            allow_cache,
            compiler_options,
            executer_options,
            &self.state.interpret_cache,
        )
        .await
    }

    /// Shared tail of normalization: cache probe, then source fetch.
    #[allow(clippy::too_many_arguments)]
    async fn finish_normalization(
        &self,
        source_text: Option<String>,
        location: String,
        loaded_from_location: bool,
        selector: LanguageSelector,
        debug: bool,
        allow_cache: bool,
        compiler_options: serde_json::Map<String, Value>,
        executer_options: serde_json::Map<String, Value>,
        cache: &MemoTable<CachedPayload>,
    ) -> Result<NormalizedRequest, HubError> {
        let cache_key = allow_cache.then(|| selector.cache_key(&location));

        let mut normalized = NormalizedRequest {
            selector,
            location,
            loaded_from_location,
            debug,
            allow_cache,
            compiler_options,
            executer_options,
            cache_key,
            source_text,
            cached: None,
        };

        if let Some(key) = &normalized.cache_key {
            if let Some(payload) = cache.get(key) {
                if debug {
                    tracing::debug!(location = %normalized.location, "returning cached result");
                }
                normalized.cached = Some(payload);
                return Ok(normalized);
            }
        }

        if !normalized.location.starts_with(SOURCE_PREFIX) {
            if debug {
                tracing::debug!(location = %normalized.location, "loading source text");
            }
            let loaded = self.state.loader.load(&normalized.location).await?;
            normalized.source_text = Some(loaded.content);
        }

        Ok(normalized)
    }
}

struct ResolvedSource {
    source_text: Option<String>,
    location: String,
    language: String,
    loaded_from_location: bool,
}

/// Decide where the source comes from and which language it is in.
fn resolve_source(
    source_text: Option<String>,
    location: Option<String>,
    language: Option<String>,
    debug: bool,
) -> Result<ResolvedSource, HubError> {
    if let Some(source) = source_text {
        let Some(language) = language else {
            return Err(HubError::InvalidArgument(
                "inline source text requires an explicit language".into(),
            ));
        };
        let location = location.unwrap_or_else(|| synthesize_location(&source));
        return Ok(ResolvedSource {
            source_text: Some(source),
            location,
            language,
            loaded_from_location: false,
        });
    }

    if let Some(location) = location {
        let language = match language {
            Some(language) => language,
            None => match language_from_location(&location) {
                Some(language) => language,
                None => {
                    if debug {
                        tracing::warn!(location = %location, "cannot resolve a language from the location");
                    }
                    return Err(HubError::LanguageResolution(location));
                }
            },
        };
        return Ok(ResolvedSource {
            source_text: None,
            location,
            language,
            loaded_from_location: true,
        });
    }

    Err(HubError::InvalidArgument(
        "the request must carry either source text or a location".into(),
    ))
}
