//! Compile request shapes and normalization helpers.
//!
//! A caller-supplied request names its source either inline or by location.
//! Normalization turns that into a canonical unit of work: a resolved
//! language selector, a canonical location, and a cache key.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::HubError;

/// Prefix of locations synthesized for inline source text.
///
/// Identical inline source always digests to the same location, so it
/// always maps to the same cache key.
pub const SOURCE_PREFIX: &str = "/source/";

/// A request to transpile source text across languages.
#[derive(Debug, Clone)]
pub struct TranspileRequest {
    /// Inline source text. Requires `input_language`.
    pub source_text: Option<String>,
    /// Location to load the source from (path or URL).
    pub location: Option<String>,
    /// Input language tag; derived from the location's extension when absent.
    pub input_language: Option<String>,
    /// Output language tag.
    pub output_language: String,
    /// Emit diagnostic traces around cache hits and failures.
    pub debug: bool,
    /// Allow the memo table to serve and store this request.
    pub allow_cache: bool,
    /// Options forwarded to the compiler plugin.
    pub compiler_options: Map<String, Value>,
    /// Options forwarded to the executer side of a plugin.
    pub executer_options: Map<String, Value>,
}

impl TranspileRequest {
    /// Create a request targeting an output language, with caching allowed.
    pub fn new(output_language: impl Into<String>) -> Self {
        Self {
            source_text: None,
            location: None,
            input_language: None,
            output_language: output_language.into(),
            debug: false,
            allow_cache: true,
            compiler_options: Map::new(),
            executer_options: Map::new(),
        }
    }
}

/// A request to interpret source text into a runtime value.
#[derive(Debug, Clone)]
pub struct InterpretRequest {
    /// Inline source text. Requires `language`.
    pub source_text: Option<String>,
    /// Location to load the source from (path or URL).
    pub location: Option<String>,
    /// Language tag; derived from the location's extension when absent.
    pub language: Option<String>,
    /// Emit diagnostic traces around cache hits and failures.
    pub debug: bool,
    /// Allow the memo table to serve and store this request.
    pub allow_cache: bool,
    /// Options forwarded to the compiler plugin.
    pub compiler_options: Map<String, Value>,
    /// Options forwarded to the executer side of a plugin.
    pub executer_options: Map<String, Value>,
}

impl Default for InterpretRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpretRequest {
    /// Create an empty request with caching allowed.
    pub fn new() -> Self {
        Self {
            source_text: None,
            location: None,
            language: None,
            debug: false,
            allow_cache: true,
            compiler_options: Map::new(),
            executer_options: Map::new(),
        }
    }
}

/// The language(s) a normalized request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelector {
    /// Transpile: an (input, output) pair.
    Pair { input: String, output: String },
    /// Interpret: a single language.
    Single { language: String },
}

impl LanguageSelector {
    /// Compose the cache key for this selector and a canonical location.
    pub fn cache_key(&self, location: &str) -> String {
        match self {
            LanguageSelector::Pair { input, output } => {
                format!("{input}-{output}/{location}")
            }
            LanguageSelector::Single { language } => format!("{language}/{location}"),
        }
    }
}

/// A payload previously stored in a memo table.
#[derive(Debug, Clone)]
pub enum CachedPayload {
    /// A transpiled result: produced text plus opaque diagnostics.
    Text {
        text: String,
        diagnostics: Option<Value>,
    },
    /// An interpreted result value.
    Value(Value),
}

/// A validated, canonical unit of work ready for dispatch.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    /// Resolved language selector.
    pub selector: LanguageSelector,
    /// Canonical location; synthesized from a content digest for inline source.
    pub location: String,
    /// Whether the source was addressed by location rather than supplied inline.
    pub loaded_from_location: bool,
    pub debug: bool,
    pub allow_cache: bool,
    pub compiler_options: Map<String, Value>,
    pub executer_options: Map<String, Value>,
    /// Cache key, present when caching is allowed.
    pub cache_key: Option<String>,
    pub(crate) source_text: Option<String>,
    pub(crate) cached: Option<CachedPayload>,
}

impl NormalizedRequest {
    /// The source text to compile.
    ///
    /// Guaranteed present for every request that reaches a plugin; a cached
    /// request short-circuits in the dispatcher and carries none.
    pub fn source(&self) -> Result<&str, HubError> {
        self.source_text
            .as_deref()
            .ok_or_else(|| HubError::InvalidArgument("the request carries no source text".into()))
    }

    /// The input language (transpile) or language (interpret).
    pub fn input_language(&self) -> &str {
        match &self.selector {
            LanguageSelector::Pair { input, .. } => input,
            LanguageSelector::Single { language } => language,
        }
    }

    /// The output language, for transpile requests.
    pub fn output_language(&self) -> Option<&str> {
        match &self.selector {
            LanguageSelector::Pair { output, .. } => Some(output),
            LanguageSelector::Single { .. } => None,
        }
    }

    pub(crate) fn take_cached(&mut self) -> Option<CachedPayload> {
        self.cached.take()
    }
}

/// Synthesize the canonical location for inline source text.
pub(crate) fn synthesize_location(source: &str) -> String {
    let digest = hex::encode(Sha256::digest(source.as_bytes()));
    format!("{SOURCE_PREFIX}{digest}")
}

/// Derive a language tag from a location's file-extension-like suffix.
pub(crate) fn language_from_location(location: &str) -> Option<String> {
    let segment = location.rsplit(['/', '\\']).next().unwrap_or(location);
    let (stem, extension) = segment.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_string())
}
