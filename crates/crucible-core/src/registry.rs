//! Mutable registry of transpiler and interpreter plugins.
//!
//! Transpilers are keyed by (output, input) language pair, interpreters by a
//! single language. Registration silently overwrites an existing entry for
//! the same key; this is the designed extension point for embedding new
//! languages without touching dispatch logic.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use regex_lite::Regex;
use serde_json::Value;

use crate::error::HubError;
use crate::hub::Hub;
use crate::request::NormalizedRequest;

/// The uniform asynchronous handle every plugin invocation produces.
pub type PluginFuture<T> = Pin<Box<dyn Future<Output = Result<T, HubError>> + Send>>;

/// A transpiler plugin: normalized request in, produced text out.
pub type TranspilerFn = Arc<dyn Fn(Hub, NormalizedRequest) -> PluginFuture<TranspileOutput> + Send + Sync>;

/// An interpreter plugin: normalized request in, runtime value out.
pub type InterpreterFn = Arc<dyn Fn(Hub, NormalizedRequest) -> PluginFuture<Value> + Send + Sync>;

/// The structure a transpiler plugin must produce.
#[derive(Debug, Clone)]
pub struct TranspileOutput {
    /// The transpiled text. Must be non-empty; the dispatcher enforces this.
    pub text: String,
    /// Opaque compiler diagnostics, passed through to the caller.
    pub diagnostics: Option<Value>,
}

impl TranspileOutput {
    /// Wrap produced text with no diagnostics.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            diagnostics: None,
        }
    }
}

/// Adapt an async function into a [`TranspilerFn`].
pub fn transpiler_fn<F, Fut>(f: F) -> TranspilerFn
where
    F: Fn(Hub, NormalizedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TranspileOutput, HubError>> + Send + 'static,
{
    Arc::new(move |hub, request| Box::pin(f(hub, request)))
}

/// Adapt an async function into an [`InterpreterFn`].
pub fn interpreter_fn<F, Fut>(f: F) -> InterpreterFn
where
    F: Fn(Hub, NormalizedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HubError>> + Send + 'static,
{
    Arc::new(move |hub, request| Box::pin(f(hub, request)))
}

fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z0-9_]+$").expect("valid language pattern"))
}

/// Validate a language identifier, naming the offending parameter on failure.
pub fn validate_language(value: &str, parameter: &str) -> Result<(), HubError> {
    if language_pattern().is_match(value) {
        Ok(())
    } else {
        Err(HubError::InvalidArgument(format!(
            "the {parameter} language can only contain letters, numbers and underscores: {value:?}"
        )))
    }
}

/// Runtime-mutable mapping of languages to plugin functions.
#[derive(Clone, Default)]
pub struct Registry {
    transpilers: Arc<RwLock<HashMap<(String, String), TranspilerFn>>>,
    interpreters: Arc<RwLock<HashMap<String, InterpreterFn>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transpiler for an (input, output) language pair.
    ///
    /// Last write wins for an already-registered pair.
    pub fn register_transpiler(
        &self,
        input: &str,
        output: &str,
        plugin: TranspilerFn,
    ) -> Result<(), HubError> {
        validate_language(input, "input")?;
        validate_language(output, "output")?;

        self.transpilers
            .write()
            .insert((output.to_string(), input.to_string()), plugin);
        Ok(())
    }

    /// Remove the transpiler for a language pair, if any.
    pub fn remove_transpiler(&self, input: &str, output: &str) -> Result<(), HubError> {
        validate_language(input, "input")?;
        validate_language(output, "output")?;

        self.transpilers
            .write()
            .remove(&(output.to_string(), input.to_string()));
        Ok(())
    }

    /// Look up the transpiler for a language pair.
    pub fn transpiler(&self, input: &str, output: &str) -> Result<Option<TranspilerFn>, HubError> {
        validate_language(input, "input")?;
        validate_language(output, "output")?;

        Ok(self
            .transpilers
            .read()
            .get(&(output.to_string(), input.to_string()))
            .cloned())
    }

    /// Enumerate registered transpiler pairs as (input, output).
    pub fn transpilers(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .transpilers
            .read()
            .keys()
            .map(|(output, input)| (input.clone(), output.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Register an interpreter for a language. Last write wins.
    pub fn register_interpreter(&self, language: &str, plugin: InterpreterFn) -> Result<(), HubError> {
        validate_language(language, "interpreter")?;

        self.interpreters
            .write()
            .insert(language.to_string(), plugin);
        Ok(())
    }

    /// Remove the interpreter for a language, if any.
    pub fn remove_interpreter(&self, language: &str) -> Result<(), HubError> {
        validate_language(language, "interpreter")?;

        self.interpreters.write().remove(language);
        Ok(())
    }

    /// Look up the interpreter for a language.
    pub fn interpreter(&self, language: &str) -> Result<Option<InterpreterFn>, HubError> {
        validate_language(language, "interpreter")?;

        Ok(self.interpreters.read().get(language).cloned())
    }

    /// Enumerate registered interpreter languages.
    pub fn interpreters(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.interpreters.read().keys().cloned().collect();
        languages.sort();
        languages
    }
}
