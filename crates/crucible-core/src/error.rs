//! Error types for the compilation hub.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the hub core.
#[derive(Debug, Error)]
pub enum HubError {
    /// Malformed caller input: language identifiers, option shapes, missing fields.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input language could not be inferred from a location.
    #[error("cannot resolve a language from the location: {0}")]
    LanguageResolution(String),

    /// No transpiler registered for the requested language pair.
    #[error("the language pair ({input}-{output}) does not match any registered transpiler")]
    UnsupportedLanguagePair { input: String, output: String },

    /// No interpreter registered for the requested language.
    #[error("the language ({0}) does not match any registered interpreter")]
    UnsupportedLanguage(String),

    /// A plugin returned a malformed result.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A local path does not exist or is a directory.
    #[error("location does not exist or is a directory: {0}")]
    NotFound(PathBuf),

    /// A remote fetch returned a non-success status code.
    #[error("remote fetch of {url} failed with status {status}")]
    RemoteFetch { url: String, status: u16 },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An SFC template has no discernible root element.
    #[error("the template requires a root element")]
    MalformedTemplate,

    /// A plugin failed internally (parse error, compiler failure).
    #[error("plugin failed: {0}")]
    Plugin(String),
}
