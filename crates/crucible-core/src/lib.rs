//! Crucible core: the dispatch, caching and registry machinery of the
//! compilation hub.
//!
//! Callers hand the hub a source document (inline text or a file/HTTP
//! location) and a language pair; the hub locates a registered plugin,
//! invokes it, memoizes the result and returns a normalized envelope.
//! Language compilers themselves are plugins; see `builtin` for the set
//! shipped with the core.

pub mod builtin;
pub mod cache;
pub mod error;
pub mod hub;
pub mod loader;
pub mod registry;
pub mod request;

pub use cache::MemoTable;
pub use error::HubError;
pub use hub::{Hub, Interpreted, Transpiled};
pub use loader::{ContentLoader, LoadedContent, Protocol};
pub use registry::{
    interpreter_fn, transpiler_fn, InterpreterFn, PluginFuture, Registry, TranspileOutput,
    TranspilerFn,
};
pub use request::{
    CachedPayload, InterpretRequest, LanguageSelector, NormalizedRequest, TranspileRequest,
    SOURCE_PREFIX,
};
