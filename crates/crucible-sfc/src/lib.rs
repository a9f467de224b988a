//! Single-file component support for the Crucible hub.
//!
//! Registers a `vue -> html` transpiler and a `vue` interpreter that
//! decompose a composite document into template, script and style regions,
//! recursively compile each region through the hub, scope styles marked
//! `scoped`, and reassemble either serialized markup or an executable
//! module descriptor.

use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crucible_core::{Hub, HubError};

pub mod parse;
pub mod pipeline;
pub mod scope;

pub use parse::{parse_document, Region, RegionKind, SfcDocument};
pub use scope::{scope_attribute, scope_stylesheet};

/// Generates a scope id for one compile call.
pub type ScopeIdFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Receives the final style texts of an interpret-mode compile when style
/// delegation is off. The DOM-facing side of style injection lives with
/// the embedder.
pub trait StyleSink: Send + Sync {
    fn insert(&self, styles: &[String]);
}

/// Default sink: observes styles through tracing only.
pub struct TracingSink;

impl StyleSink for TracingSink {
    fn insert(&self, styles: &[String]) {
        tracing::debug!(count = styles.len(), "styles ready for injection");
    }
}

/// A sink that stores every inserted style, for tests and embedders that
/// collect styles out of band.
#[derive(Default)]
pub struct RecordingSink {
    styles: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All styles inserted so far.
    pub fn collected(&self) -> Vec<String> {
        self.styles.lock().clone()
    }
}

impl StyleSink for RecordingSink {
    fn insert(&self, styles: &[String]) {
        self.styles.lock().extend_from_slice(styles);
    }
}

const SCOPE_SALT: &str = "crucible-sfc";

/// The default scope id: derived from a fixed salt, so every compile of
/// the same process produces the same id and output comparison across
/// runs is stable.
pub fn default_scope_id() -> String {
    let digest = hex::encode(Sha256::digest(SCOPE_SALT.as_bytes()));
    format!("data-vue-{}", &digest[..8])
}

/// Pipeline configuration: scope-id strategy and style sink.
#[derive(Clone)]
pub struct SfcOptions {
    /// Scope-id generator; swap in a content-derived or random strategy
    /// without touching pipeline logic.
    pub scope_id: ScopeIdFn,
    /// Where interpret-mode styles go when delegation is off.
    pub style_sink: Arc<dyn StyleSink>,
}

impl Default for SfcOptions {
    fn default() -> Self {
        Self {
            scope_id: Arc::new(default_scope_id),
            style_sink: Arc::new(TracingSink),
        }
    }
}

/// Register the SFC plugins on a hub with default options.
pub fn register(hub: &Hub) -> Result<(), HubError> {
    register_with(hub, SfcOptions::default())
}

/// Register the SFC plugins on a hub.
pub fn register_with(hub: &Hub, options: SfcOptions) -> Result<(), HubError> {
    let options = Arc::new(options);

    let transpile_options = options.clone();
    hub.registry().register_transpiler(
        "vue",
        "html",
        Arc::new(move |hub, request| {
            let options = transpile_options.clone();
            Box::pin(pipeline::transpile(hub, request, options))
        }),
    )?;

    let interpret_options = options;
    hub.registry().register_interpreter(
        "vue",
        Arc::new(move |hub, request| {
            let options = interpret_options.clone();
            Box::pin(pipeline::interpret(hub, request, options))
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scope_id_is_stable() {
        let a = default_scope_id();
        let b = default_scope_id();
        assert_eq!(a, b);
        assert!(a.starts_with("data-vue-"));
        assert_eq!(a.len(), "data-vue-".len() + 8);
    }

    #[test]
    fn test_recording_sink_collects() {
        let sink = RecordingSink::new();
        sink.insert(&[".a{}".to_string()]);
        sink.insert(&[".b{}".to_string()]);
        assert_eq!(sink.collected(), vec![".a{}".to_string(), ".b{}".to_string()]);
    }

    #[test]
    fn test_register_adds_vue_entries() {
        let hub = Hub::new();
        register(&hub).unwrap();
        assert!(hub.registry().transpiler("vue", "html").unwrap().is_some());
        assert!(hub.registry().interpreter("vue").unwrap().is_some());
    }
}
