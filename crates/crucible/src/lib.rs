//! Crucible: a pluggable multi-language compilation hub.
//!
//! This library wires the core dispatch machinery together with the
//! single-file-component pipeline and exposes a process-wide default hub
//! for ergonomic top-level use. The binary in this crate fronts it with a
//! CLI.

use std::sync::OnceLock;

pub use crucible_core::{
    interpreter_fn, transpiler_fn, ContentLoader, Hub, HubError, Interpreted, InterpretRequest,
    LoadedContent, MemoTable, NormalizedRequest, Protocol, Registry, Transpiled,
    TranspileOutput, TranspileRequest, TranspilerFn,
};
pub use crucible_sfc as sfc;

pub mod batch;

/// Build a hub with the built-in plugin set and the SFC pipeline.
pub fn new_hub() -> Hub {
    let hub = Hub::with_builtins();
    crucible_sfc::register(&hub).expect("built-in language tags are valid");
    hub
}

/// The process-wide default hub, created on first use.
pub fn hub() -> &'static Hub {
    static HUB: OnceLock<Hub> = OnceLock::new();
    HUB.get_or_init(new_hub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hub_knows_builtins_and_sfc() {
        let hub = new_hub();
        assert!(hub.registry().transpiler("toml", "json").unwrap().is_some());
        assert!(hub.registry().transpiler("vue", "html").unwrap().is_some());
        assert!(hub.registry().interpreter("vue").unwrap().is_some());
    }

    #[test]
    fn test_global_hub_is_shared() {
        let first = hub();
        first
            .registry()
            .register_interpreter(
                "marker",
                interpreter_fn(|_hub, _request| async { Ok(serde_json::Value::Null) }),
            )
            .unwrap();
        assert!(hub().registry().interpreter("marker").unwrap().is_some());
    }
}
