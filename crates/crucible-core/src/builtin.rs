//! Built-in plugin set.
//!
//! Identity transpilers for the core web languages, a TOML-to-JSON
//! transpiler, and JSON/TOML interpreters. Heavier compilers (TypeScript,
//! template and stylesheet engines) are expected to be registered by the
//! embedder.

use serde_json::Value;

use crate::error::HubError;
use crate::hub::Hub;
use crate::registry::{interpreter_fn, transpiler_fn, TranspileOutput};
use crate::request::NormalizedRequest;

/// Languages whose identity transpile is the source itself.
const IDENTITY_LANGUAGES: &[&str] = &["js", "html", "css", "json"];

/// Register the built-in transpilers and interpreters on a hub.
pub fn register_defaults(hub: &Hub) -> Result<(), HubError> {
    let registry = hub.registry();

    for &language in IDENTITY_LANGUAGES {
        registry.register_transpiler(language, language, transpiler_fn(identity))?;
    }
    registry.register_transpiler("toml", "json", transpiler_fn(toml_to_json))?;

    registry.register_interpreter("json", interpreter_fn(interpret_json))?;
    registry.register_interpreter("toml", interpreter_fn(interpret_toml))?;

    Ok(())
}

async fn identity(_hub: Hub, request: NormalizedRequest) -> Result<TranspileOutput, HubError> {
    Ok(TranspileOutput::text(request.source()?))
}

async fn toml_to_json(_hub: Hub, request: NormalizedRequest) -> Result<TranspileOutput, HubError> {
    let value = parse_toml(request.source()?)?;
    let text = serde_json::to_string(&value).map_err(|e| HubError::Plugin(e.to_string()))?;
    Ok(TranspileOutput::text(text))
}

async fn interpret_json(_hub: Hub, request: NormalizedRequest) -> Result<Value, HubError> {
    serde_json::from_str(request.source()?)
        .map_err(|e| HubError::Plugin(format!("JSON parse error: {e}")))
}

async fn interpret_toml(_hub: Hub, request: NormalizedRequest) -> Result<Value, HubError> {
    parse_toml(request.source()?)
}

fn parse_toml(source: &str) -> Result<Value, HubError> {
    let value: toml::Value =
        toml::from_str(source).map_err(|e| HubError::Plugin(format!("TOML parse error: {e}")))?;
    serde_json::to_value(value).map_err(|e| HubError::Plugin(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{InterpretRequest, TranspileRequest};
    use serde_json::json;

    #[tokio::test]
    async fn test_identity_transpile() {
        let hub = Hub::with_builtins();
        let mut request = TranspileRequest::new("css");
        request.source_text = Some(".a { color: red }".into());
        request.input_language = Some("css".into());

        let result = hub.transpile(request).await.unwrap();
        assert_eq!(result.text, ".a { color: red }");
    }

    #[tokio::test]
    async fn test_toml_to_json_transpile() {
        let hub = Hub::with_builtins();
        let mut request = TranspileRequest::new("json");
        request.source_text = Some("x = 1".into());
        request.input_language = Some("toml".into());

        let result = hub.transpile(request).await.unwrap();
        let value: Value = serde_json::from_str(&result.text).unwrap();
        assert_eq!(value, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_interpret_toml_value() {
        let hub = Hub::with_builtins();
        let mut request = InterpretRequest::new();
        request.source_text = Some("x = 1".into());
        request.language = Some("toml".into());

        let result = hub.interpret(request).await.unwrap();
        assert_eq!(result.value, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_interpret_invalid_toml_fails() {
        let hub = Hub::with_builtins();
        let mut request = InterpretRequest::new();
        request.source_text = Some("x = ".into());
        request.language = Some("toml".into());

        let err = hub.interpret(request).await.unwrap_err();
        assert!(matches!(err, HubError::Plugin(_)));
    }

    #[tokio::test]
    async fn test_interpret_json_value() {
        let hub = Hub::with_builtins();
        let mut request = InterpretRequest::new();
        request.source_text = Some(r#"{"a": [1, 2]}"#.into());
        request.language = Some("json".into());

        let result = hub.interpret(request).await.unwrap();
        assert_eq!(result.value, json!({"a": [1, 2]}));
    }
}
