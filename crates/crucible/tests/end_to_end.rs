//! End-to-end coverage of the assembled hub: builtins, SFC pipeline and
//! the batch driver working together.

use crucible_lib::{batch, new_hub, TranspileRequest};

#[tokio::test]
async fn test_vue_document_through_default_hub() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("widget.vue"),
        "<template><div>Hi</div></template><style scoped>.a{color:red}</style>",
    )
    .unwrap();

    let hub = new_hub();
    hub.set_root_dir(dir.path()).unwrap();

    let mut request = TranspileRequest::new("html");
    request.location = Some("widget.vue".to_string());

    let result = hub.transpile(request).await.unwrap();
    assert!(result.text.contains("<template><div data-vue-"));
    assert!(result.text.contains("] .a {color:red}"));
}

#[tokio::test]
async fn test_batch_transpiles_source_tree() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");

    std::fs::create_dir_all(src.join("json")).unwrap();
    std::fs::write(src.join("json/config.toml"), "x = 1").unwrap();
    std::fs::write(src.join("json/data.json"), r#"{"ok":true}"#).unwrap();
    // A file with no matching transpiler fails without stopping the batch.
    std::fs::write(src.join("json/readme.txt"), "hello").unwrap();

    let hub = new_hub();
    let summary = batch::run(&hub, &src, &out).await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let compiled = std::fs::read_to_string(out.join("json/config.toml.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&compiled).unwrap();
    assert_eq!(value, serde_json::json!({"x": 1}));

    let passthrough = std::fs::read_to_string(out.join("json/data.json.json")).unwrap();
    assert_eq!(passthrough, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_batch_ignores_loose_files_at_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("stray.toml"), "x = 1").unwrap();

    let hub = new_hub();
    let summary = batch::run(&hub, &src, &dir.path().join("out")).await.unwrap();
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
}
