//! The SFC compile pipeline: parse, normalize, scope, assemble.
//!
//! Region normalization re-enters the hub for each region's sub-language,
//! so an SFC may embed any language the registry knows about. Sub-compiles
//! run with caching disabled; only the top-level composite result is
//! cache-eligible.

use std::sync::OnceLock;

use futures_util::future::{try_join_all, BoxFuture};
use futures_util::FutureExt;
use regex_lite::Regex;
use serde_json::{Map, Value};

use crucible_core::{
    Hub, HubError, InterpretRequest, NormalizedRequest, TranspileOutput, TranspileRequest,
};

use crate::parse::{parse_document, Region, SfcDocument};
use crate::scope::{scope_attribute, scope_stylesheet};
use crate::SfcOptions;

/// Transpile mode: produce serialized markup.
pub async fn transpile(
    hub: Hub,
    request: NormalizedRequest,
    options: std::sync::Arc<SfcOptions>,
) -> Result<TranspileOutput, HubError> {
    let document = compile(&hub, &request, &options).await?;
    Ok(TranspileOutput::text(serialize_document(
        &document,
        request.debug,
    )))
}

/// Interpret mode: produce an executable module descriptor.
pub async fn interpret(
    hub: Hub,
    request: NormalizedRequest,
    options: std::sync::Arc<SfcOptions>,
) -> Result<Value, HubError> {
    let document = compile(&hub, &request, &options).await?;
    execute(&hub, &request, document, &options).await
}

async fn compile(
    hub: &Hub,
    request: &NormalizedRequest,
    options: &SfcOptions,
) -> Result<SfcDocument, HubError> {
    let mut document = parse_document(request.source()?, (options.scope_id)());
    normalize_regions(hub, request, &mut document).await?;
    apply_scoping(&mut document)?;
    Ok(document)
}

/// Compile every region's content into its default output language.
///
/// All regions are started before any is awaited; assembly waits on the
/// whole join. A failing region aborts the document.
async fn normalize_regions(
    hub: &Hub,
    parent: &NormalizedRequest,
    document: &mut SfcDocument,
) -> Result<(), HubError> {
    let mut tasks: Vec<BoxFuture<'_, Result<(), HubError>>> = Vec::new();

    if let Some(region) = document.template.as_mut() {
        tasks.push(normalize_region(hub, parent, region, "html").boxed());
    }
    if let Some(region) = document.script.as_mut() {
        tasks.push(normalize_region(hub, parent, region, "js").boxed());
    }
    for region in document.styles.iter_mut() {
        tasks.push(normalize_region(hub, parent, region, "css").boxed());
    }

    try_join_all(tasks).await?;
    Ok(())
}

async fn normalize_region(
    hub: &Hub,
    parent: &NormalizedRequest,
    region: &mut Region,
    default_language: &str,
) -> Result<(), HubError> {
    let kind = region.kind.as_str();

    let mut sub = TranspileRequest::new(default_language);
    sub.debug = parent.debug;
    sub.allow_cache = false;
    sub.compiler_options = option_section(&parent.compiler_options, kind);
    sub.executer_options = option_section(&parent.executer_options, kind);

    if let Some(src) = region.remove_attribute("src") {
        sub.location = Some(resolve_relative(&parent.location, &src));
        sub.input_language = region.remove_attribute("lang");
    } else {
        sub.source_text = Some(region.content.clone());
        sub.input_language = Some(
            region
                .remove_attribute("lang")
                .unwrap_or_else(|| default_language.to_string()),
        );
    }

    let result = hub.transpile(sub).await?;
    region.content = result.text;
    Ok(())
}

/// The per-region-kind section of a parent option map.
fn option_section(options: &Map<String, Value>, kind: &str) -> Map<String, Value> {
    options
        .get(kind)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Resolve a region's `src` reference relative to the parent location.
fn resolve_relative(parent_location: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }

    if parent_location.starts_with("http://") || parent_location.starts_with("https://") {
        let base = parent_location
            .rfind('/')
            .map(|i| &parent_location[..i])
            .unwrap_or(parent_location);
        return format!("{base}/{src}");
    }

    let path = std::path::Path::new(src);
    if path.is_absolute() {
        return src.to_string();
    }

    std::path::Path::new(parent_location)
        .parent()
        .unwrap_or_else(|| std::path::Path::new(""))
        .join(path)
        .to_string_lossy()
        .into_owned()
}

fn root_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*<([A-Za-z][A-Za-z0-9_-]*)").expect("valid root pattern"))
}

/// Inject the scope attribute into the template root and rewrite scoped
/// style regions.
fn apply_scoping(document: &mut SfcDocument) -> Result<(), HubError> {
    let Some(template) = document.template.as_mut() else {
        // No template, no scope necessary.
        return Ok(());
    };

    let Some(captures) = root_tag_pattern().captures(&template.content) else {
        return Err(HubError::MalformedTemplate);
    };
    let root_tag = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    template.content = root_tag_pattern()
        .replace(&template.content, |caps: &regex_lite::Captures<'_>| {
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            format!("<{tag} {}", document.scope_id)
        })
        .into_owned();

    tracing::debug!(root = %root_tag, scope_id = %document.scope_id, "scoped template root");

    let attr = scope_attribute(&document.scope_id);
    for style in document
        .styles
        .iter_mut()
        .filter(|style| style.has_attribute("scoped"))
    {
        style.content = scope_stylesheet(&style.content, &attr);
    }

    Ok(())
}

/// Serialize regions back into tagged blocks in document order.
fn serialize_document(document: &SfcDocument, debug: bool) -> String {
    if debug {
        let mut blocks = Vec::new();
        if let Some(template) = &document.template {
            blocks.push(format!("<template>\n{}\n</template>", template.content));
        }
        if let Some(script) = &document.script {
            blocks.push(format!("<script>\n{}\n</script>", script.content));
        }
        for style in &document.styles {
            blocks.push(format!("<style>\n{}\n</style>", style.content));
        }
        blocks.join("\n\n")
    } else {
        let mut out = String::new();
        if let Some(template) = &document.template {
            out.push_str(&format!("<template>{}</template>", template.content));
        }
        if let Some(script) = &document.script {
            out.push_str(&format!(
                "<script type='application/javascript'>{}</script>",
                script.content
            ));
        }
        for style in &document.styles {
            out.push_str(&format!("<style type='text/css'>{}</style>", style.content));
        }
        out
    }
}

/// Interpret mode assembly: evaluate the script region and attach the
/// compiled markup and styles to the resulting module object.
async fn execute(
    hub: &Hub,
    parent: &NormalizedRequest,
    document: SfcDocument,
    options: &SfcOptions,
) -> Result<Value, HubError> {
    let mut module = match &document.script {
        Some(script) => {
            let mut sub = InterpretRequest::new();
            sub.source_text = Some(script.content.clone());
            sub.language = Some("js".to_string());
            sub.debug = parent.debug;
            sub.allow_cache = false;
            sub.compiler_options = option_section(&parent.compiler_options, "script");
            sub.executer_options = option_section(&parent.executer_options, "script");
            hub.interpret(sub).await?.value
        }
        None => Value::Object(Map::new()),
    };

    let Some(exports) = module.as_object_mut() else {
        return Err(HubError::ContractViolation(
            "a component script must evaluate to an object".into(),
        ));
    };

    if let Some(template) = &document.template {
        exports.insert("template".into(), Value::String(template.content.clone()));
    }

    if !exports.contains_key("name") {
        if let Some(name) = parent.compiler_options.get("name") {
            exports.insert("name".into(), name.clone());
        }
    }

    let styles: Vec<String> = document
        .styles
        .iter()
        .map(|style| style.content.clone())
        .collect();
    exports.insert(
        "styles".into(),
        Value::Array(styles.iter().cloned().map(Value::String).collect()),
    );
    exports.insert("_baseURI".into(), Value::String(parent.location.clone()));

    let delegate = parent
        .executer_options
        .get("style")
        .and_then(|style| style.get("delegateStyles"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !delegate {
        options.style_sink.insert(&styles);
    }

    Ok(module)
}
