//! Single-file component parsing.
//!
//! An SFC is a composite document with at most one `<template>` block, at
//! most one `<script>` block, and any number of `<style>` blocks. Each
//! block may carry attributes (`lang`, `src`, `scoped`, ...). Extra
//! template or script blocks are ignored; the first one wins.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;

/// The kind of a parsed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Template,
    Script,
    Style,
}

impl RegionKind {
    /// Key used to select per-region entries in option maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Template => "template",
            RegionKind::Script => "script",
            RegionKind::Style => "style",
        }
    }
}

/// One region of an SFC: its raw content plus parsed attributes.
#[derive(Debug, Clone)]
pub struct Region {
    pub kind: RegionKind,
    pub content: String,
    pub attributes: BTreeMap<String, String>,
}

impl Region {
    /// Check for an attribute, valued or bare (`scoped`).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// An attribute's value; bare attributes map to the empty string.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }
}

/// A parsed SFC, mutated in place by normalization and scoping, consumed
/// by assembly.
#[derive(Debug, Clone)]
pub struct SfcDocument {
    pub template: Option<Region>,
    pub script: Option<Region>,
    pub styles: Vec<Region>,
    pub scope_id: String,
}

fn block_pattern(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}\b([^>]*)>(.*?)</{tag}>")).expect("valid block pattern")
}

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| block_pattern("template"))
}

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| block_pattern("script"))
}

fn style_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| block_pattern("style"))
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][A-Za-z0-9_:.-]*)(?:\s*=\s*"([^"]*)"|\s*=\s*'([^']*)'|\s*=\s*([^\s"'>]+))?"#)
            .expect("valid attribute pattern")
    })
}

fn parse_attributes(raw: &str) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    for captures in attribute_pattern().captures_iter(raw) {
        let Some(name) = captures.get(1) else { continue };
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        attributes.insert(name.as_str().to_string(), value);
    }
    attributes
}

fn first_block(source: &str, pattern: &Regex, kind: RegionKind) -> Option<Region> {
    let mut blocks = pattern.captures_iter(source);
    let first = blocks.next()?;
    if blocks.next().is_some() {
        tracing::warn!(kind = kind.as_str(), "ignoring extra block of the same kind");
    }

    Some(Region {
        kind,
        content: first.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
        attributes: parse_attributes(first.get(1).map(|m| m.as_str()).unwrap_or_default()),
    })
}

/// Parse raw SFC text into its regions.
pub fn parse_document(source: &str, scope_id: String) -> SfcDocument {
    let template = first_block(source, template_pattern(), RegionKind::Template);
    let script = first_block(source, script_pattern(), RegionKind::Script);
    let styles = style_pattern()
        .captures_iter(source)
        .map(|captures| Region {
            kind: RegionKind::Style,
            content: captures.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
            attributes: parse_attributes(captures.get(1).map(|m| m.as_str()).unwrap_or_default()),
        })
        .collect();

    SfcDocument {
        template,
        script,
        styles,
        scope_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_regions() {
        let source = "<template><div>Hi</div></template>\n\
                      <script>export default {}</script>\n\
                      <style>.a{color:red}</style>";
        let doc = parse_document(source, "data-vue-test".into());

        assert_eq!(doc.template.as_ref().unwrap().content, "<div>Hi</div>");
        assert_eq!(doc.script.as_ref().unwrap().content, "export default {}");
        assert_eq!(doc.styles.len(), 1);
        assert_eq!(doc.styles[0].content, ".a{color:red}");
    }

    #[test]
    fn test_parse_attributes() {
        let source = r#"<style lang="scss" scoped src='main.scss'>x</style>"#;
        let doc = parse_document(source, "id".into());

        let style = &doc.styles[0];
        assert_eq!(style.attribute("lang"), Some("scss"));
        assert_eq!(style.attribute("src"), Some("main.scss"));
        assert!(style.has_attribute("scoped"));
        assert_eq!(style.attribute("scoped"), Some(""));
    }

    #[test]
    fn test_unquoted_attribute_value() {
        let source = "<script lang=ts></script>";
        let doc = parse_document(source, "id".into());
        assert_eq!(doc.script.as_ref().unwrap().attribute("lang"), Some("ts"));
    }

    #[test]
    fn test_multiple_styles_keep_document_order() {
        let source = "<style>.first{}</style><style scoped>.second{}</style>";
        let doc = parse_document(source, "id".into());

        assert_eq!(doc.styles.len(), 2);
        assert_eq!(doc.styles[0].content, ".first{}");
        assert!(doc.styles[1].has_attribute("scoped"));
    }

    #[test]
    fn test_first_template_wins() {
        let source = "<template><a/></template><template><b/></template>";
        let doc = parse_document(source, "id".into());
        assert_eq!(doc.template.as_ref().unwrap().content, "<a/>");
    }

    #[test]
    fn test_missing_regions() {
        let doc = parse_document("<script>1</script>", "id".into());
        assert!(doc.template.is_none());
        assert!(doc.styles.is_empty());
    }

    #[test]
    fn test_multiline_content() {
        let source = "<template>\n  <div>\n    text\n  </div>\n</template>";
        let doc = parse_document(source, "id".into());
        assert!(doc.template.as_ref().unwrap().content.contains("text"));
    }

    #[test]
    fn test_remove_attribute() {
        let source = r#"<style src="a.css">x</style>"#;
        let mut doc = parse_document(source, "id".into());
        assert_eq!(doc.styles[0].remove_attribute("src").as_deref(), Some("a.css"));
        assert!(!doc.styles[0].has_attribute("src"));
    }
}
