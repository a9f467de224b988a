//! Selector-rewriting scope transform.
//!
//! Rewrites top-level style rules so every selector is namespaced by a
//! scope attribute. At-rules (`@media`, `@keyframes`, `@import`, ...) and
//! comments pass through verbatim. The rewrite is purely textual; no
//! specificity recalculation happens.

/// The attribute-selector form of a scope id.
pub fn scope_attribute(scope_id: &str) -> String {
    format!("[{scope_id}]")
}

/// Rewrite every top-level style rule of a stylesheet.
///
/// Each comma-separated selector is either rewritten by replacing a
/// `:scope`/`:root` pseudo-token with the scope attribute, or prefixed by
/// the scope attribute. Selectors that already carry the attribute are
/// left untouched, so re-applying the transform with the same scope id is
/// a no-op.
pub fn scope_stylesheet(stylesheet: &str, scope_attr: &str) -> String {
    let mut out = String::with_capacity(stylesheet.len() + 64);
    let mut rest = stylesheet;

    while !rest.is_empty() {
        if rest.starts_with("/*") {
            let end = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let Some(first) = rest.chars().next() else { break };
        if first.is_whitespace() {
            out.push(first);
            rest = &rest[first.len_utf8()..];
            continue;
        }

        match prelude_end(rest) {
            PreludeEnd::Statement(end) => {
                // A block-less at-rule such as `@import ...;`.
                out.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            PreludeEnd::Block(prelude_len) => {
                let prelude = &rest[..prelude_len];
                let block_len = block_end(&rest[prelude_len..]);
                let block = &rest[prelude_len..prelude_len + block_len];

                if prelude.trim_start().starts_with('@') {
                    out.push_str(prelude);
                    out.push_str(block);
                } else {
                    out.push_str(&rewrite_selector_list(prelude, scope_attr));
                    out.push_str(block);
                }
                rest = &rest[prelude_len + block_len..];
            }
            PreludeEnd::Eof => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

enum PreludeEnd {
    /// Index just past a terminating `;`.
    Statement(usize),
    /// Index of the `{` opening the rule block.
    Block(usize),
    Eof,
}

/// Find where the text before the next rule body ends.
fn prelude_end(text: &str) -> PreludeEnd {
    let mut quote: Option<char> = None;
    for (index, ch) in text.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '{' => return PreludeEnd::Block(index),
                ';' => return PreludeEnd::Statement(index + 1),
                _ => {}
            },
        }
    }
    PreludeEnd::Eof
}

/// Length of a balanced `{...}` block starting at the opening brace.
fn block_end(text: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (index, ch) in text.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return index + ch.len_utf8();
                    }
                }
                _ => {}
            },
        }
    }
    text.len()
}

/// Rewrite one rule's selector list, preserving its leading whitespace.
fn rewrite_selector_list(prelude: &str, scope_attr: &str) -> String {
    let trimmed_start = prelude.len() - prelude.trim_start().len();
    let leading = &prelude[..trimmed_start];
    let selectors = prelude[trimmed_start..].trim_end();

    let rewritten: Vec<String> = selectors
        .split(',')
        .map(|selector| rewrite_selector(selector.trim(), scope_attr))
        .collect();

    format!("{leading}{} ", rewritten.join(", "))
}

fn rewrite_selector(selector: &str, scope_attr: &str) -> String {
    if selector.contains(scope_attr) {
        selector.to_string()
    } else if selector.contains(":scope") || selector.contains(":root") {
        selector.replace(":scope", scope_attr).replace(":root", scope_attr)
    } else {
        format!("{scope_attr} {selector}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTR: &str = "[data-vue-test]";

    #[test]
    fn test_prefixes_plain_selector() {
        let out = scope_stylesheet(".a{color:red}", ATTR);
        assert_eq!(out, "[data-vue-test] .a {color:red}");
    }

    #[test]
    fn test_root_token_becomes_bare_attribute() {
        let out = scope_stylesheet(":root{color:blue}", ATTR);
        assert_eq!(out, "[data-vue-test] {color:blue}");
    }

    #[test]
    fn test_scope_token_replaced_in_place() {
        let out = scope_stylesheet(":scope > .item{margin:0}", ATTR);
        assert_eq!(out, "[data-vue-test] > .item {margin:0}");
    }

    #[test]
    fn test_selector_list_rewritten_per_selector() {
        let out = scope_stylesheet(".a, .b{x:y}", ATTR);
        assert_eq!(out, "[data-vue-test] .a, [data-vue-test] .b {x:y}");
    }

    #[test]
    fn test_at_rule_block_untouched() {
        let css = "@media screen { .a{color:red} }";
        assert_eq!(scope_stylesheet(css, ATTR), css);
    }

    #[test]
    fn test_import_statement_untouched() {
        let css = "@import url(\"other.css\");\n.a{x:y}";
        let out = scope_stylesheet(css, ATTR);
        assert!(out.starts_with("@import url(\"other.css\");"));
        assert!(out.contains("[data-vue-test] .a"));
    }

    #[test]
    fn test_comment_untouched() {
        let css = "/* .not-a-rule{} */ .a{x:y}";
        let out = scope_stylesheet(css, ATTR);
        assert!(out.starts_with("/* .not-a-rule{} */"));
        assert!(out.contains("[data-vue-test] .a"));
    }

    #[test]
    fn test_idempotent_on_reapplication() {
        let once = scope_stylesheet(".a{color:red}", ATTR);
        let twice = scope_stylesheet(&once, ATTR);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multiple_rules() {
        let out = scope_stylesheet(".a{x:1}\n.b{y:2}", ATTR);
        assert_eq!(out, "[data-vue-test] .a {x:1}\n[data-vue-test] .b {y:2}");
    }

    #[test]
    fn test_brace_inside_string_value() {
        let out = scope_stylesheet(".a{content:\"}\"}\n.b{x:y}", ATTR);
        assert!(out.contains("[data-vue-test] .b"));
    }
}
