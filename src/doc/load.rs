use crate::doc::merge::apply_merge_keys;
use crate::error::{ResolveError, Result};
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Parse document text into a node tree with every `<<` merge expanded.
///
/// Aliases are materialized as owned copies by the parser, so each merge site
/// works on its own tree.
pub fn parse_text(text: &str) -> Result<Value> {
    let value = match serde_yaml::from_str::<Value>(text) {
        Ok(v) => v,
        Err(e) if e.to_string().starts_with("unknown anchor") => {
            let name = first_undefined_alias(text).unwrap_or_else(|| match e.location() {
                Some(loc) => format!("<alias at line {} column {}>", loc.line(), loc.column()),
                None => "<unknown>".to_string(),
            });
            return Err(ResolveError::UnresolvedAnchor { name });
        }
        Err(e) => return Err(ResolveError::syntax(e.to_string())),
    };
    apply_merge_keys(value)
}

/// Scan for the first `*alias` that no earlier `&anchor` defines.
///
/// Only used to name the offender once the parser has already rejected the
/// text, so a rough lexical scan is enough.
fn first_undefined_alias(text: &str) -> Option<String> {
    let re = Regex::new(r#"(?:^|[\s\[\{,])([&*])([^\s\[\]\{\},]+)"#).ok()?;

    let mut defined = BTreeSet::new();
    for line in text.lines() {
        let line = strip_comment(line);
        for caps in re.captures_iter(line) {
            let (Some(sigil), Some(name)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let name = name.as_str();
            if sigil.as_str() == "&" {
                defined.insert(name.to_string());
            } else if !defined.contains(name) {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(at) => &line[..at],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn undefined_alias_is_named() {
        let text = "a: &conv {type: convolution}\nb: {<<: *pool, stride: 2}\n";
        assert_eq!(
            parse_text(text),
            Err(ResolveError::UnresolvedAnchor {
                name: "pool".into()
            })
        );
    }

    #[test]
    fn alias_before_its_anchor_is_undefined() {
        assert_eq!(
            first_undefined_alias("x: *late\ny: &late 1\n"),
            Some("late".to_string())
        );
    }

    #[test]
    fn commented_aliases_are_ignored() {
        assert_eq!(first_undefined_alias("# uses *nothing\nx: &a 1\ny: *a\n"), None);
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        assert!(matches!(
            parse_text("layers: [conv1, pool1\n"),
            Err(ResolveError::Syntax { .. })
        ));
        assert!(matches!(
            parse_text("a:\n  b: 1\n c: 2\n"),
            Err(ResolveError::Syntax { .. })
        ));
    }
}
