//! `$(dot.path)` links between document values.
//!
//! A string that is exactly one link becomes the linked value (type kept);
//! otherwise every link is spliced into the text. One pass only: a linked
//! value that itself contains links is copied verbatim.

use crate::doc::merge::kind_of;
use crate::doc::path;
use crate::error::{ResolveError, Result};
use regex::Regex;
use serde_yaml::{Mapping, Value};

const LINK_RE: &str = r#"\$\(([_a-zA-Z][_a-zA-Z0-9.]*)\)"#;

pub fn resolve_links(root: &Value) -> Result<Value> {
    let re = Regex::new(LINK_RE).map_err(|e| ResolveError::syntax(e.to_string()))?;
    link_value(root, root, &re)
}

fn link_value(value: &Value, root: &Value, re: &Regex) -> Result<Value> {
    match value {
        Value::String(s) => link_str(s, root, re),
        Value::Sequence(seq) => seq
            .iter()
            .map(|v| link_value(v, root, re))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (k, v) in map {
                out.insert(k.clone(), link_value(v, root, re)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Tagged(tagged) => {
            let mut tagged = tagged.clone();
            tagged.value = link_value(&tagged.value, root, re)?;
            Ok(Value::Tagged(tagged))
        }
        other => Ok(other.clone()),
    }
}

fn link_str(s: &str, root: &Value, re: &Regex) -> Result<Value> {
    let target = |p: &str| {
        path::lookup(root, p).ok_or_else(|| ResolveError::UnresolvedLink {
            path: p.to_string(),
        })
    };

    // Whole-string link keeps the target's type.
    if let Some(caps) = re.captures(s) {
        if let (Some(whole), Some(p)) = (caps.get(0), caps.get(1)) {
            if whole.start() == 0 && whole.end() == s.len() {
                return target(p.as_str()).cloned();
            }
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in re.captures_iter(s) {
        let (Some(whole), Some(p)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        let linked = target(p.as_str())?;
        out.push_str(&scalar_text(linked).ok_or_else(|| {
            ResolveError::syntax(format!(
                "link $({}) is spliced into text but names {}",
                p.as_str(),
                kind_of(linked)
            ))
        })?);
        last = whole.end();
    }
    if last == 0 {
        return Ok(Value::String(s.to_string()));
    }
    out.push_str(&s[last..]);
    Ok(Value::String(out))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn whole_string_link_keeps_type() {
        let doc = yaml("dataset: {num_classes: 10}\nmodel: {classes: $(dataset.num_classes)}");
        let got = resolve_links(&doc).unwrap();
        assert_eq!(got["model"]["classes"], Value::from(10));
    }

    #[test]
    fn links_are_spliced_into_text() {
        let doc = yaml("name: cifar10\npath: 'data/$(name)/train-$(name).tfrecord'");
        let got = resolve_links(&doc).unwrap();
        assert_eq!(
            got["path"],
            Value::String("data/cifar10/train-cifar10.tfrecord".into())
        );
    }

    #[test]
    fn unknown_path_is_reported() {
        let doc = yaml("a: $(b.c)");
        assert_eq!(
            resolve_links(&doc),
            Err(ResolveError::UnresolvedLink { path: "b.c".into() })
        );
    }

    #[test]
    fn strings_without_links_are_untouched() {
        let doc = yaml("a: num_classes\nb: ^depth\nc: $5");
        assert_eq!(resolve_links(&doc).unwrap(), doc);
    }
}
