//! Structural merging.
//!
//! Two flavors:
//! - merge keys (`<<: *fragment` / `<<: [*a, *b]`), shallow, applied while
//!   loading a single document
//! - deep merge, applied when several documents are stacked

use crate::error::{ResolveError, Result};
use serde_yaml::{Mapping, Value};

pub const MERGE_KEY: &str = "<<";

/// Expand every merge key in `value`, bottom-up.
///
/// A fragment is itself expanded before it is merged into its includer.
/// Precedence, lowest first: earlier fragments, later fragments, local keys.
pub fn apply_merge_keys(value: Value) -> Result<Value> {
    match value {
        Value::Mapping(map) => {
            let mut merged = Mapping::new();
            let mut local = Mapping::new();
            for (key, val) in map {
                let val = apply_merge_keys(val)?;
                if key.as_str() == Some(MERGE_KEY) {
                    for fragment in fragments(val)? {
                        for (k, v) in fragment {
                            merged.insert(k, v);
                        }
                    }
                } else {
                    local.insert(key, val);
                }
            }
            for (k, v) in local {
                merged.insert(k, v);
            }
            Ok(Value::Mapping(merged))
        }
        Value::Sequence(seq) => seq
            .into_iter()
            .map(apply_merge_keys)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Tagged(mut tagged) => {
            tagged.value = apply_merge_keys(std::mem::take(&mut tagged.value))?;
            Ok(Value::Tagged(tagged))
        }
        other => Ok(other),
    }
}

fn fragments(value: Value) -> Result<Vec<Mapping>> {
    match value {
        Value::Mapping(m) => Ok(vec![m]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|v| match v {
                Value::Mapping(m) => Ok(m),
                other => Err(not_a_fragment(&other)),
            })
            .collect(),
        other => Err(not_a_fragment(&other)),
    }
}

fn not_a_fragment(value: &Value) -> ResolveError {
    ResolveError::syntax(format!(
        "`{}` value must be a mapping or a list of mappings, got {}",
        MERGE_KEY,
        kind_of(value)
    ))
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Recursively merge `overlay` into `base`: mappings merge key by key,
/// anything else in `overlay` replaces what `base` had.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, val) in overlay {
                let nested = matches!(
                    (base.get(&key), &val),
                    (Some(Value::Mapping(_)), Value::Mapping(_))
                );
                if !nested {
                    base.insert(key, val);
                } else if let Some(existing) = base.get_mut(&key) {
                    deep_merge(existing, val);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
