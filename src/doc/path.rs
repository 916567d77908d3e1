//! Dot paths into a document tree, e.g. `dataset.preprocess.shape.height` or
//! `model.graph.3.with` (numeric segments index sequences).

use serde_yaml::{Mapping, Value};

pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for seg in path.split('.') {
        current = match current {
            Value::Mapping(m) => m.get(seg)?,
            Value::Sequence(s) => s.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Store `value` at `path`, creating missing intermediate mappings.
///
/// Sequences are never grown: a numeric segment must index an existing item.
pub fn assign(root: &mut Value, path: &str, value: Value) -> Result<(), String> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(format!("empty segment in key path {:?}", path));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err("empty key path".to_string());
    };

    let mut current = root;
    for seg in parents {
        current = child_mut(current, seg)?;
    }
    *child_mut(current, last)? = value;
    Ok(())
}

fn child_mut<'a>(current: &'a mut Value, seg: &str) -> Result<&'a mut Value, String> {
    if current.is_null() {
        *current = Value::Mapping(Mapping::new());
    }
    match current {
        Value::Mapping(m) => Ok(m
            .entry(Value::String(seg.to_string()))
            .or_insert(Value::Null)),
        Value::Sequence(s) => {
            let len = s.len();
            let idx: usize = seg
                .parse()
                .map_err(|_| format!("`{}` is not an index into a sequence", seg))?;
            s.get_mut(idx)
                .ok_or_else(|| format!("index {} out of range (len {})", idx, len))
        }
        _ => Err(format!("cannot descend into `{}`: parent is a scalar", seg)),
    }
}
