//! Layer entries from a `layers` mapping.
//!
//! A layer is a mapping with a non-empty string `type`. Type `module` marks
//! a parametrized sub-graph:
//!
//! ```yaml
//! fire3:
//!   type: module
//!   kwargs: {squeeze_depth: 10, expand_depth: 20}
//!   layers: {squeeze: {...}, expand1: {...}}
//!   graph:
//!     - {from: input, with: squeeze, to: squeezed}
//!     - ...
//! ```
//!
//! Any other type is passed through to the execution engine uninterpreted.

use crate::doc::merge::kind_of;
use crate::error::{ResolveError, Result};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

pub const TYPE_KEY: &str = "type";
pub const MODULE_TYPE: &str = "module";

/// A resolved layer application handed to the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub params: Mapping,
}

/// Parsed body of a `type: module` layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    /// Formal parameter -> actual argument; `null` means unset.
    pub kwargs: Mapping,
    pub layers: Mapping,
    pub graph: Vec<Value>,
}

/// The `type` tag of layer `name`.
pub fn layer_kind<'a>(name: &str, layer: &'a Value) -> Result<&'a str> {
    let Value::Mapping(map) = layer else {
        return Err(invalid(name, format!("expected a mapping, got {}", kind_of(layer))));
    };
    match map.get(TYPE_KEY) {
        Some(Value::String(kind)) if !kind.trim().is_empty() => Ok(kind.as_str()),
        Some(Value::String(_)) => Err(invalid(name, "`type` is empty".to_string())),
        Some(other) => Err(invalid(
            name,
            format!("`type` must be a string, got {}", kind_of(other)),
        )),
        None => Err(invalid(name, "missing `type`".to_string())),
    }
}

pub fn is_module(layer: &Value) -> bool {
    layer.get(TYPE_KEY).and_then(Value::as_str) == Some(MODULE_TYPE)
}

impl Node {
    /// Build the node `name` from a plain layer; parameters are everything but `type`.
    pub fn from_layer(name: &str, layer: &Value) -> Result<Self> {
        let kind = layer_kind(name, layer)?.to_string();
        let params = layer
            .as_mapping()
            .map(|m| {
                m.iter()
                    .filter(|(k, _)| k.as_str() != Some(TYPE_KEY))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            name: name.to_string(),
            kind,
            params,
        })
    }
}

impl ModuleDef {
    pub fn from_layer(name: &str, layer: &Value) -> Result<Self> {
        let kind = layer_kind(name, layer)?;
        if kind != MODULE_TYPE {
            return Err(invalid(name, format!("`{}` is not a module", kind)));
        }

        let kwargs = match layer.get("kwargs") {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(m)) => m.clone(),
            Some(other) => {
                return Err(invalid(
                    name,
                    format!("`kwargs` must be a mapping, got {}", kind_of(other)),
                ));
            }
        };
        if let Some(key) = kwargs.keys().find(|k| !k.is_string()) {
            return Err(invalid(
                name,
                format!("`kwargs` key must be a string, got {}", kind_of(key)),
            ));
        }

        let layers = match layer.get("layers") {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(m)) => m.clone(),
            Some(other) => {
                return Err(invalid(
                    name,
                    format!("`layers` must be a mapping, got {}", kind_of(other)),
                ));
            }
        };

        let graph = match layer.get("graph") {
            Some(Value::Sequence(seq)) => seq.clone(),
            Some(other) => {
                return Err(invalid(
                    name,
                    format!("`graph` must be a list, got {}", kind_of(other)),
                ));
            }
            None => return Err(invalid(name, "module has no `graph`".to_string())),
        };

        Ok(Self {
            kwargs,
            layers,
            graph,
        })
    }

    /// Formal parameter names, in declaration order.
    pub fn formals(&self) -> impl Iterator<Item = &str> {
        self.kwargs.keys().filter_map(Value::as_str)
    }
}

fn invalid(name: &str, reason: String) -> ResolveError {
    ResolveError::InvalidLayer {
        name: name.to_string(),
        reason,
    }
}
