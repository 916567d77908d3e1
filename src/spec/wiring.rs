use crate::error::{ResolveError, Result};
use crate::spec::Names;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Raw wiring entry as written in a `graph` list.
///
/// `with` may name a chain of layers, applied left to right.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWiring {
    pub from: Names,
    pub with: Names,
    pub to: Names,
}

impl RawWiring {
    /// Read entry `index` of the graph belonging to `scope`.
    pub fn from_value(scope: &str, index: usize, value: &Value) -> Result<Self> {
        let invalid = |reason: String| ResolveError::InvalidWiring {
            scope: scope.to_string(),
            index,
            reason,
        };
        let raw: RawWiring =
            serde_yaml::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;
        if raw.from.is_empty() {
            return Err(invalid("`from` names no binding".to_string()));
        }
        if raw.with.is_empty() {
            return Err(invalid("`with` names no layer".to_string()));
        }
        if raw.to.is_empty() {
            return Err(invalid("`to` names no binding".to_string()));
        }
        Ok(raw)
    }
}

/// Expanded wiring entry: every name is global, `with` names exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wiring {
    pub from: Vec<String>,
    pub with: String,
    pub to: Vec<String>,
}
