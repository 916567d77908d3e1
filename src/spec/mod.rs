//! Spec layer: serde shapes for `model.layers` / `model.graph` and the
//! validated structures the expander and assembler exchange.

pub mod layer;
pub mod names;
pub mod wiring;

pub use layer::{ModuleDef, Node};
pub use names::Names;
pub use wiring::{RawWiring, Wiring};

use crate::doc::Document;
use crate::doc::merge::kind_of;
use crate::error::{ResolveError, Result};
use serde_yaml::{Mapping, Value};

pub const LAYERS_KEY: &str = "model.layers";
pub const GRAPH_KEY: &str = "model.graph";

/// The two subtrees of a document the resolver consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub layers: Mapping,
    pub graph: Vec<Value>,
}

impl ModelSpec {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let layers = match doc.get(LAYERS_KEY) {
            Some(Value::Mapping(m)) => m.clone(),
            Some(other) => {
                return Err(ResolveError::syntax(format!(
                    "`{}` must be a mapping, got {}",
                    LAYERS_KEY,
                    kind_of(other)
                )));
            }
            None => return Err(ResolveError::MissingSection(LAYERS_KEY.to_string())),
        };
        let graph = match doc.get(GRAPH_KEY) {
            Some(Value::Sequence(seq)) => seq.clone(),
            Some(other) => {
                return Err(ResolveError::syntax(format!(
                    "`{}` must be a list, got {}",
                    GRAPH_KEY,
                    kind_of(other)
                )));
            }
            None => return Err(ResolveError::MissingSection(GRAPH_KEY.to_string())),
        };
        Ok(Self { layers, graph })
    }
}
