//! Document layer: text -> node tree with merges, overrides and links applied.
//!
//! Processing order for a stack of documents:
//! 1) each text is parsed and its `<<` merge keys are expanded
//! 2) documents are deep-merged in order (later wins)
//! 3) `key.path=value` overrides are applied
//! 4) `$(dot.path)` links are resolved against the merged tree

pub mod link;
pub mod load;
pub mod merge;
pub mod path;

use crate::error::{ResolveError, Result};
use serde_yaml::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            root: load::parse_text(text)?,
        })
    }

    /// Parse and deep-merge several texts, in order.
    pub fn parse_all<'a, I>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut doc = Self { root: Value::Null };
        for (i, text) in texts.into_iter().enumerate() {
            let next = Self::parse(text)?;
            tracing::debug!(index = i, "merging document");
            doc.merge(next);
        }
        Ok(doc)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    pub fn get(&self, key_path: &str) -> Option<&Value> {
        path::lookup(&self.root, key_path)
    }

    /// Deep-merge `other` on top of this document.
    pub fn merge(&mut self, other: Document) {
        merge::deep_merge(&mut self.root, other.root);
    }

    /// Apply one `key.path=value` override; `value` is parsed as YAML.
    pub fn apply_override(&mut self, spec: &str) -> Result<()> {
        let invalid = |reason: String| ResolveError::InvalidOverride {
            spec: spec.to_string(),
            reason,
        };

        let Some((key_path, raw)) = spec.split_once('=') else {
            return Err(invalid("expected `key.path=value`".to_string()));
        };
        let key_path = key_path.trim();
        if key_path.is_empty() {
            return Err(invalid("empty key path".to_string()));
        }
        let value: Value = serde_yaml::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;

        tracing::debug!(path = key_path, "applying override");
        path::assign(&mut self.root, key_path, value).map_err(invalid)
    }

    pub fn resolve_links(&mut self) -> Result<()> {
        self.root = link::resolve_links(&self.root)?;
        Ok(())
    }

    /// Opaque data for the dataset collaborator, untouched by the resolver.
    pub fn dataset(&self) -> Option<&Value> {
        self.get("dataset")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|e| ResolveError::syntax(e.to_string()))
    }
}
