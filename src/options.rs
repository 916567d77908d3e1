//! Resolver configuration.
//!
//! Options come from three layers, lowest precedence first: built-in
//! defaults, the document's optional `system.resolver` mapping, and CLI flags.

use crate::doc::Document;
use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverOptions {
    /// Maximum number of nested module instantiations.
    pub max_depth: usize,
    /// Joins a module instance name and its internal names.
    pub separator: String,
    /// Designated graph input binding.
    pub input: String,
    /// Designated graph output binding.
    pub output: String,
    /// Prefix marking a formal-parameter placeholder, e.g. `^expand_depth`.
    pub sigil: char,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: 16,
            separator: "/".to_string(),
            input: "input".to_string(),
            output: "output".to_string(),
            sigil: '^',
        }
    }
}

impl ResolverOptions {
    pub const DOCUMENT_KEY: &'static str = "system.resolver";

    /// Read options from `system.resolver`, falling back to defaults when the
    /// section is absent.
    pub fn from_document(doc: &Document) -> Result<Self> {
        match doc.get(Self::DOCUMENT_KEY) {
            None => Ok(Self::default()),
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| {
                ResolveError::syntax(format!("{}: {}", Self::DOCUMENT_KEY, e))
            }),
        }
    }

    /// Name of `local` inside the scope of module instance `instance`.
    pub fn scoped(&self, instance: &str, local: &str) -> String {
        if instance.is_empty() {
            local.to_string()
        } else {
            format!("{}{}{}", instance, self.separator, local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_section_overrides_defaults() {
        let doc = Document::parse("system:\n  resolver:\n    max_depth: 3\n    separator: '.'\n")
            .unwrap();
        let opts = ResolverOptions::from_document(&doc).unwrap();
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.separator, ".");
        assert_eq!(opts.input, "input");
        assert_eq!(opts.scoped("fire3", "squeeze"), "fire3.squeeze");
    }

    #[test]
    fn missing_section_uses_defaults() {
        let doc = Document::parse("model: {}\n").unwrap();
        assert_eq!(
            ResolverOptions::from_document(&doc).unwrap(),
            ResolverOptions::default()
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        let doc = Document::parse("system: {resolver: {depth: 3}}\n").unwrap();
        assert!(matches!(
            ResolverOptions::from_document(&doc),
            Err(ResolveError::Syntax { .. })
        ));
    }
}
