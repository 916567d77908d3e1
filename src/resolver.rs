//! The load -> expand -> assemble pipeline.
//!
//! Each stage is a pure function of its input; a resolver holds no state
//! between calls, so independent documents can be resolved concurrently.

use crate::doc::Document;
use crate::error::Result;
use crate::expand::Expander;
use crate::options::ResolverOptions;
use crate::plan::{Plan, assemble};
use crate::spec::ModelSpec;
use serde::Serialize;
use serde_yaml::Value;

/// Everything an external engine needs: the plan plus the dataset section,
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub dataset: Option<Value>,
    pub plan: Plan,
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Parse, merge, override and link a stack of documents.
    pub fn load<'a, T, O>(&self, texts: T, overrides: O) -> Result<Document>
    where
        T: IntoIterator<Item = &'a str>,
        O: IntoIterator<Item = &'a str>,
    {
        let mut doc = Document::parse_all(texts)?;
        for spec in overrides {
            doc.apply_override(spec)?;
        }
        doc.resolve_links()?;
        Ok(doc)
    }

    pub fn resolve(&self, doc: &Document) -> Result<Resolved> {
        let model = ModelSpec::from_document(doc)?;
        let expansion = Expander::new(&self.options).expand(&model)?;
        let plan = assemble(expansion, &self.options)?;
        tracing::debug!(
            layers = model.layers.len(),
            steps = plan.len(),
            "resolved document"
        );
        Ok(Resolved {
            dataset: doc.dataset().cloned(),
            plan,
        })
    }

    pub fn resolve_str(&self, text: &str) -> Result<Resolved> {
        let doc = self.load([text], std::iter::empty::<&str>())?;
        self.resolve(&doc)
    }
}
