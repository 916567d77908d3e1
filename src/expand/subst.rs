//! Placeholder substitution.
//!
//! A string scalar `^name` refers to formal parameter `name` of the enclosing
//! module. Substitution is structural: the whole scalar is replaced by the
//! argument value, wherever it sits in nested sequences and mappings.
//! Nothing is evaluated.
//!
//! Inside a nested module's body a placeholder this substitution cannot
//! bind is kept as is: that module binds it, or reports it missing under its
//! own instance name, when it is instantiated.

use crate::error::{ResolveError, Result};
use crate::spec::layer::is_module;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;

/// Formal parameter named by `s`, if `s` is a placeholder.
pub fn placeholder(s: &str, sigil: char) -> Option<&str> {
    let name = s.strip_prefix(sigil)?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let ident = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    ident.then_some(name)
}

pub struct Substitution<'a> {
    module: &'a str,
    args: &'a Mapping,
    sigil: char,
}

impl<'a> Substitution<'a> {
    pub fn new(module: &'a str, args: &'a Mapping, sigil: char) -> Self {
        Self {
            module,
            args,
            sigil,
        }
    }

    pub fn apply(&self, value: &Value) -> Result<Value> {
        self.walk(value, &BTreeSet::new(), false)
    }

    pub fn apply_mapping(&self, map: &Mapping) -> Result<Mapping> {
        let shadowed = BTreeSet::new();
        let mut out = Mapping::new();
        for (k, v) in map {
            out.insert(k.clone(), self.walk(v, &shadowed, false)?);
        }
        Ok(out)
    }

    pub fn apply_all(&self, values: &[Value]) -> Result<Vec<Value>> {
        values.iter().map(|v| self.apply(v)).collect()
    }

    /// `deferred` is set inside nested module bodies.
    fn walk(&self, value: &Value, shadowed: &BTreeSet<String>, deferred: bool) -> Result<Value> {
        match value {
            Value::String(s) => match placeholder(s, self.sigil) {
                Some(name) if shadowed.contains(name) => Ok(value.clone()),
                Some(name) if deferred => {
                    Ok(self.bound(name).cloned().unwrap_or_else(|| value.clone()))
                }
                Some(name) => self.argument(name).cloned(),
                None => Ok(value.clone()),
            },
            Value::Sequence(seq) => seq
                .iter()
                .map(|v| self.walk(v, shadowed, deferred))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            Value::Mapping(map) if is_module(value) => {
                // A nested module's kwargs are evaluated here; its body sees
                // its own formals, which hide ours.
                let mut inner = shadowed.clone();
                if let Some(Value::Mapping(kwargs)) = map.get("kwargs") {
                    inner.extend(kwargs.keys().filter_map(Value::as_str).map(str::to_string));
                }
                let mut out = Mapping::new();
                for (k, v) in map {
                    let v = if k.as_str() == Some("kwargs") {
                        self.walk(v, shadowed, deferred)?
                    } else {
                        self.walk(v, &inner, true)?
                    };
                    out.insert(k.clone(), v);
                }
                Ok(Value::Mapping(out))
            }
            Value::Mapping(map) => {
                let mut out = Mapping::new();
                for (k, v) in map {
                    out.insert(k.clone(), self.walk(v, shadowed, deferred)?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Tagged(tagged) => {
                let mut tagged = tagged.clone();
                tagged.value = self.walk(&tagged.value, shadowed, deferred)?;
                Ok(Value::Tagged(tagged))
            }
            other => Ok(other.clone()),
        }
    }

    fn bound(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }

    fn argument(&self, name: &str) -> Result<&'a Value> {
        self.bound(name).ok_or_else(|| ResolveError::MissingArgument {
            module: self.module.to_string(),
            name: name.to_string(),
        })
    }
}
