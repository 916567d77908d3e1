//! Module expansion: turns a layered, possibly nested graph description into
//! a flat list of nodes and wiring entries with globally unique names.
//!
//! Names are resolved lexically. A `with` name is looked up in the layers of
//! the current scope, then in the scope that defined it, and so on up to
//! `model.layers`. A module instance `fire3` opens a scope whose internal
//! nodes and bindings are renamed `fire3/<name>`; its `input` and `output`
//! are rewired to the call site's `from` and `to`.

pub mod subst;

pub use subst::{Substitution, placeholder};

use crate::error::{ResolveError, Result};
use crate::options::ResolverOptions;
use crate::spec::layer::is_module;
use crate::spec::{ModelSpec, ModuleDef, Node, RawWiring, Wiring};
use serde_yaml::{Mapping, Value};

const ROOT_SCOPE: &str = "model";

/// Flat output of expansion, in execution order. `nodes[i]` is the node
/// applied by `wiring[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub nodes: Vec<Node>,
    pub wiring: Vec<Wiring>,
}

struct Scope<'a> {
    /// Name used in diagnostics.
    label: String,
    /// Instance name prepended to internal names; empty at the root.
    prefix: String,
    layers: &'a Mapping,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    fn root(layers: &'a Mapping) -> Self {
        Self {
            label: ROOT_SCOPE.to_string(),
            prefix: String::new(),
            layers,
            parent: None,
        }
    }

    /// The layer `name` and the scope that defines it.
    fn lookup(&self, name: &str) -> Option<(&Value, &Self)> {
        if let Some(layer) = self.layers.get(name) {
            return Some((layer, self));
        }
        self.parent.and_then(|p| p.lookup(name))
    }

    fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// What a graph's `input` / `output` stand for in the enclosing graph.
struct Boundary {
    input: Vec<String>,
    output: Vec<String>,
}

pub struct Expander<'o> {
    options: &'o ResolverOptions,
}

impl<'o> Expander<'o> {
    pub fn new(options: &'o ResolverOptions) -> Self {
        Self { options }
    }

    /// Expand `model.graph` against `model.layers`.
    pub fn expand(&self, model: &ModelSpec) -> Result<Expansion> {
        let root = Scope::root(&model.layers);
        let boundary = Boundary {
            input: vec![self.options.input.clone()],
            output: vec![self.options.output.clone()],
        };

        let mut out = Expansion::default();
        self.expand_graph(&root, &model.graph, &boundary, 0, &mut out)?;
        tracing::debug!(
            nodes = out.nodes.len(),
            entries = model.graph.len(),
            "expanded model graph"
        );
        Ok(out)
    }

    /// Expand a single module call site in isolation: `layer` is the module
    /// body, `from`/`to` are the caller's bindings.
    pub fn expand_module(
        &self,
        instance: &str,
        layer: &Value,
        from: Vec<String>,
        to: Vec<String>,
    ) -> Result<Expansion> {
        let empty = Mapping::new();
        let root = Scope::root(&empty);
        let mut out = Expansion::default();
        self.instantiate(&root, instance, layer, from, to, 1, &mut out)?;
        Ok(out)
    }

    /// Returns whether the graph binds its `output`.
    fn expand_graph(
        &self,
        scope: &Scope<'_>,
        graph: &[Value],
        boundary: &Boundary,
        depth: usize,
        out: &mut Expansion,
    ) -> Result<bool> {
        let mut binds_output = false;

        for (index, entry) in graph.iter().enumerate() {
            let raw = RawWiring::from_value(&scope.label, index, entry)?;
            binds_output |= raw.to.contains(&self.options.output);

            let to: Vec<String> = raw
                .to
                .iter()
                .flat_map(|n| self.bind(scope, n, boundary))
                .collect();
            let mut from: Vec<String> = raw
                .from
                .iter()
                .flat_map(|n| self.bind(scope, n, boundary))
                .collect();

            // `with: [a, b, c]` chains; intermediate results are named after the layer.
            let last = raw.with.0.len() - 1;
            for (i, name) in raw.with.iter().enumerate() {
                let dst = if i == last {
                    to.clone()
                } else {
                    self.bind(scope, name, boundary)
                };
                self.apply(scope, name, from, dst.clone(), depth, out)?;
                from = dst;
            }
        }

        Ok(binds_output)
    }

    /// Global binding names for local binding `local`.
    fn bind(&self, scope: &Scope<'_>, local: &str, boundary: &Boundary) -> Vec<String> {
        if local == self.options.input {
            boundary.input.clone()
        } else if local == self.options.output {
            boundary.output.clone()
        } else {
            vec![self.options.scoped(&scope.prefix, local)]
        }
    }

    fn apply(
        &self,
        scope: &Scope<'_>,
        name: &str,
        from: Vec<String>,
        to: Vec<String>,
        depth: usize,
        out: &mut Expansion,
    ) -> Result<()> {
        let Some((layer, found)) = scope.lookup(name) else {
            return Err(ResolveError::UnknownLayer {
                scope: scope.label.clone(),
                name: name.to_string(),
            });
        };
        let instance = self.options.scoped(&scope.prefix, name);

        // Layers inside a module were substituted when it was instantiated.
        // Top-level ones have no arguments: a placeholder left in a leaf is
        // unbound, one in a module body is bound by `instantiate`.
        let layer = if found.is_root() {
            let empty = Mapping::new();
            Substitution::new(&found.label, &empty, self.options.sigil).apply(layer)?
        } else {
            layer.clone()
        };

        if is_module(&layer) {
            return self.instantiate(found, &instance, &layer, from, to, depth + 1, out);
        }

        out.nodes.push(Node::from_layer(&instance, &layer)?);
        out.wiring.push(Wiring {
            from,
            with: instance,
            to,
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn instantiate(
        &self,
        defined_in: &Scope<'_>,
        instance: &str,
        layer: &Value,
        from: Vec<String>,
        to: Vec<String>,
        depth: usize,
        out: &mut Expansion,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(ResolveError::RecursionLimit {
                module: instance.to_string(),
                limit: self.options.max_depth,
            });
        }

        let def = ModuleDef::from_layer(instance, layer)?;
        let sub = Substitution::new(instance, &def.kwargs, self.options.sigil);
        let layers = sub.apply_mapping(&def.layers)?;
        let graph = sub.apply_all(&def.graph)?;

        tracing::debug!(
            module = instance,
            depth,
            layers = layers.len(),
            "instantiating module"
        );

        let inner = Scope {
            label: instance.to_string(),
            prefix: instance.to_string(),
            layers: &layers,
            parent: Some(defined_in),
        };
        let boundary = Boundary {
            input: from,
            output: to,
        };
        if !self.expand_graph(&inner, &graph, &boundary, depth, out)? {
            return Err(ResolveError::UnboundOutput {
                scope: instance.to_string(),
                name: self.options.output.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Document;
    use pretty_assertions::assert_eq;

    const FIRE: &str = r#"
model:
  layers:
    _conv: &conv
      type: convolution
      padding: same
      kernel_size: 1
    _fire: &fire
      type: module
      kwargs: {squeeze_depth: null, expand_depth: null}
      layers:
        squeeze: {<<: *conv, num_outputs: ^squeeze_depth}
        expand1: &expand1 {<<: *conv, num_outputs: ^expand_depth}
        expand3: {<<: *expand1, kernel_size: 3}
        concat: {type: concat, axis: 3}
      graph:
        - {from: input, with: squeeze, to: squeezed}
        - {from: squeezed, with: expand1, to: expanded1}
        - {from: squeezed, with: expand3, to: expanded3}
        - {from: [expanded1, expanded3], with: concat, to: output}
    fire2: {<<: *fire, kwargs: {squeeze_depth: 16, expand_depth: 64}}
    fire3: {<<: *fire, kwargs: {squeeze_depth: 10, expand_depth: 20}}
    pool: {type: max_pool, kernel_size: 2}
  graph:
    - {from: input, with: fire2, to: fire2}
    - {from: fire2, with: [fire3, pool], to: output}
"#;

    fn model(text: &str) -> ModelSpec {
        ModelSpec::from_document(&Document::parse(text).unwrap()).unwrap()
    }

    fn expand(text: &str) -> Result<Expansion> {
        Expander::new(&ResolverOptions::default()).expand(&model(text))
    }

    #[test]
    fn modules_are_inlined_and_renamed() {
        let got = expand(FIRE).unwrap();
        let names: Vec<&str> = got.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "fire2/squeeze",
                "fire2/expand1",
                "fire2/expand3",
                "fire2/concat",
                "fire3/squeeze",
                "fire3/expand1",
                "fire3/expand3",
                "fire3/concat",
                "pool",
            ]
        );

        assert_eq!(
            got.wiring[0],
            Wiring {
                from: vec!["input".into()],
                with: "fire2/squeeze".into(),
                to: vec!["fire2/squeezed".into()],
            }
        );
        assert_eq!(
            got.wiring[3],
            Wiring {
                from: vec!["fire2/expanded1".into(), "fire2/expanded3".into()],
                with: "fire2/concat".into(),
                to: vec!["fire2".into()],
            }
        );
        // chained `with`: fire3's output is bound under the layer name
        assert_eq!(got.wiring[4].from, vec!["fire2"]);
        assert_eq!(got.wiring[7].to, vec!["fire3"]);
        assert_eq!(got.wiring[8].from, vec!["fire3"]);
        assert_eq!(got.wiring[8].to, vec!["output"]);
    }

    #[test]
    fn arguments_reach_nested_values() {
        let got = expand(FIRE).unwrap();
        let expand3 = got
            .nodes
            .iter()
            .find(|n| n.name == "fire3/expand3")
            .unwrap();
        assert_eq!(expand3.kind, "convolution");
        assert_eq!(expand3.params.get("num_outputs"), Some(&Value::from(20)));
        assert_eq!(expand3.params.get("kernel_size"), Some(&Value::from(3)));
    }

    #[test]
    fn undefined_layer_is_reported_with_its_scope() {
        let text = FIRE.replace("with: concat", "with: concatenate");
        assert_eq!(
            expand(&text),
            Err(ResolveError::UnknownLayer {
                scope: "fire2".into(),
                name: "concatenate".into()
            })
        );
    }

    #[test]
    fn module_must_bind_its_output() {
        let text = FIRE.replace("with: concat, to: output", "with: concat, to: joined");
        assert_eq!(
            expand(&text),
            Err(ResolveError::UnboundOutput {
                scope: "fire2".into(),
                name: "output".into()
            })
        );
    }

    #[test]
    fn self_reference_hits_the_depth_limit() {
        let text = r#"
model:
  layers:
    block:
      type: module
      layers: {relu: {type: activation}}
      graph:
        - {from: input, with: relu, to: x}
        - {from: x, with: block, to: output}
  graph:
    - {from: input, with: block, to: output}
"#;
        let opts = ResolverOptions {
            max_depth: 4,
            ..ResolverOptions::default()
        };
        let err = Expander::new(&opts).expand(&model(text)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::RecursionLimit {
                module: "block/block/block/block/block".into(),
                limit: 4
            }
        );
    }

    #[test]
    fn inner_modules_see_outer_arguments_through_kwargs() {
        let text = r#"
model:
  layers:
    outer:
      type: module
      kwargs: {width: 8}
      layers:
        inner:
          type: module
          kwargs: {depth: ^width}
          layers: {conv: {type: convolution, num_outputs: ^depth}}
          graph: [{from: input, with: conv, to: output}]
      graph: [{from: input, with: inner, to: output}]
  graph:
    - {from: input, with: outer, to: output}
"#;
        let got = expand(text).unwrap();
        assert_eq!(got.nodes.len(), 1);
        assert_eq!(got.nodes[0].name, "outer/inner/conv");
        assert_eq!(got.nodes[0].params.get("num_outputs"), Some(&Value::from(8)));
        assert_eq!(got.wiring[0].from, vec!["input"]);
        assert_eq!(got.wiring[0].to, vec!["output"]);
    }

    #[test]
    fn top_level_placeholders_are_unbound() {
        let text = r#"
model:
  layers:
    conv: {type: convolution, num_outputs: ^depth}
  graph:
    - {from: input, with: conv, to: output}
"#;
        assert_eq!(
            expand(text),
            Err(ResolveError::MissingArgument {
                module: "model".into(),
                name: "depth".into()
            })
        );
    }

    #[test]
    fn absent_formal_is_reported_under_the_instance() {
        let text = FIRE.replace(
            "fire3: {<<: *fire, kwargs: {squeeze_depth: 10, expand_depth: 20}}",
            "fire3: {<<: *fire, kwargs: {expand_depth: 20}}",
        );
        assert_eq!(
            expand(&text),
            Err(ResolveError::MissingArgument {
                module: "fire3".into(),
                name: "squeeze_depth".into()
            })
        );
    }

    #[test]
    fn absent_formal_of_a_nested_module_names_the_inner_instance() {
        let text = r#"
model:
  layers:
    outer:
      type: module
      kwargs: {width: 8}
      layers:
        inner:
          type: module
          kwargs: {width: ^width}
          layers: {conv: {type: convolution, num_outputs: ^depth}}
          graph: [{from: input, with: conv, to: output}]
      graph: [{from: input, with: inner, to: output}]
  graph:
    - {from: input, with: outer, to: output}
"#;
        assert_eq!(
            expand(text),
            Err(ResolveError::MissingArgument {
                module: "outer/inner".into(),
                name: "depth".into()
            })
        );
    }
}
