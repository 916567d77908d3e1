use crate::error::{ResolveError, Result};
use crate::expand::Expansion;
use crate::options::ResolverOptions;
use crate::plan::{Plan, Step};
use std::collections::BTreeSet;

/// Build the execution plan from an expansion.
///
/// Entries are taken in declaration order; the order is checked, never
/// rearranged:
/// - every node name is applied once
/// - every `from` is already bound (`input` is bound before step 0)
/// - every `to` is bound exactly once
/// - `output` is bound at the end
pub fn assemble(expansion: Expansion, options: &ResolverOptions) -> Result<Plan> {
    let Expansion { nodes, wiring } = expansion;

    debug_assert_eq!(nodes.len(), wiring.len());

    // 1) A name applied twice would be two nodes sharing a name.
    let mut names: BTreeSet<&str> = BTreeSet::new();
    if let Some(dup) = nodes.iter().find(|n| !names.insert(n.name.as_str())) {
        return Err(ResolveError::DuplicateNode(dup.name.clone()));
    }

    // 2) Everything produced anywhere, to tell "later" from "never".
    let produced: BTreeSet<&str> = wiring
        .iter()
        .flat_map(|w| w.to.iter().map(String::as_str))
        .collect();

    // 3) Walk in declaration order.
    let mut bound: BTreeSet<String> = BTreeSet::new();
    bound.insert(options.input.clone());

    let mut steps = Vec::with_capacity(wiring.len());
    for (index, (node, w)) in nodes.iter().zip(&wiring).enumerate() {
        for binding in &w.from {
            if bound.contains(binding) {
                continue;
            }
            return Err(if produced.contains(binding.as_str()) {
                ResolveError::OutOfOrderReference {
                    node: node.name.clone(),
                    binding: binding.clone(),
                }
            } else {
                ResolveError::UnresolvedReference {
                    node: node.name.clone(),
                    binding: binding.clone(),
                }
            });
        }
        for binding in &w.to {
            if !bound.insert(binding.clone()) {
                return Err(ResolveError::DuplicateBinding {
                    node: node.name.clone(),
                    binding: binding.clone(),
                });
            }
        }

        steps.push(Step {
            index,
            node: node.clone(),
            inputs: w.from.clone(),
            outputs: w.to.clone(),
        });
    }

    // 4) Terminal binding.
    if !bound.contains(&options.output) {
        return Err(ResolveError::UnboundOutput {
            scope: "model".to_string(),
            name: options.output.clone(),
        });
    }

    let plan = Plan {
        input: options.input.clone(),
        output: options.output.clone(),
        steps,
    };
    for index in plan.dead_steps() {
        let step = &plan.steps[index];
        tracing::warn!(
            step = index,
            node = %step.node.name,
            "outputs never reach `{}`",
            plan.output
        );
    }
    tracing::debug!(steps = plan.steps.len(), "assembled plan");
    Ok(plan)
}
