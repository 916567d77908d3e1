//! Execution plan: the terminal artifact handed to an execution engine.
//!
//! A plan is an ordered list of steps. Each step applies one node to
//! already-bound inputs and introduces its output bindings. Plans are never
//! mutated after assembly, only traversed.

pub mod assemble;

pub use assemble::assemble;

use crate::spec::Node;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Position in declaration order.
    pub index: usize,
    pub node: Node,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub input: String,
    pub output: String,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step producing `binding`, if any.
    pub fn producer(&self, binding: &str) -> Option<&Step> {
        self.steps
            .iter()
            .find(|s| s.outputs.iter().any(|o| o == binding))
    }

    /// Indices of steps whose outputs never feed the graph output.
    pub fn dead_steps(&self) -> Vec<usize> {
        let mut needed: BTreeSet<&str> = BTreeSet::new();
        needed.insert(self.output.as_str());

        let mut dead = Vec::new();
        for step in self.steps.iter().rev() {
            if step.outputs.iter().any(|o| needed.contains(o.as_str())) {
                needed.extend(step.inputs.iter().map(String::as_str));
            } else {
                dead.push(step.index);
            }
        }
        dead.reverse();
        dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_yaml::Mapping;

    fn step(index: usize, name: &str, inputs: &[&str], output: &str) -> Step {
        Step {
            index,
            node: Node {
                name: name.to_string(),
                kind: "dropout".to_string(),
                params: Mapping::new(),
            },
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: vec![output.to_string()],
        }
    }

    #[test]
    fn dead_steps_are_those_off_the_output_path() {
        let plan = Plan {
            input: "input".into(),
            output: "output".into(),
            steps: vec![
                step(0, "a", &["input"], "a"),
                step(1, "side", &["a"], "side"),
                step(2, "b", &["a"], "b"),
                step(3, "c", &["b"], "output"),
            ],
        };
        assert_eq!(plan.dead_steps(), vec![1]);
        assert_eq!(plan.producer("b").map(|s| s.index), Some(2));
        assert_eq!(plan.producer("input"), None);
    }
}
