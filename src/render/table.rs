use crate::plan::Plan;

enum Cell {
    Text(String),
    Num(usize),
}

impl Cell {
    fn width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Num(n) => n.to_string().len(),
        }
    }
}

/// Render a plan as a boxed text table, one row per step.
///
/// Example:
/// +---+-------+-------------+-------+-------+
/// | # | node  | type        | from  | to    |
/// +---+-------+-------------+-------+-------+
/// | 0 | conv0 | convolution | input | conv0 |
/// +---+-------+-------------+-------+-------+
pub fn render_plan_table(plan: &Plan) -> String {
    let header = ["#", "node", "type", "from", "to"];

    let rows: Vec<[Cell; 5]> = plan
        .steps
        .iter()
        .map(|s| {
            [
                Cell::Num(s.index),
                Cell::Text(s.node.name.clone()),
                Cell::Text(s.node.kind.clone()),
                Cell::Text(s.inputs.join(", ")),
                Cell::Text(s.outputs.join(", ")),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let rule = format!(
        "+-{}-+",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(rule.clone());
    out.push(format!(
        "| {} |",
        header
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    out.push(rule.clone());
    for row in &rows {
        let cols: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| match cell {
                Cell::Text(s) => format!("{:<w$}", s, w = *w),
                Cell::Num(n) => format!("{:>w$}", n, w = *w),
            })
            .collect();
        out.push(format!("| {} |", cols.join(" | ")));
    }
    out.push(rule);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Step;
    use crate::spec::Node;
    use pretty_assertions::assert_eq;
    use serde_yaml::Mapping;

    #[test]
    fn renders_one_row_per_step() {
        let plan = Plan {
            input: "input".into(),
            output: "output".into(),
            steps: vec![Step {
                index: 0,
                node: Node {
                    name: "conv0".into(),
                    kind: "convolution".into(),
                    params: Mapping::new(),
                },
                inputs: vec!["input".into()],
                outputs: vec!["output".into()],
            }],
        };
        let want = "\
+---+-------+-------------+-------+--------+
| # | node  | type        | from  | to     |
+---+-------+-------------+-------+--------+
| 0 | conv0 | convolution | input | output |
+---+-------+-------------+-------+--------+";
        assert_eq!(render_plan_table(&plan), want);
    }
}
