//! Assembles a plan's clauses into T-SQL text with the dialect's layout:
//! `TOP` vs `OFFSET…FETCH NEXT`, two projections per line, joins indented
//! two spaces, subqueries indented one level per nesting depth.

use itertools::Itertools;

use super::gen_expr::{write_expr, write_projection};
use crate::ir::Plan;

pub fn to_sql(plan: &Plan) -> String {
    plan_lines(plan, 0).join("\n")
}

/// A parenthesized subquery: the `(SELECT [TOP n]` header sits at `depth`,
/// body clauses one level deeper, closing paren glued to the last line.
pub(super) fn query_block(plan: &Plan, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    let lines = plan_lines(plan, depth + 1);

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push_str(&pad);
            out.push('(');
        } else {
            out.push('\n');
            out.push_str(&pad);
            out.push_str("  ");
        }
        out.push_str(line);
    }
    out.push(')');
    out
}

fn plan_lines(plan: &Plan, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();

    // TOP only when there is no offset; offset paging uses FETCH NEXT
    let top = match (plan.limit, plan.offset) {
        (Some(limit), None) => format!(" TOP {limit}"),
        _ => String::new(),
    };

    if plan.projections.is_empty() {
        lines.push(format!("SELECT{top} *"));
    } else {
        let count = plan.projections.len().div_ceil(2);
        let chunks: Vec<String> = plan
            .projections
            .chunks(2)
            .enumerate()
            .map(|(i, chunk)| {
                let line = chunk
                    .iter()
                    .map(|projection| write_projection(projection, depth))
                    .join(", ");
                if i + 1 < count {
                    format!("{line},")
                } else {
                    line
                }
            })
            .collect();

        if depth == 0 {
            let mut chunks = chunks.into_iter();
            lines.push(format!("SELECT{top} {}", chunks.next().unwrap_or_default()));
            lines.extend(chunks.map(|chunk| format!("  {chunk}")));
        } else {
            lines.push(format!("SELECT{top}"));
            lines.extend(chunks);
        }
    }

    lines.push(format!("FROM [{}] AS [{}]", plan.table, plan.alias));

    for join in &plan.joins {
        lines.push(format!(
            "  {} JOIN [{}] AS [{}] ON {}",
            join.kind,
            join.table,
            join.alias,
            write_expr(&join.on, depth)
        ));
    }

    if let Some(filter) = &plan.filter {
        lines.push(format!("WHERE {}", write_expr(filter, depth)));
    }

    if !plan.group_keys.is_empty() {
        lines.push(format!(
            "GROUP BY {}",
            plan.group_keys
                .iter()
                .map(|key| write_expr(key, depth))
                .join(", ")
        ));
    }

    if let Some(having) = &plan.having {
        lines.push(format!("HAVING {}", write_expr(having, depth)));
    }

    if !plan.orderings.is_empty() {
        lines.push(format!(
            "ORDER BY {}",
            plan.orderings
                .iter()
                .map(|ordering| {
                    format!("{} {}", write_expr(&ordering.expr, depth), ordering.direction)
                })
                .join(", ")
        ));
    }

    if let Some(offset) = plan.offset {
        if plan.orderings.is_empty() {
            log::warn!(
                "OFFSET {offset} emitted without ORDER BY; row order is not deterministic"
            );
        }
        lines.push(format!("OFFSET {offset} ROWS"));
        if let Some(limit) = plan.limit {
            lines.push(format!("FETCH NEXT {limit} ROWS ONLY"));
        }
    }

    lines
}
