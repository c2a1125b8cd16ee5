//! Renders IR expressions and literals as T-SQL text.

use itertools::Itertools;

use crate::ir::{BinOp, Expr, Projection, Scalar, UnOp};

/// `depth` is the indent depth of the line this expression is written on;
/// embedded subquery blocks indent one level further.
pub(super) fn write_expr(expr: &Expr, depth: usize) -> String {
    match expr {
        Expr::Column { table, name } => write_column(table, name),
        Expr::Constant { value } => write_scalar(value),
        Expr::Binary { op, left, right } => write_binary(*op, left, right, depth),
        Expr::Unary { op, expr } => match op {
            UnOp::Not => {
                let inner = write_expr(expr, depth);
                if inner.starts_with('(') {
                    format!("NOT {inner}")
                } else {
                    format!("NOT ({inner})")
                }
            }
            UnOp::Neg => format!("-{}", write_expr(expr, depth)),
        },
        Expr::Function { name, args } => {
            if name == "LIKE" && args.len() == 2 {
                format!(
                    "{} LIKE {}",
                    write_expr(&args[0], depth),
                    write_expr(&args[1], depth)
                )
            } else {
                format!(
                    "{}({})",
                    name,
                    args.iter().map(|arg| write_expr(arg, depth)).join(", ")
                )
            }
        }
        Expr::Aggregate { func, arg } => {
            let arg = arg
                .as_ref()
                .map(|arg| write_expr(arg, depth))
                .unwrap_or_else(|| "*".to_string());
            format!("{func}({arg})")
        }
        Expr::ScalarSubquery { plan } => {
            format!("\n{}", super::gen_query::query_block(plan, depth + 1))
        }
        Expr::Exists { plan, negated } => {
            let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
            format!(
                "{keyword} \n{}",
                super::gen_query::query_block(plan, depth + 1)
            )
        }
        Expr::InSubquery {
            expr,
            plan,
            negated,
        } => {
            let keyword = if *negated { "NOT IN" } else { "IN" };
            format!(
                "{} {keyword} \n{}",
                write_expr(expr, depth),
                super::gen_query::query_block(plan, depth + 1)
            )
        }
    }
}

fn write_binary(op: BinOp, left: &Expr, right: &Expr, depth: usize) -> String {
    match op {
        // chains of one logical operator flatten into a single enclosure
        BinOp::And | BinOp::Or => {
            let mut operands = Vec::new();
            flatten(op, left, &mut operands);
            flatten(op, right, &mut operands);
            format!(
                "({})",
                operands
                    .iter()
                    .map(|operand| write_expr(operand, depth))
                    .join(&format!(" {op} "))
            )
        }
        // bare at clause top, like LIKE
        BinOp::In => {
            if let Expr::Constant {
                value: Scalar::List(items),
            } = right
            {
                if items.is_empty() {
                    // SQL Server rejects `IN ()`
                    return "1 = 0".to_string();
                }
            }
            format!("{} IN {}", write_expr(left, depth), write_expr(right, depth))
        }
        _ => format!(
            "({} {} {})",
            write_expr(left, depth),
            op,
            write_expr(right, depth)
        ),
    }
}

fn flatten<'a>(op: BinOp, expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Binary {
            op: inner,
            left,
            right,
        } if *inner == op => {
            flatten(op, left, out);
            flatten(op, right, out);
        }
        _ => out.push(expr),
    }
}

fn write_column(table: &str, name: &str) -> String {
    if name == "*" {
        format!("[{table}].*")
    } else {
        format!("[{table}].[{name}]")
    }
}

pub(super) fn write_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Null => "NULL".to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Decimal(d) => d.to_string(),
        Scalar::Boolean(true) => "1".to_string(),
        Scalar::Boolean(false) => "0".to_string(),
        Scalar::String(s) => format!("N'{}'", s.replace('\'', "''")),
        Scalar::DateTime(dt) => format!("N'{}'", dt.format("%Y-%m-%d %H:%M:%S%.3f")),
        Scalar::List(items) => format!("({})", items.iter().map(write_scalar).join(", ")),
    }
}

pub(super) fn write_projection(projection: &Projection, depth: usize) -> String {
    let expr = write_expr(&projection.expr, depth);
    match &projection.alias {
        Some(alias) => format!("{expr} AS [{alias}]"),
        None => expr,
    }
}
