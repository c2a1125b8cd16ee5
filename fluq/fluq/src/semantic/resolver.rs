//! Translates the lambda mini-AST into the expression IR, resolving
//! identifiers through the plan's property tracker.

use fluq_parser::parser::ar;
use fluq_parser::{Error, Reason, Span, WithErrorInfo};

use crate::ir::{AggregateFunc, BinOp, Expr, Plan, Projection, Scalar, UnOp};
use crate::semantic::PropertyTracker;
use crate::Result;

pub(crate) struct Resolver<'a> {
    plan: &'a Plan,
    params: &'a [String],
    /// When set, the first parameter stands for this expression instead of
    /// the source row (used by aggregate HAVING predicates).
    param_expr: Option<&'a Expr>,
}

impl<'a> Resolver<'a> {
    pub fn new(plan: &'a Plan, lambda: &'a ar::Lambda) -> Self {
        Resolver {
            plan,
            params: &lambda.params,
            param_expr: None,
        }
    }

    pub fn with_param_expr(plan: &'a Plan, lambda: &'a ar::Lambda, expr: &'a Expr) -> Self {
        Resolver {
            plan,
            params: &lambda.params,
            param_expr: Some(expr),
        }
    }

    fn first_param(&self) -> &str {
        self.params.first().map(|p| p.as_str()).unwrap_or_default()
    }

    fn second_param(&self) -> Option<&str> {
        self.params.get(1).map(|p| p.as_str())
    }

    fn tracker(&self) -> &PropertyTracker {
        &self.plan.tracker
    }

    pub fn expr(&self, node: &ar::Expr) -> Result<Expr> {
        match &node.kind {
            ar::ExprKind::Literal(lit) => Ok(Expr::Constant {
                value: Scalar::from(lit.clone()),
            }),
            ar::ExprKind::Ident(_) | ar::ExprKind::Property(_) => self.chain(node),
            ar::ExprKind::Array(items) => self.list(items),
            ar::ExprKind::Object(_) => Err(Error::new(Reason::Unexpected {
                found: "an object literal outside a projection".to_string(),
            })
            .with_span(node.span)),
            ar::ExprKind::Binary(binary) => {
                let op = map_bin_op(binary.op, node.span)?;
                Ok(Expr::binary(
                    op,
                    self.expr(&binary.left)?,
                    self.expr(&binary.right)?,
                ))
            }
            ar::ExprKind::Unary(unary) => {
                let op = match unary.op {
                    ar::UnOp::Not => UnOp::Not,
                    ar::UnOp::Neg => UnOp::Neg,
                };
                Ok(Expr::unary(op, self.expr(&unary.expr)?))
            }
            ar::ExprKind::Call(call) => self.call(call, node.span),
            // the parser's last-resort path: emit the text as a string constant
            ar::ExprKind::Opaque(text) => Ok(Expr::constant(text.as_str())),
        }
    }

    /// Resolves a selector that must name a single column, eg a join key.
    pub fn column(&self, node: &ar::Expr) -> Result<Expr> {
        match self.expr(node)? {
            column @ Expr::Column { .. } => Ok(column),
            _ => Err(Error::new(Reason::Expected {
                who: None,
                expected: "a column reference".to_string(),
                found: node.kind.as_ref().to_string(),
            })
            .with_span(node.span)),
        }
    }

    /// A `SELECT` selector body: an object literal maps to aliased
    /// projections (spreads expanding in place), anything else to a single
    /// projection aliased by its column name.
    pub fn projections(&self, body: &ar::Expr) -> Result<Vec<Projection>> {
        match &body.kind {
            ar::ExprKind::Object(entries) => {
                let mut projections = Vec::new();
                for entry in entries {
                    match entry {
                        ar::ObjectEntry::Property { name, value } => {
                            let expr = self.expr(value)?;
                            let alias = match &expr {
                                Expr::Column { name: column, .. } if column == "*" => None,
                                _ => Some(name.clone()),
                            };
                            projections.push(Projection { expr, alias });
                        }
                        ar::ObjectEntry::Spread(inner) => {
                            projections.extend(self.spread(inner)?);
                        }
                    }
                }
                Ok(projections)
            }
            _ => {
                let expr = self.expr(body)?;
                let alias = match &expr {
                    Expr::Column { name, .. } if name != "*" => Some(name.clone()),
                    _ => None,
                };
                Ok(vec![Projection { expr, alias }])
            }
        }
    }

    /// A `GROUP BY` selector body, which must be an array of key chains.
    pub fn group_keys(&self, body: &ar::Expr) -> Result<Vec<Expr>> {
        match &body.kind {
            ar::ExprKind::Array(items) => items.iter().map(|item| self.column(item)).collect(),
            _ => Err(Error::new(Reason::Expected {
                who: None,
                expected: "an array of grouping keys".to_string(),
                found: body.kind.as_ref().to_string(),
            })
            .with_span(body.span)),
        }
    }

    /// Identifier-rooted chains: the row parameter, the variables parameter,
    /// or a tracked logical name.
    fn chain(&self, node: &ar::Expr) -> Result<Expr> {
        let Some((head, segments)) = node.as_chain() else {
            return Err(Error::new(Reason::Unexpected {
                found: "property access on a computed value".to_string(),
            })
            .with_span(node.span));
        };

        if head == self.first_param() {
            if let Some(expr) = self.param_expr {
                return if segments.is_empty() {
                    Ok(expr.clone())
                } else {
                    Err(Error::new(Reason::Unexpected {
                        found: format!("property access on aggregate parameter `{head}`"),
                    })
                    .with_span(node.span))
                };
            }
            return self.param_chain(&segments);
        }

        if Some(head) == self.second_param() {
            return match segments.as_slice() {
                [key] => self.variable(key),
                [] => Err(Error::new(Reason::Unexpected {
                    found: format!("bare reference to variables parameter `{head}`"),
                })
                .with_span(node.span)),
                _ => Err(Error::new(Reason::Unexpected {
                    found: "nested access to a bound variable".to_string(),
                })
                .with_span(node.span)),
            };
        }

        if let Some(provenance) = self.tracker().get(head) {
            return Ok(match segments.last() {
                Some(last) => Expr::column(provenance.table.clone(), *last),
                None if provenance.is_wildcard() => Expr::column(provenance.table.clone(), "*"),
                None => Expr::column(provenance.table.clone(), provenance.column.clone()),
            });
        }

        Err(Error::new(Reason::UnresolvedProperty {
            path: node.chain_text().unwrap_or_else(|| head.to_string()),
        })
        .with_code("E0002")
        .with_span(node.span))
    }

    /// A chain rooted at the row parameter.
    fn param_chain(&self, segments: &[&str]) -> Result<Expr> {
        let default_alias = self.plan.alias.as_str();
        Ok(match segments {
            [] => Expr::column(default_alias, "*"),
            [name] => match self.tracker().get(name) {
                Some(provenance) if provenance.is_wildcard() => {
                    Expr::column(provenance.table.clone(), *name)
                }
                Some(provenance) => {
                    Expr::column(provenance.table.clone(), provenance.column.clone())
                }
                None => Expr::column(default_alias, *name),
            },
            [.., last] => self
                .resolve_nested(segments)
                .unwrap_or_else(|| Expr::column(default_alias, *last)),
        })
    }

    /// Nested chains like `j.order.amount`: try, in order, the longest
    /// registered dotted prefix, a provenance path mentioning the
    /// intermediate name, then a known alias matching it.
    fn resolve_nested(&self, segments: &[&str]) -> Option<Expr> {
        let last = *segments.last()?;
        let intermediate = segments[0];

        for k in (1..segments.len()).rev() {
            let key = segments[..k].join(".");
            if let Some(provenance) = self.tracker().get(&key) {
                return Some(Expr::column(provenance.table.clone(), last));
            }
        }

        if let Some((_, provenance)) = self
            .tracker()
            .iter()
            .find(|(_, p)| p.path_contains(intermediate))
        {
            return Some(Expr::column(provenance.table.clone(), last));
        }

        for (_, alias) in self.plan.known_tables() {
            let same_initial = alias
                .chars()
                .next()
                .zip(intermediate.chars().next())
                .is_some_and(|(a, b)| a == b);
            if alias == intermediate || same_initial {
                return Some(Expr::column(alias, last));
            }
        }

        None
    }

    fn variable(&self, key: &str) -> Result<Expr> {
        match self.plan.variables.get(key) {
            Some(value) => Ok(Expr::Constant {
                value: value.clone(),
            }),
            None => {
                log::warn!("bound variable `{key}` is not defined; substituting NULL");
                Ok(Expr::constant(Scalar::Null))
            }
        }
    }

    fn list(&self, items: &[ar::Expr]) -> Result<Expr> {
        let mut values = Vec::new();
        for item in items {
            match self.expr(item)? {
                Expr::Constant { value } => values.push(value),
                _ => {
                    return Err(Error::new(Reason::Expected {
                        who: Some("list literal".to_string()),
                        expected: "constant elements".to_string(),
                        found: item.kind.as_ref().to_string(),
                    })
                    .with_span(item.span))
                }
            }
        }
        Ok(Expr::constant(Scalar::List(values)))
    }

    fn call(&self, call: &ar::FuncCall, span: Option<Span>) -> Result<Expr> {
        match &call.callee.kind {
            ar::ExprKind::Property(ar::PropertyAccess { base, name }) => match name.as_str() {
                "includes" => self.includes(base, call, span),
                "trim" => Ok(Expr::function(
                    "LTRIM",
                    vec![Expr::function("RTRIM", vec![self.expr(base)?])],
                )),
                "trimStart" | "trimLeft" => {
                    Ok(Expr::function("LTRIM", vec![self.expr(base)?]))
                }
                "trimEnd" | "trimRight" => Ok(Expr::function("RTRIM", vec![self.expr(base)?])),
                _ => {
                    let mut args = vec![self.expr(base)?];
                    for arg in &call.args {
                        args.push(self.expr(arg)?);
                    }
                    Ok(Expr::function(name.to_uppercase(), args))
                }
            },
            ar::ExprKind::Ident(name) => {
                let upper = name.to_uppercase();
                if let Some(func) = AggregateFunc::from_name(&upper) {
                    let arg = call.args.first().map(|a| self.expr(a)).transpose()?;
                    Ok(Expr::aggregate(func, arg))
                } else {
                    let args: Vec<_> = call
                        .args
                        .iter()
                        .map(|a| self.expr(a))
                        .collect::<Result<_>>()?;
                    Ok(Expr::function(upper, args))
                }
            }
            _ => Err(Error::new(Reason::Unexpected {
                found: "call of a computed value".to_string(),
            })
            .with_span(span)),
        }
    }

    /// `x.includes(y)`: membership test against a bound list, or substring
    /// search against a string expression.
    fn includes(&self, base: &ar::Expr, call: &ar::FuncCall, span: Option<Span>) -> Result<Expr> {
        let needle = call.args.first().ok_or_else(|| {
            Error::new(Reason::Expected {
                who: Some("includes".to_string()),
                expected: "one argument".to_string(),
                found: "no arguments".to_string(),
            })
            .with_span(span)
        })?;

        let haystack = self.expr(base)?;
        match haystack {
            list @ Expr::Constant {
                value: Scalar::List(_),
            } => Ok(Expr::binary(BinOp::In, self.expr(needle)?, list)),
            other => Ok(Expr::function(
                "LIKE",
                vec![
                    other,
                    Expr::function(
                        "CONCAT",
                        vec![
                            Expr::constant("%"),
                            self.expr(needle)?,
                            Expr::constant("%"),
                        ],
                    ),
                ],
            )),
        }
    }

    /// A spread inside a projection object.
    fn spread(&self, inner: &ar::Expr) -> Result<Vec<Projection>> {
        let unresolved = || {
            Error::new(Reason::UnresolvedProperty {
                path: inner
                    .chain_text()
                    .unwrap_or_else(|| inner.kind.as_ref().to_string()),
            })
            .with_code("E0002")
            .with_span(inner.span)
        };

        let Some((head, segments)) = inner.as_chain() else {
            return Err(unresolved());
        };

        let key = if head == self.first_param() {
            match segments.as_slice() {
                [] => {
                    return Ok(vec![Projection {
                        expr: Expr::column(self.plan.alias.as_str(), "*"),
                        alias: None,
                    }])
                }
                [key] => *key,
                _ => return Err(unresolved()),
            }
        } else if segments.is_empty() {
            head
        } else {
            return Err(unresolved());
        };

        if let Some(provenance) = self.tracker().get(key) {
            if provenance.is_wildcard() {
                return Ok(vec![Projection {
                    expr: Expr::column(provenance.table.clone(), "*"),
                    alias: None,
                }]);
            }
        }

        let prefix = format!("{key}.");
        let matches: Vec<Projection> = self
            .tracker()
            .iter()
            .filter(|(_, p)| p.path.as_deref().is_some_and(|path| path.starts_with(&prefix)))
            .map(|(name, p)| Projection {
                expr: Expr::column(p.table.clone(), p.column.clone()),
                alias: Some(name.to_string()),
            })
            .collect();

        if matches.is_empty() {
            Err(unresolved())
        } else {
            Ok(matches)
        }
    }
}

fn map_bin_op(op: ar::BinOp, span: Option<Span>) -> Result<BinOp> {
    Ok(match op {
        ar::BinOp::Add => BinOp::Add,
        ar::BinOp::Sub => BinOp::Sub,
        ar::BinOp::Mul => BinOp::Mul,
        ar::BinOp::Div => BinOp::Div,
        ar::BinOp::Mod => BinOp::Mod,
        ar::BinOp::Eq => BinOp::Eq,
        ar::BinOp::Ne => BinOp::Ne,
        ar::BinOp::Gt => BinOp::Gt,
        ar::BinOp::Gte => BinOp::Gte,
        ar::BinOp::Lt => BinOp::Lt,
        ar::BinOp::Lte => BinOp::Lte,
        ar::BinOp::And => BinOp::And,
        ar::BinOp::Or => BinOp::Or,
        ar::BinOp::BitAnd | ar::BinOp::BitXor | ar::BinOp::BitOr => {
            return Err(Error::new(Reason::UnsupportedOperator { op: op.to_string() })
                .with_code("E0003")
                .with_span(span))
        }
    })
}

/// Rebuilds the tracker after a `SELECT`: every aliased projection becomes a
/// logical name addressable by later operators, keyed to its output alias.
pub(crate) fn rebuild_tracker(projections: &[Projection], default_alias: &str) -> PropertyTracker {
    let mut tracker = PropertyTracker::default();
    for projection in projections {
        match (&projection.alias, &projection.expr) {
            (Some(alias), Expr::Column { table, .. }) => {
                tracker.register(alias.clone(), table.clone(), alias.clone(), None)
            }
            (Some(alias), _) => {
                tracker.register(alias.clone(), default_alias, alias.clone(), None)
            }
            (None, Expr::Column { table, name }) if name != "*" => {
                tracker.register(name.clone(), table.clone(), name.clone(), None)
            }
            _ => {}
        }
    }
    tracker
}

/// Augments the tracker from a join's result selector: identifier values
/// register whole-object wildcards, chain values register single columns
/// carrying their dotted source path.
pub(crate) fn register_result_selector(
    tracker: &mut PropertyTracker,
    lambda: &ar::Lambda,
    parent_alias: &str,
    join_alias: &str,
) -> Result<()> {
    let ar::ExprKind::Object(entries) = &lambda.body.kind else {
        // non-object result selectors leave the tracker untouched
        return Ok(());
    };

    let first = lambda.first_param().to_string();
    let second = lambda.second_param().map(str::to_string);

    // resolve first, apply second: spreads and chains may read the tracker
    let mut registrations: Vec<(String, String, String, Option<String>)> = Vec::new();

    let alias_of = |head: &str, tracker: &PropertyTracker| -> Option<String> {
        if head == first {
            Some(parent_alias.to_string())
        } else if Some(head) == second.as_deref() {
            Some(join_alias.to_string())
        } else {
            tracker.get(head).map(|p| p.table.clone())
        }
    };

    for entry in entries {
        match entry {
            ar::ObjectEntry::Property { name, value } => {
                let Some((head, segments)) = value.as_chain() else {
                    continue;
                };
                let Some(table) = alias_of(head, tracker) else {
                    continue;
                };
                match segments.last() {
                    None => registrations.push((name.clone(), table, "*".to_string(), None)),
                    Some(last) => registrations.push((
                        name.clone(),
                        table,
                        (*last).to_string(),
                        value.chain_text(),
                    )),
                }
            }
            ar::ObjectEntry::Spread(inner) => {
                let Some((head, segments)) = inner.as_chain() else {
                    continue;
                };
                if !segments.is_empty() {
                    continue;
                }
                if let Some(table) = alias_of(head, tracker) {
                    registrations.push((head.to_string(), table, "*".to_string(), None));
                }
            }
        }
    }

    for (name, table, column, path) in registrations {
        tracker.register(name, table, column, path);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use fluq_parser::parse_lambda;

    use super::*;
    use crate::ir::{Join, JoinKind};

    fn joined_plan() -> Plan {
        let mut plan = Plan::new("users", "u");
        plan.joins.push(Join {
            table: "orders".to_string(),
            alias: "o".to_string(),
            on: Expr::binary(
                BinOp::Eq,
                Expr::column("u", "id"),
                Expr::column("o", "userId"),
            ),
            kind: JoinKind::Inner,
        });
        plan
    }

    fn resolve(plan: &Plan, source: &str) -> Expr {
        let lambda = parse_lambda(source).unwrap();
        Resolver::new(plan, &lambda).expr(&lambda.body).unwrap()
    }

    #[test]
    fn test_param_column() {
        let plan = Plan::new("users", "u");
        assert_eq!(resolve(&plan, "u => u.age"), Expr::column("u", "age"));
    }

    #[test]
    fn test_tracker_rename_wins_over_default() {
        let mut plan = Plan::new("users", "u");
        plan.tracker.register("userName", "x", "name", None);
        assert_eq!(
            resolve(&plan, "u => u.userName"),
            Expr::column("x", "name")
        );
    }

    #[test]
    fn test_nested_direct_registration() {
        let mut plan = joined_plan();
        plan.tracker.register_wildcard("order", "o");
        assert_eq!(
            resolve(&plan, "j => j.order.amount"),
            Expr::column("o", "amount")
        );
    }

    #[test]
    fn test_nested_path_scan() {
        let mut plan = joined_plan();
        plan.tracker
            .register("total", "o", "amount", Some("o.amount".to_string()));
        assert_eq!(resolve(&plan, "j => j.o.total"), Expr::column("o", "total"));
    }

    #[test]
    fn test_nested_alias_scan() {
        // nothing registered at all; `orders` shares its first letter with
        // the join alias `o`
        let plan = joined_plan();
        assert_eq!(
            resolve(&plan, "j => j.orders.amount"),
            Expr::column("o", "amount")
        );
    }

    #[test]
    fn test_nested_falls_back_to_default_alias() {
        let plan = joined_plan();
        assert_eq!(
            resolve(&plan, "j => j.zzz.amount"),
            Expr::column("u", "amount")
        );
    }

    #[test]
    fn test_unknown_head_is_unresolved() {
        let plan = Plan::new("users", "u");
        let lambda = parse_lambda("u => other.age").unwrap();
        let err = Resolver::new(&plan, &lambda)
            .expr(&lambda.body)
            .unwrap_err();
        assert!(matches!(err.reason, Reason::UnresolvedProperty { .. }));
    }

    #[test]
    fn test_opaque_becomes_string_constant() {
        let plan = Plan::new("users", "u");
        assert_eq!(
            resolve(&plan, "u => u.age > 1 ? 2 : 3"),
            Expr::constant("u.age > 1 ? 2 : 3")
        );
    }
}
