//! The operator surface of [Plan]. Every operator parses its lambda sources,
//! translates them against the current tracker, and returns a fresh plan;
//! the receiver is never touched.

use fluq_parser::parser::ar::Lambda;
use fluq_parser::{parse_lambda, Error};

use crate::ir::{
    and_merge, AggregateFunc, BinOp, Expr, Join, JoinKind, Ordering, Plan, Projection,
    SortDirection, Variables,
};
use crate::semantic::{register_result_selector, rebuild_tracker, Resolver};
use crate::Result;

impl Plan {
    fn parsed(source: &str) -> Result<Lambda> {
        parse_lambda(source).map_err(Error::from)
    }

    /// Parses and resolves a selector that must name a single column.
    fn key_column(&self, selector: &str) -> Result<Expr> {
        let lambda = Self::parsed(selector)?;
        Resolver::new(self, &lambda).column(&lambda.body)
    }

    fn with_filter(&self, expr: Expr) -> Plan {
        let mut plan = self.clone();
        plan.filter = Some(and_merge(plan.filter.take(), expr));
        plan
    }

    /// Filters rows; multiple calls AND-combine.
    pub fn filter(&self, predicate: &str) -> Result<Plan> {
        let lambda = Self::parsed(predicate)?;
        let predicate = Resolver::new(self, &lambda).expr(&lambda.body)?;
        Ok(self.with_filter(predicate))
    }

    /// Replaces the projections and rebuilds the tracker from them.
    pub fn select(&self, selector: &str) -> Result<Plan> {
        let lambda = Self::parsed(selector)?;
        let projections = Resolver::new(self, &lambda).projections(&lambda.body)?;
        let mut plan = self.clone();
        plan.tracker = rebuild_tracker(&projections, &plan.alias);
        plan.projections = projections;
        Ok(plan)
    }

    /// Appends an inner join; see [Plan::join_kind].
    pub fn join(
        &self,
        target: &Plan,
        source_key: &str,
        target_key: &str,
        result: &str,
    ) -> Result<Plan> {
        self.join_kind(target, source_key, target_key, result, JoinKind::Inner)
    }

    /// Appends a join on `source_key = target_key`, then runs the result
    /// selector to extend the tracker: identifier values register the whole
    /// joined object, chain values register single columns.
    pub fn join_kind(
        &self,
        target: &Plan,
        source_key: &str,
        target_key: &str,
        result: &str,
        kind: JoinKind,
    ) -> Result<Plan> {
        let source_col = self.key_column(source_key)?;
        let target_col = target.key_column(target_key)?;

        let mut plan = self.clone();
        plan.joins.push(Join {
            table: target.table.clone(),
            alias: target.alias.clone(),
            on: Expr::binary(BinOp::Eq, source_col, target_col),
            kind,
        });

        let selector = Self::parsed(result)?;
        register_result_selector(&mut plan.tracker, &selector, &plan.alias, &target.alias)?;
        Ok(plan)
    }

    /// Appends an ascending ORDER BY term; calls accumulate in order.
    pub fn order_by(&self, selector: &str) -> Result<Plan> {
        self.order_by_direction(selector, SortDirection::Asc)
    }

    pub fn order_by_desc(&self, selector: &str) -> Result<Plan> {
        self.order_by_direction(selector, SortDirection::Desc)
    }

    pub fn order_by_direction(&self, selector: &str, direction: SortDirection) -> Result<Plan> {
        let lambda = Self::parsed(selector)?;
        let expr = Resolver::new(self, &lambda).expr(&lambda.body)?;
        let mut plan = self.clone();
        plan.orderings.push(Ordering { expr, direction });
        Ok(plan)
    }

    /// Orders by an aggregate; `selector` is required for everything but
    /// `COUNT`.
    pub fn order_by_aggregate(
        &self,
        func: AggregateFunc,
        selector: Option<&str>,
        direction: SortDirection,
    ) -> Result<Plan> {
        let expr = self.aggregate_expr(func, selector)?;
        let mut plan = self.clone();
        plan.orderings.push(Ordering { expr, direction });
        Ok(plan)
    }

    pub fn order_by_count(&self, direction: SortDirection) -> Result<Plan> {
        self.order_by_aggregate(AggregateFunc::Count, None, direction)
    }

    pub fn order_by_sum(&self, selector: &str, direction: SortDirection) -> Result<Plan> {
        self.order_by_aggregate(AggregateFunc::Sum, Some(selector), direction)
    }

    pub fn order_by_avg(&self, selector: &str, direction: SortDirection) -> Result<Plan> {
        self.order_by_aggregate(AggregateFunc::Avg, Some(selector), direction)
    }

    pub fn order_by_min(&self, selector: &str, direction: SortDirection) -> Result<Plan> {
        self.order_by_aggregate(AggregateFunc::Min, Some(selector), direction)
    }

    pub fn order_by_max(&self, selector: &str, direction: SortDirection) -> Result<Plan> {
        self.order_by_aggregate(AggregateFunc::Max, Some(selector), direction)
    }

    /// Replaces the grouping keys; the selector must return an array.
    pub fn group_by(&self, selector: &str) -> Result<Plan> {
        let lambda = Self::parsed(selector)?;
        let keys = Resolver::new(self, &lambda).group_keys(&lambda.body)?;
        let mut plan = self.clone();
        plan.group_keys = keys;
        Ok(plan)
    }

    /// ANDs a predicate into the HAVING clause.
    pub fn having(&self, predicate: &str) -> Result<Plan> {
        let lambda = Self::parsed(predicate)?;
        let predicate = Resolver::new(self, &lambda).expr(&lambda.body)?;
        let mut plan = self.clone();
        plan.having = Some(and_merge(plan.having.take(), predicate));
        Ok(plan)
    }

    /// ANDs a predicate over an aggregate into the HAVING clause: the
    /// predicate's parameter stands for the aggregate, so
    /// `having_aggregate(Count, None, "c => c > 5")` yields
    /// `HAVING (COUNT(*) > 5)`.
    pub fn having_aggregate(
        &self,
        func: AggregateFunc,
        selector: Option<&str>,
        predicate: &str,
    ) -> Result<Plan> {
        let aggregate = self.aggregate_expr(func, selector)?;
        let lambda = Self::parsed(predicate)?;
        let predicate = Resolver::with_param_expr(self, &lambda, &aggregate).expr(&lambda.body)?;
        let mut plan = self.clone();
        plan.having = Some(and_merge(plan.having.take(), predicate));
        Ok(plan)
    }

    pub fn having_count(&self, predicate: &str) -> Result<Plan> {
        self.having_aggregate(AggregateFunc::Count, None, predicate)
    }

    pub fn having_sum(&self, selector: &str, predicate: &str) -> Result<Plan> {
        self.having_aggregate(AggregateFunc::Sum, Some(selector), predicate)
    }

    pub fn having_avg(&self, selector: &str, predicate: &str) -> Result<Plan> {
        self.having_aggregate(AggregateFunc::Avg, Some(selector), predicate)
    }

    pub fn having_min(&self, selector: &str, predicate: &str) -> Result<Plan> {
        self.having_aggregate(AggregateFunc::Min, Some(selector), predicate)
    }

    pub fn having_max(&self, selector: &str, predicate: &str) -> Result<Plan> {
        self.having_aggregate(AggregateFunc::Max, Some(selector), predicate)
    }

    /// Appends an aggregate projection; the alias defaults to the lowercase
    /// function name.
    pub fn aggregate(
        &self,
        func: AggregateFunc,
        selector: Option<&str>,
        alias: Option<&str>,
    ) -> Result<Plan> {
        let expr = self.aggregate_expr(func, selector)?;
        let alias = alias.unwrap_or(func.default_alias()).to_string();
        let mut plan = self.clone();
        plan.projections.push(Projection {
            expr,
            alias: Some(alias),
        });
        Ok(plan)
    }

    /// Appends `COUNT(*) AS [count]`.
    pub fn count(&self) -> Result<Plan> {
        self.aggregate(AggregateFunc::Count, None, None)
    }

    pub fn sum(&self, selector: &str) -> Result<Plan> {
        self.aggregate(AggregateFunc::Sum, Some(selector), None)
    }

    pub fn avg(&self, selector: &str) -> Result<Plan> {
        self.aggregate(AggregateFunc::Avg, Some(selector), None)
    }

    pub fn min(&self, selector: &str) -> Result<Plan> {
        self.aggregate(AggregateFunc::Min, Some(selector), None)
    }

    pub fn max(&self, selector: &str) -> Result<Plan> {
        self.aggregate(AggregateFunc::Max, Some(selector), None)
    }

    fn aggregate_expr(&self, func: AggregateFunc, selector: Option<&str>) -> Result<Expr> {
        let arg = match selector {
            Some(selector) => Some(self.key_column(selector)?),
            None if func == AggregateFunc::Count => None,
            None => {
                return Err(Error::new_simple(format!(
                    "{func} requires a column selector"
                )))
            }
        };
        Ok(Expr::aggregate(func, arg))
    }

    pub fn limit(&self, n: u64) -> Plan {
        let mut plan = self.clone();
        plan.limit = Some(n);
        plan
    }

    pub fn offset(&self, n: u64) -> Plan {
        let mut plan = self.clone();
        plan.offset = Some(n);
        plan
    }

    /// Replaces the bound variables visible to two-parameter lambdas on this
    /// plan.
    pub fn with_variables(&self, variables: Variables) -> Plan {
        let mut plan = self.clone();
        plan.variables = variables;
        plan
    }

    /// `column IN (subquery)`.
    pub fn filter_in(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_membership(selector, subquery, false)
    }

    /// `column NOT IN (subquery)`.
    pub fn filter_not_in(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_membership(selector, subquery, true)
    }

    fn filter_membership(&self, selector: &str, subquery: &Plan, negated: bool) -> Result<Plan> {
        let column = self.key_column(selector)?;
        Ok(self.with_filter(Expr::InSubquery {
            expr: Box::new(column),
            plan: Box::new(subquery.clone()),
            negated,
        }))
    }

    pub fn filter_exists(&self, subquery: &Plan) -> Plan {
        self.with_filter(Expr::Exists {
            plan: Box::new(subquery.clone()),
            negated: false,
        })
    }

    pub fn filter_not_exists(&self, subquery: &Plan) -> Plan {
        self.with_filter(Expr::Exists {
            plan: Box::new(subquery.clone()),
            negated: true,
        })
    }

    /// `column <op> (scalar subquery)` comparisons.
    pub fn filter_compare(&self, op: BinOp, selector: &str, subquery: &Plan) -> Result<Plan> {
        let column = self.key_column(selector)?;
        Ok(self.with_filter(Expr::binary(
            op,
            column,
            Expr::ScalarSubquery {
                plan: Box::new(subquery.clone()),
            },
        )))
    }

    pub fn filter_eq(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Eq, selector, subquery)
    }

    pub fn filter_ne(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Ne, selector, subquery)
    }

    pub fn filter_gt(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Gt, selector, subquery)
    }

    pub fn filter_gte(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Gte, selector, subquery)
    }

    pub fn filter_lt(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Lt, selector, subquery)
    }

    pub fn filter_lte(&self, selector: &str, subquery: &Plan) -> Result<Plan> {
        self.filter_compare(BinOp::Lte, selector, subquery)
    }

    /// Clones `subquery` with `sub_key = parent_key` ANDed into its filter,
    /// correlating it to this plan.
    pub fn correlate(&self, subquery: &Plan, sub_key: &str, parent_key: &str) -> Result<Plan> {
        let sub_col = subquery.key_column(sub_key)?;
        let parent_col = self.key_column(parent_key)?;
        let mut sub = subquery.clone();
        sub.filter = Some(and_merge(
            sub.filter.take(),
            Expr::binary(BinOp::Eq, sub_col, parent_col),
        ));
        Ok(sub)
    }

    pub fn filter_in_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_in(selector, &self.correlate(subquery, sub_key, parent_key)?)
    }

    pub fn filter_not_in_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_not_in(selector, &self.correlate(subquery, sub_key, parent_key)?)
    }

    pub fn filter_exists_correlated(
        &self,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        Ok(self.filter_exists(&self.correlate(subquery, sub_key, parent_key)?))
    }

    pub fn filter_not_exists_correlated(
        &self,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        Ok(self.filter_not_exists(&self.correlate(subquery, sub_key, parent_key)?))
    }

    pub fn filter_compare_correlated(
        &self,
        op: BinOp,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare(op, selector, &self.correlate(subquery, sub_key, parent_key)?)
    }

    pub fn filter_eq_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Eq, selector, subquery, sub_key, parent_key)
    }

    pub fn filter_ne_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Ne, selector, subquery, sub_key, parent_key)
    }

    pub fn filter_gt_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Gt, selector, subquery, sub_key, parent_key)
    }

    pub fn filter_gte_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Gte, selector, subquery, sub_key, parent_key)
    }

    pub fn filter_lt_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Lt, selector, subquery, sub_key, parent_key)
    }

    pub fn filter_lte_correlated(
        &self,
        selector: &str,
        subquery: &Plan,
        sub_key: &str,
        parent_key: &str,
    ) -> Result<Plan> {
        self.filter_compare_correlated(BinOp::Lte, selector, subquery, sub_key, parent_key)
    }

    /// Appends a named scalar-subquery projection: `target` is correlated on
    /// `sub_key = parent_key`, then `build` shapes it (typically into an
    /// aggregate).
    pub fn with_subquery<F>(
        &self,
        name: &str,
        target: &Plan,
        parent_key: &str,
        sub_key: &str,
        build: F,
    ) -> Result<Plan>
    where
        F: FnOnce(Plan) -> Result<Plan>,
    {
        let sub = self.correlate(target, sub_key, parent_key)?;
        let sub = build(sub)?;
        let mut plan = self.clone();
        plan.projections.push(Projection {
            expr: Expr::ScalarSubquery {
                plan: Box::new(sub),
            },
            alias: Some(name.to_string()),
        });
        Ok(plan)
    }
}
