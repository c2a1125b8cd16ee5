use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::expr::{Expr, Join, Ordering, Projection};
use super::scalar::Scalar;
use crate::semantic::PropertyTracker;

/// Bound variables available to two-parameter lambdas.
pub type Variables = BTreeMap<String, Scalar>;

/// An immutable SQL query under construction. Every operator on a plan
/// clones it and replaces one field; nothing is ever mutated in place, so
/// plans can be freely shared, embedded as subqueries, and re-emitted.
///
/// An empty projection list means `SELECT *`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub table: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Variables::is_empty")]
    pub variables: Variables,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projections: Vec<Projection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_keys: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orderings: Vec<Ordering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "PropertyTracker::is_empty")]
    pub tracker: PropertyTracker,
}

impl Plan {
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Plan {
        Plan {
            table: table.into(),
            alias: alias.into(),
            variables: Variables::new(),
            projections: Vec::new(),
            joins: Vec::new(),
            filter: None,
            group_keys: Vec::new(),
            having: None,
            orderings: Vec::new(),
            limit: None,
            offset: None,
            tracker: PropertyTracker::default(),
        }
    }

    /// Every `(table, alias)` pair visible to this plan: the source table
    /// followed by the joined tables, in join order.
    pub fn known_tables(&self) -> Vec<(&str, &str)> {
        let mut tables = vec![(self.table.as_str(), self.alias.as_str())];
        tables.extend(self.joins.iter().map(|j| (j.table.as_str(), j.alias.as_str())));
        tables
    }

    /// Renders the plan as T-SQL.
    pub fn to_sql(&self) -> String {
        crate::sql::to_sql(self)
    }
}
