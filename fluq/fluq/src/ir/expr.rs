use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::plan::Plan;
use super::scalar::Scalar;

/// A SQL expression. Subquery variants own their plans outright; plans form
/// strict trees with no back references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Qualified column reference; `name == "*"` is the wildcard.
    Column {
        table: String,
        name: String,
    },
    Constant {
        value: Scalar,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    /// Generic function call; `LIKE` and `CONCAT` get special rendering.
    Function {
        name: String,
        args: Vec<Expr>,
    },
    Aggregate {
        func: AggregateFunc,
        arg: Option<Box<Expr>>,
    },
    ScalarSubquery {
        plan: Box<Plan>,
    },
    Exists {
        plan: Box<Plan>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        plan: Box<Plan>,
        negated: bool,
    },
}

impl Expr {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Expr {
        Expr::Column {
            table: table.into(),
            name: name.into(),
        }
    }

    pub fn constant(value: impl Into<Scalar>) -> Expr {
        Expr::Constant {
            value: value.into(),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnOp, expr: Expr) -> Expr {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn aggregate(func: AggregateFunc, arg: Option<Expr>) -> Expr {
        Expr::Aggregate {
            func,
            arg: arg.map(Box::new),
        }
    }
}

/// AND-combines an optional existing clause with a new one.
pub(crate) fn and_merge(existing: Option<Expr>, new: Expr) -> Expr {
    match existing {
        Some(old) => Expr::binary(BinOp::And, old, new),
        None => new,
    }
}

/// One SELECT-list item. A missing alias omits the `AS` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub expr: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub table: String,
    pub alias: String,
    pub on: Expr,
    pub kind: JoinKind,
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub expr: Expr,
    pub direction: SortDirection,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "%")]
    Mod,
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = "<>")]
    Ne,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "IN")]
    In,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum UnOp {
    #[strum(to_string = "NOT")]
    Not,
    #[strum(to_string = "-")]
    Neg,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    /// The default projection alias, eg `AVG(…) AS [avg]`.
    pub fn default_alias(self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }

    pub fn from_name(name: &str) -> Option<AggregateFunc> {
        match name {
            "COUNT" => Some(AggregateFunc::Count),
            "SUM" => Some(AggregateFunc::Sum),
            "AVG" => Some(AggregateFunc::Avg),
            "MIN" => Some(AggregateFunc::Min),
            "MAX" => Some(AggregateFunc::Max),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[strum(to_string = "INNER")]
    Inner,
    #[strum(to_string = "LEFT OUTER")]
    LeftOuter,
    #[strum(to_string = "RIGHT OUTER")]
    RightOuter,
    #[strum(to_string = "FULL OUTER")]
    FullOuter,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    #[strum(to_string = "ASC")]
    Asc,
    #[strum(to_string = "DESC")]
    Desc,
}
