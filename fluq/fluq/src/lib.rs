//! # fluq
//!
//! A fluent, composable query builder that compiles arrow-function lambda
//! sources into SQL Server T-SQL.
//!
//! ```ascii
//!      lambda source text
//!
//!    (parse, fluq-parser) │
//!                         ▼
//!                     ar mini-AST
//!                         │
//!   (resolve, semantic::Resolver
//!    + PropertyTracker)   │
//!                         ▼
//!                  ir::Expr / ir::Plan ──► json (version: 1) ──► provider
//!                         │
//!          (emit, sql)    │
//!                         ▼
//!                        T-SQL
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let ctx = fluq::QueryContext::new();
//! let users = ctx.table("users")?;
//! let sql = users
//!     .filter("u => u.age > 18")?
//!     .avg("u => u.age")?
//!     .to_sql();
//! assert!(sql.starts_with("SELECT AVG([u].[age]) AS [avg]"));
//! ```
//!
//! Plans are immutable values: every operator returns a new [ir::Plan],
//! so partial queries can be shared, embedded as subqueries, and emitted
//! any number of times with byte-identical output.

pub mod context;
pub mod ir;
pub mod json;
pub mod provider;
mod queryable;
pub mod semantic;
pub mod sql;

pub use context::QueryContext;
pub use fluq_parser::{parse_lambda, Error, Errors, MessageKind, Reason, Span, WithErrorInfo};
pub use ir::{
    AggregateFunc, BinOp, Expr, Join, JoinKind, Ordering, Plan, Projection, Scalar,
    SortDirection, UnOp, Variables,
};
pub use provider::{DataProvider, ProviderError, Record};

pub type Result<T, E = Error> = core::result::Result<T, E>;
