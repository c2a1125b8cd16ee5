//! The SQL emitter: a pure, deterministic rendering of a [crate::ir::Plan]
//! into SQL Server T-SQL. Identical plans produce byte-identical text.

mod gen_expr;
mod gen_query;

pub use gen_query::to_sql;
