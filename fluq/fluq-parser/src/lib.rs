//! # fluq-parser
//!
//! Parses the source text of user-supplied arrow functions
//! (`u => u.age > 18`, `(u, p) => p.ids.includes(u.id)`) into a small
//! language-neutral AST, the [parser::ar] module. The `fluq` crate translates
//! that AST into its SQL expression IR.
//!
//! The pipeline is two chumsky passes:
//!
//! ```ascii
//!   source text ──lex──► lexer::lr::Tokens ──parse──► parser::ar::Lambda
//! ```
//!
//! This crate also hosts the compiler-wide [Error] type, which `fluq`
//! re-exports.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use error::{Error, Errors, MessageKind, Reason, WithErrorInfo};
pub use parser::parse_lambda;
pub use span::Span;
