//! Name resolution: the property tracker (logical name → provenance) and the
//! resolver that walks the lambda mini-AST and emits IR.

mod resolver;
mod tracker;

pub(crate) use resolver::{register_result_selector, rebuild_tracker, Resolver};
pub use tracker::{PropertyTracker, Provenance};
