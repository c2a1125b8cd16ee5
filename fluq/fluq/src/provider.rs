//! The injected data-provider boundary. The core hands a provider the
//! versioned JSON form of a plan and gets rows back; connection handling,
//! timeouts and cancellation all live on the provider's side.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use fluq_parser::{Error, Reason, WithErrorInfo};

use crate::ir::Scalar;

/// One result row: output alias → scalar value.
pub type Record = BTreeMap<String, Scalar>;

/// A failure inside a provider, carried back through the async result
/// channel and converted to [Reason::Provider].
#[derive(Debug)]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        ProviderError(message.into())
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for Error {
    fn from(error: ProviderError) -> Self {
        Error::new(Reason::Provider { message: error.0 }).with_code("E0006")
    }
}

#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Runs the serialized plan and returns all rows.
    async fn query(&self, plan: &Value) -> Result<Vec<Record>, ProviderError>;

    /// Runs the serialized plan and returns the first row, if any.
    async fn query_first(&self, plan: &Value) -> Result<Option<Record>, ProviderError>;
}
