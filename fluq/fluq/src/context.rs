//! The user-facing context: registers tables, assigns unique aliases, and
//! executes plans through the injected provider.

use std::sync::{Arc, Mutex, PoisonError};

use fluq_parser::{Error, Reason, WithErrorInfo};

use crate::ir::Plan;
use crate::json;
use crate::provider::{DataProvider, Record};
use crate::Result;

/// Entry point for building and running queries. The alias registry is the
/// only mutable state in the crate; plans themselves are immutable values.
#[derive(Default)]
pub struct QueryContext {
    provider: Option<Arc<dyn DataProvider>>,
    aliases: Mutex<AliasRegistry>,
}

impl QueryContext {
    pub fn new() -> Self {
        QueryContext::default()
    }

    pub fn with_provider(provider: Arc<dyn DataProvider>) -> Self {
        QueryContext {
            provider: Some(provider),
            aliases: Mutex::default(),
        }
    }

    /// Returns a plan over `name` with a generated alias. Repeated calls for
    /// the same table return the same alias.
    pub fn table(&self, name: &str) -> Result<Plan> {
        self.register(name, None)
    }

    /// Returns a plan over `name` with a caller-chosen alias. Fails with
    /// [Reason::AliasInUse] when the alias is already assigned.
    pub fn table_as(&self, name: &str, alias: &str) -> Result<Plan> {
        self.register(name, Some(alias))
    }

    fn register(&self, name: &str, custom: Option<&str>) -> Result<Plan> {
        let mut aliases = self
            .aliases
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let alias = aliases.resolve(name, custom)?;
        Ok(Plan::new(name, alias))
    }

    /// Serializes the plan and fetches all rows from the provider.
    pub async fn to_list(&self, plan: &Plan) -> Result<Vec<Record>> {
        let provider = self.provider()?;
        let payload = json::to_value(plan)?;
        provider.query(&payload).await.map_err(Error::from)
    }

    /// Serializes the plan and fetches the first row, if any.
    pub async fn first(&self, plan: &Plan) -> Result<Option<Record>> {
        let provider = self.provider()?;
        let payload = json::to_value(plan)?;
        provider.query_first(&payload).await.map_err(Error::from)
    }

    fn provider(&self) -> Result<&Arc<dyn DataProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| Error::new_simple("no data provider configured on this context"))
    }
}

#[derive(Default)]
struct AliasRegistry {
    /// (table, requested custom alias) → assigned alias
    assigned: Vec<(String, Option<String>, String)>,
}

impl AliasRegistry {
    fn resolve(&mut self, table: &str, custom: Option<&str>) -> Result<String> {
        if let Some((_, _, alias)) = self
            .assigned
            .iter()
            .find(|(t, c, _)| t == table && c.as_deref() == custom)
        {
            return Ok(alias.clone());
        }

        let alias = match custom {
            Some(custom) => {
                if self.taken(custom) {
                    return Err(Error::new(Reason::AliasInUse {
                        alias: custom.to_string(),
                    })
                    .with_code("E0004"));
                }
                custom.to_string()
            }
            None => self.generate(table),
        };

        self.assigned
            .push((table.to_string(), custom.map(str::to_string), alias.clone()));
        Ok(alias)
    }

    fn taken(&self, alias: &str) -> bool {
        self.assigned.iter().any(|(_, _, a)| a == alias)
    }

    /// First letter of the table name, disambiguated with `1, 2, …`.
    fn generate(&self, table: &str) -> String {
        let base = table
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('t')
            .to_string();

        if !self.taken(&base) {
            return base;
        }
        for n in 1u32.. {
            let candidate = format!("{base}{n}");
            if !self.taken(&candidate) {
                return candidate;
            }
        }
        unreachable!()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alias_generation() {
        let ctx = QueryContext::new();
        assert_eq!(ctx.table("users").unwrap().alias, "u");
        assert_eq!(ctx.table("urls").unwrap().alias, "u1");
        assert_eq!(ctx.table("uploads").unwrap().alias, "u2");
        assert_eq!(ctx.table("orders").unwrap().alias, "o");
    }

    #[test]
    fn test_alias_stability() {
        let ctx = QueryContext::new();
        let first = ctx.table("users").unwrap();
        let second = ctx.table("users").unwrap();
        assert_eq!(first.alias, second.alias);
    }

    #[test]
    fn test_custom_alias_collision() {
        let ctx = QueryContext::new();
        ctx.table_as("users", "x").unwrap();
        // same pair is memoized, not an error
        assert_eq!(ctx.table_as("users", "x").unwrap().alias, "x");

        let err = ctx.table_as("orders", "x").unwrap_err();
        assert!(matches!(err.reason, Reason::AliasInUse { .. }));
        assert_eq!(err.code, Some("E0004"));
    }

    #[test]
    fn test_generated_avoids_custom() {
        let ctx = QueryContext::new();
        ctx.table_as("users", "o").unwrap();
        assert_eq!(ctx.table("orders").unwrap().alias, "o1");
    }
}
