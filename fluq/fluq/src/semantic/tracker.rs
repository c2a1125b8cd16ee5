use serde::{Deserialize, Serialize};

/// Where a logical field comes from: the table alias and column it resolves
/// to, plus (for fields registered through a join result selector) the
/// dotted source chain it was written as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Provenance {
    /// A whole-object registration (`name.*`), stored with column `"*"`.
    pub fn is_wildcard(&self) -> bool {
        self.column == "*"
    }

    /// Whether `path` contains `segment` as one of its dotted parts.
    pub fn path_contains(&self, segment: &str) -> bool {
        self.path
            .as_deref()
            .is_some_and(|path| path.split('.').any(|part| part == segment))
    }
}

/// The provenance map threaded through every stage of a plan: logical name
/// (or dotted path) to [Provenance]. Insertion order is preserved so that
/// spread expansion is deterministic; re-registering a name replaces the
/// earlier entry in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyTracker {
    entries: Vec<(String, Provenance)>,
}

impl PropertyTracker {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        path: Option<String>,
    ) {
        let name = name.into();
        let provenance = Provenance {
            table: table.into(),
            column: column.into(),
            path,
        };
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = provenance;
        } else {
            self.entries.push((name, provenance));
        }
    }

    /// Declares that a whole logical object corresponds to a table.
    pub fn register_wildcard(&mut self, name: impl Into<String>, table: impl Into<String>) {
        self.register(name, table, "*", None);
    }

    pub fn get(&self, name: &str) -> Option<&Provenance> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Provenance)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_register_replaces() {
        let mut tracker = PropertyTracker::default();
        tracker.register("name", "u", "name", None);
        tracker.register("name", "o", "title", None);
        assert_eq!(tracker.get("name").unwrap().table, "o");
        assert_eq!(tracker.iter().count(), 1);
    }

    #[test]
    fn test_wildcard() {
        let mut tracker = PropertyTracker::default();
        tracker.register_wildcard("order", "o");
        assert!(tracker.get("order").unwrap().is_wildcard());
    }

    #[test]
    fn test_path_contains() {
        let provenance = Provenance {
            table: "o".to_string(),
            column: "amount".to_string(),
            path: Some("o.amount".to_string()),
        };
        assert!(provenance.path_contains("o"));
        assert!(!provenance.path_contains("order"));
    }
}
