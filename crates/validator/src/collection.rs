//! Persistence lookups
//!
//! The `unique` rule is the only part of the validator that talks to the
//! persistence layer, and it needs exactly one operation from it: fetch the
//! first row matching a set of equality conditions. [`Collection`] is that
//! operation and nothing more; storage, migrations and writes stay with the
//! application.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollectionError;
use crate::record::{Attributes, Row};
use crate::value;

/// Read-only query service over a persisted collection of records.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Fetches the first row matching `query`, or `None` if there is none.
    async fn fetch_one(&self, query: &Query) -> Result<Option<Row>, CollectionError>;
}

/// Equality query against a collection.
///
/// Equivalent to `WHERE a = ? AND b = ? AND id <> ?`, where the identity
/// exclusion is optional.
///
/// # Examples
///
/// ```rust,ignore
/// use model_validator::collection::Query;
///
/// let query = Query::new().where_eq("email", "a@example.com").excluding(Some(&1.into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<(String, Value)>,
    exclude_id: Option<Value>,
}

impl Query {
    /// Creates a query matching every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition.
    #[must_use = "builder methods must be chained or built"]
    pub fn where_eq(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((attribute.into(), value.into()));
        self
    }

    /// Excludes the row with the given identity, if any.
    #[must_use = "builder methods must be chained or built"]
    pub fn excluding(mut self, id: Option<&Value>) -> Self {
        self.exclude_id = id.cloned();
        self
    }

    /// Returns the equality conditions, in the order they were added.
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Returns the excluded identity.
    pub fn excluded_id(&self) -> Option<&Value> {
        self.exclude_id.as_ref()
    }

    /// Returns `true` if `row` satisfies every condition and is not the
    /// excluded row.
    ///
    /// Values are compared with [`value::strict_eq`], so backends that
    /// evaluate queries in memory agree with the rules on equality.
    pub fn matches(&self, row: &impl Attributes) -> bool {
        let excluded = self
            .exclude_id
            .as_ref()
            .is_some_and(|id| value::strict_eq(row.id(), Some(id)));

        !excluded
            && self
                .conditions
                .iter()
                .all(|(attribute, expected)| value::strict_eq(row.get(attribute), Some(expected)))
    }
}
