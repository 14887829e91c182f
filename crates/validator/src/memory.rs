//! In-memory collection
//!
//! [`MemoryCollection`] keeps rows in a `Vec` behind a `parking_lot` lock
//! and assigns sequential integer identities on first save. It is the
//! collection used by the test suite and is handy for prototyping a model
//! before a real store is wired in.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::collection::{Collection, Query};
use crate::error::CollectionError;
use crate::record::{Attributes, ID_ATTRIBUTE, Model, Row};
use crate::value;

/// A collection of rows held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Row>,
    last_id: u64,
}

impl MemoryCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection ready to be shared between records.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Inserts or updates a row and returns its identity.
    ///
    /// A row without an `id` is assigned the next sequential integer and
    /// appended. A row whose `id` is already stored replaces the stored copy.
    /// Supplied integer ids advance the sequence, so assigned ids never
    /// collide with them.
    pub fn save(&self, row: &mut Row) -> Value {
        let mut inner = self.inner.write();

        let id = match row.id() {
            Some(id) => {
                if let Some(n) = id.as_u64() {
                    inner.last_id = inner.last_id.max(n);
                }
                id.clone()
            }
            None => {
                inner.last_id += 1;
                let id = Value::from(inner.last_id);
                row.set(ID_ATTRIBUTE, id.clone());
                id
            }
        };

        let position = inner
            .rows
            .iter()
            .position(|stored| value::strict_eq(stored.id(), Some(&id)));
        match position {
            Some(index) => inner.rows[index] = row.clone(),
            None => inner.rows.push(row.clone()),
        }

        tracing::trace!(id = %id, "saved row");
        id
    }

    /// Removes the row with the given identity. Returns `true` if it existed.
    pub fn delete(&self, id: &Value) -> bool {
        let mut inner = self.inner.write();
        let before = inner.rows.len();
        inner.rows.retain(|row| !value::strict_eq(row.id(), Some(id)));
        inner.rows.len() != before
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// Returns true if no row is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().rows.is_empty()
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn fetch_one(&self, query: &Query) -> Result<Option<Row>, CollectionError> {
        Ok(self
            .inner
            .read()
            .rows
            .iter()
            .find(|row| query.matches(*row))
            .cloned())
    }
}

// ============================================================================
// MEMORY RECORD
// ============================================================================

/// A record bound to a [`MemoryCollection`].
///
/// # Examples
///
/// ```rust,ignore
/// use model_validator::memory::{MemoryCollection, MemoryRecord};
///
/// let users = MemoryCollection::shared();
/// let mut user = MemoryRecord::new(&users).with("name", "name");
/// user.save();
/// assert_eq!(users.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    row: Row,
    collection: Arc<MemoryCollection>,
}

impl MemoryRecord {
    /// Creates an unsaved, empty record in `collection`.
    pub fn new(collection: &Arc<MemoryCollection>) -> Self {
        Self::from_row(collection, Row::new())
    }

    /// Creates an unsaved record in `collection` from existing attributes.
    pub fn from_row(collection: &Arc<MemoryCollection>, row: Row) -> Self {
        Self {
            row,
            collection: Arc::clone(collection),
        }
    }

    /// Sets an attribute, builder style.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.row = self.row.with(attribute, value);
        self
    }

    /// Persists the record, assigning an identity on first save.
    pub fn save(&mut self) -> Value {
        self.collection.save(&mut self.row)
    }

    /// Returns the underlying attributes.
    pub fn row(&self) -> &Row {
        &self.row
    }
}

impl Attributes for MemoryRecord {
    fn get(&self, attribute: &str) -> Option<&Value> {
        self.row.get(attribute)
    }

    fn set(&mut self, attribute: &str, value: Value) {
        self.row.set(attribute, value);
    }
}

impl Model for MemoryRecord {
    fn collection(&self) -> &dyn Collection {
        self.collection.as_ref()
    }
}
