//! Record access
//!
//! The validator never depends on a concrete ORM type. It sees a record
//! through two narrow traits:
//!
//! - [`Attributes`]: get/set by attribute name, plus the identity accessor.
//! - [`Model`]: an [`Attributes`] implementation that can also hand out the
//!   [`Collection`] it is persisted in, for `unique` lookups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::Collection;

/// Name of the identity attribute.
pub const ID_ATTRIBUTE: &str = "id";

/// Key/value attribute access.
pub trait Attributes {
    /// Returns the current value of an attribute, or `None` if it is unset.
    fn get(&self, attribute: &str) -> Option<&Value>;

    /// Sets an attribute.
    fn set(&mut self, attribute: &str, value: Value);

    /// Returns the record identity, present once the record is persisted.
    fn id(&self) -> Option<&Value> {
        self.get(ID_ATTRIBUTE)
    }
}

/// A record that knows which collection it belongs to.
pub trait Model: Attributes {
    /// Returns the collection used for uniqueness lookups.
    fn collection(&self) -> &dyn Collection;
}

// ============================================================================
// ROW
// ============================================================================

/// An insertion-ordered bag of attributes.
///
/// Rows are what a [`Collection`] returns from a lookup, and double as a
/// plain record when no collection is involved.
///
/// # Examples
///
/// ```rust,ignore
/// use model_validator::record::{Attributes, Row};
/// use serde_json::json;
///
/// let row = Row::new().with("name", "Jonathan").with("age", 30);
/// assert_eq!(row.get("name"), Some(&json!("Jonathan")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    attributes: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, builder style.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    /// Removes an attribute, returning its previous value.
    pub fn unset(&mut self, attribute: &str) -> Option<Value> {
        self.attributes.shift_remove(attribute)
    }

    /// Returns the number of attributes set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over attributes in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.attributes.iter()
    }
}

impl Attributes for Row {
    fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    fn set(&mut self, attribute: &str, value: Value) {
        self.attributes.insert(attribute.to_string(), value);
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            attributes: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
