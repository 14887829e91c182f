//! Error types
//!
//! Three kinds of failure are kept apart:
//!
//! - [`RuleError::Invalid`]: the record broke a rule. Expected, carries the
//!   human-readable message.
//! - [`RuleError::Lookup`]: the collection behind `unique` failed for
//!   infrastructure reasons. Settled alongside validation failures by
//!   `validate()`, but distinguishable.
//! - [`ConfigError`]: a declarative rule map could not be built. Raised when
//!   the map is loaded, never merged into a message list.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use crate::rule::RuleKind;

/// Result of a single rule operation.
pub type RuleResult = Result<(), RuleError>;

// ============================================================================
// RULE ERROR
// ============================================================================

/// Failure of a single rule operation.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The attribute broke the rule.
    #[error("{message}")]
    Invalid {
        /// The resolved (default or custom) message
        message: String,
    },

    /// The uniqueness lookup could not be performed.
    #[error("unable to check {attribute}: {source}")]
    Lookup {
        /// The attribute being checked
        attribute: String,
        /// The collection failure
        #[source]
        source: CollectionError,
    },
}

impl RuleError {
    /// Creates a validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Returns the message reported for this failure.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Invalid { message } => Cow::Borrowed(message.as_str()),
            Self::Lookup { .. } => Cow::Owned(self.to_string()),
        }
    }

    /// Returns `true` for a genuine validation failure.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Returns `true` if the collection could not be queried.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

// ============================================================================
// COLLECTION ERROR
// ============================================================================

/// Failure reported by a [`Collection`](crate::collection::Collection).
///
/// "Not found" is not an error; lookups return `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The backing store cannot be reached.
    #[error("collection unavailable: {0}")]
    Unavailable(String),

    /// The query was rejected or failed while running.
    #[error("query failed: {message}")]
    Query {
        /// The error message
        message: String,
        /// The underlying driver error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CollectionError {
    /// Creates an [`Unavailable`](Self::Unavailable) error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Creates a [`Query`](Self::Query) error wrapping a driver error.
    pub fn query<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Query {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// A declarative rule map could not be built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The rule name is not one of the six known rules.
    #[error("unknown rule '{rule}' declared for '{attribute}'")]
    UnknownRule {
        /// The attribute the rule was declared on
        attribute: String,
        /// The offending rule name
        rule: String,
    },

    /// The test value has the wrong shape for the rule.
    #[error("rule '{rule}' on '{attribute}' expects {expected}, found {found}")]
    InvalidTestValue {
        /// The attribute the rule was declared on
        attribute: String,
        /// The rule
        rule: RuleKind,
        /// What the rule accepts
        expected: &'static str,
        /// The declared value, rendered as JSON
        found: String,
    },

    /// The `pattern` test value is not a valid regular expression.
    #[error("invalid pattern for '{attribute}': {source}")]
    InvalidPattern {
        /// The attribute the rule was declared on
        attribute: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// The rule map document could not be parsed.
    #[error("malformed rule map: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// One failed rule within an aggregate validation.
#[derive(Debug)]
pub struct RuleFailure {
    /// The attribute the rule was declared on.
    pub attribute: String,
    /// The rule that failed.
    pub rule: RuleKind,
    /// Why it failed.
    pub error: RuleError,
}

impl RuleFailure {
    /// Returns the message reported for this failure.
    pub fn message(&self) -> Cow<'_, str> {
        self.error.message()
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.attribute, self.rule, self.error)
    }
}

/// The failures collected by `validate()`, in declaration order.
///
/// Never empty when returned as an error.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    failures: Vec<RuleFailure>,
}

impl ValidationErrors {
    /// Creates a new empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    /// Adds a failure to the collection.
    pub fn add(&mut self, failure: RuleFailure) {
        self.failures.push(failure);
    }

    /// Returns the number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns all failures.
    #[must_use]
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    /// Iterates over the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleFailure> {
        self.failures.iter()
    }

    /// Returns the failure messages in declaration order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|failure| failure.message().into_owned())
            .collect()
    }

    /// Groups the messages by attribute, keeping declaration order.
    #[must_use]
    pub fn by_attribute(&self) -> IndexMap<&str, Vec<String>> {
        let mut grouped: IndexMap<&str, Vec<String>> = IndexMap::new();
        for failure in &self.failures {
            grouped
                .entry(failure.attribute.as_str())
                .or_default()
                .push(failure.message().into_owned());
        }
        grouped
    }

    /// Returns true if any failure came from the collection rather than
    /// from the record.
    #[must_use]
    pub fn has_lookup_failures(&self) -> bool {
        self.failures.iter().any(|failure| failure.error.is_lookup())
    }

    /// Converts to a Result.
    #[must_use = "result must be used"]
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl FromIterator<RuleFailure> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = RuleFailure>>(iter: I) -> Self {
        Self {
            failures: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = RuleFailure;
    type IntoIter = std::vec::IntoIter<RuleFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a RuleFailure;
    type IntoIter = std::slice::Iter<'a, RuleFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, failure.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(attribute: &str, rule: RuleKind, message: &str) -> RuleFailure {
        RuleFailure {
            attribute: attribute.to_string(),
            rule,
            error: RuleError::invalid(message),
        }
    }

    #[test]
    fn test_invalid_message() {
        let error = RuleError::invalid("name is required");
        assert_eq!(error.message(), "name is required");
        assert_eq!(error.to_string(), "name is required");
        assert!(error.is_invalid());
        assert!(!error.is_lookup());
    }

    #[test]
    fn test_lookup_message_preserves_source() {
        let error = RuleError::Lookup {
            attribute: "email".to_string(),
            source: CollectionError::unavailable("connection refused"),
        };
        assert!(error.is_lookup());
        assert_eq!(
            error.message(),
            "unable to check email: collection unavailable: connection refused"
        );
    }

    #[test]
    fn test_query_error_keeps_driver_source() {
        let driver = std::io::Error::new(std::io::ErrorKind::TimedOut, "statement timeout");
        let error = CollectionError::query("select failed", driver);
        assert_eq!(error.to_string(), "query failed: select failed");

        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("statement timeout"));
    }

    #[test]
    fn test_messages_keep_order() {
        let errors: ValidationErrors = vec![
            failure("location", RuleKind::Required, "location is required"),
            failure("name", RuleKind::Pattern, "'x' is not a valid name"),
            failure("name", RuleKind::MaxLength, "too long"),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.messages(),
            vec!["location is required", "'x' is not a valid name", "too long"]
        );
    }

    #[test]
    fn test_by_attribute() {
        let errors: ValidationErrors = vec![
            failure("name", RuleKind::Pattern, "a"),
            failure("location", RuleKind::Required, "b"),
            failure("name", RuleKind::MaxLength, "c"),
        ]
        .into_iter()
        .collect();

        let grouped = errors.by_attribute();
        let keys: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(keys, vec!["name", "location"]);
        assert_eq!(grouped["name"], vec!["a", "c"]);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add(failure("name", RuleKind::Required, "name is required"));
        assert!(!errors.has_lookup_failures());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_display() {
        let errors: ValidationErrors =
            std::iter::once(failure("name", RuleKind::Required, "name is required")).collect();
        assert_eq!(
            errors.to_string(),
            "Validation failed with 1 error(s):\n  1. name is required\n"
        );
    }
}
