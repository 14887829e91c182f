//! The validator
//!
//! [`Validator`] borrows a record and, optionally, a [`RuleMap`]. Each of
//! the six rules is available as its own async operation; `validate()`
//! issues every declared rule at once and settles them all before
//! reporting.
//!
//! # Examples
//!
//! ```rust,ignore
//! use model_validator::prelude::*;
//!
//! let rules = RuleMap::from_json(r#"{
//!     "location": { "required": true },
//!     "name": { "pattern": "^name-", "maxLength": 10 }
//! }"#)?;
//!
//! let validator = Validator::with_rules(&record, rules);
//! if let Err(errors) = validator.validate().await {
//!     for message in errors.messages() {
//!         eprintln!("{message}");
//!     }
//! }
//! ```

use std::fmt;

use futures::future::join_all;
use regex::Regex;
use serde_json::Value;

use crate::collection::Query;
use crate::error::{RuleError, RuleFailure, RuleResult, ValidationErrors};
use crate::record::{Attributes, Model};
use crate::rule::{Rule, RuleKind, RuleMap, RuleSpec};
use crate::template;
use crate::value::{coerce_string, is_truthy, length, strict_eq};

/// Validates the attributes of one record.
pub struct Validator<'r, M: ?Sized> {
    record: &'r M,
    rules: RuleMap,
}

impl<M: ?Sized> fmt::Debug for Validator<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish_non_exhaustive()
    }
}

impl<'r, M: Attributes + ?Sized> Validator<'r, M> {
    /// Creates a validator with no declared rules.
    ///
    /// The individual rule operations are usable right away; `validate()`
    /// succeeds trivially until rules are supplied. Only `unique` and the
    /// aggregate operations need the record to be a [`Model`].
    pub fn new(record: &'r M) -> Self {
        Self::with_rules(record, RuleMap::new())
    }

    /// Creates a validator that runs `rules` on `validate()`.
    pub fn with_rules(record: &'r M, rules: RuleMap) -> Self {
        Self { record, rules }
    }

    /// Returns the record under validation.
    pub fn record(&self) -> &'r M {
        self.record
    }

    /// Returns the declared rules.
    pub fn rules(&self) -> &RuleMap {
        &self.rules
    }

    // ------------------------------------------------------------------------
    // Individual rules
    // ------------------------------------------------------------------------

    /// Fails with `"<attribute> is required"` when the value is falsy.
    pub async fn required(&self, attribute: &str, message: Option<&str>) -> RuleResult {
        if is_truthy(self.record.get(attribute)) {
            Ok(())
        } else {
            Err(reject(attribute, RuleKind::Required, message, &[&attribute]))
        }
    }

    /// Fails with `"<attribute> must match <other>"` unless both values are
    /// strictly equal. Two unset attributes are equal.
    pub async fn matches(&self, attribute: &str, other: &str, message: Option<&str>) -> RuleResult {
        if strict_eq(self.record.get(attribute), self.record.get(other)) {
            Ok(())
        } else {
            Err(reject(attribute, RuleKind::Match, message, &[&attribute, &other]))
        }
    }

    /// Fails with `"<attribute> must be at least <min> characters long"`.
    /// Falsy values pass.
    pub async fn min_length(&self, attribute: &str, min: usize, message: Option<&str>) -> RuleResult {
        let Some(value) = self.truthy_value(attribute) else {
            return Ok(());
        };
        match length(value) {
            Some(len) if len < min => Err(reject(
                attribute,
                RuleKind::MinLength,
                message,
                &[&attribute, &min],
            )),
            _ => Ok(()),
        }
    }

    /// Fails with `"<attribute> must be at most <max> characters long"`.
    /// Falsy values pass.
    pub async fn max_length(&self, attribute: &str, max: usize, message: Option<&str>) -> RuleResult {
        let Some(value) = self.truthy_value(attribute) else {
            return Ok(());
        };
        match length(value) {
            Some(len) if len > max => Err(reject(
                attribute,
                RuleKind::MaxLength,
                message,
                &[&attribute, &max],
            )),
            _ => Ok(()),
        }
    }

    /// Fails with `"'<value>' is not a valid <attribute>"` when the value
    /// does not match `pattern`. Falsy values pass without being tested.
    pub async fn pattern(&self, attribute: &str, pattern: &Regex, message: Option<&str>) -> RuleResult {
        let Some(value) = self.truthy_value(attribute) else {
            return Ok(());
        };
        let text = coerce_string(value);
        if pattern.is_match(&text) {
            Ok(())
        } else {
            Err(reject(attribute, RuleKind::Pattern, message, &[&text, &attribute]))
        }
    }

    fn truthy_value(&self, attribute: &str) -> Option<&'r Value> {
        self.record
            .get(attribute)
            .filter(|value| is_truthy(Some(*value)))
    }
}

impl<M: Model + ?Sized> Validator<'_, M> {
    /// Fails with `"<attribute> must be unique"` when another persisted
    /// record holds the same value.
    ///
    /// Falsy values pass without querying. A record without an identity
    /// fails against any matching row.
    pub async fn unique(&self, attribute: &str, message: Option<&str>) -> RuleResult {
        let Some(value) = self.truthy_value(attribute) else {
            return Ok(());
        };

        let id = self.record.id();
        let query = Query::new()
            .where_eq(attribute, value.clone())
            .excluding(id);
        tracing::trace!(attribute, ?query, "checking uniqueness");

        let found = self
            .record
            .collection()
            .fetch_one(&query)
            .await
            .map_err(|source| {
                tracing::warn!(attribute, error = %source, "uniqueness lookup failed");
                RuleError::Lookup {
                    attribute: attribute.to_string(),
                    source,
                }
            })?;

        match found {
            Some(row) if !strict_eq(row.id(), id) => {
                Err(reject(attribute, RuleKind::Unique, message, &[&attribute]))
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Declared rules
    // ------------------------------------------------------------------------

    /// Runs one declared rule against `attribute`.
    pub async fn check(&self, attribute: &str, spec: &RuleSpec) -> RuleResult {
        let message = spec.message();
        match &spec.rule {
            Rule::Required => self.required(attribute, message).await,
            Rule::Match(other) => self.matches(attribute, other, message).await,
            Rule::MinLength(min) => self.min_length(attribute, *min, message).await,
            Rule::MaxLength(max) => self.max_length(attribute, *max, message).await,
            Rule::Pattern(pattern) => self.pattern(attribute, pattern, message).await,
            Rule::Unique => self.unique(attribute, message).await,
        }
    }

    /// Runs every declared rule and collects the failures.
    ///
    /// All rules are issued before any is awaited, and every one is allowed
    /// to finish: a failure never cancels the others. Failures are reported
    /// in declaration order regardless of which rule finished first.
    pub async fn validate(&self) -> Result<(), ValidationErrors> {
        self.settle(self.rules.iter()).await
    }

    /// Like [`validate`](Self::validate), restricted to one attribute's rules.
    pub async fn validate_attribute(&self, attribute: &str) -> Result<(), ValidationErrors> {
        self.settle(self.rules.rules_for(attribute).map(|spec| (attribute, spec)))
            .await
    }

    async fn settle<'a, I>(&self, rules: I) -> Result<(), ValidationErrors>
    where
        I: Iterator<Item = (&'a str, &'a RuleSpec)>,
    {
        let checks: Vec<_> = rules
            .map(|(attribute, spec)| async move {
                let outcome = self.check(attribute, spec).await;
                (attribute, spec.kind(), outcome)
            })
            .collect();

        let issued = checks.len();
        tracing::debug!(rules = issued, "validating record");

        // join_all yields outcomes in input order, which is declaration order.
        let errors: ValidationErrors = join_all(checks)
            .await
            .into_iter()
            .filter_map(|(attribute, rule, outcome)| {
                outcome.err().map(|error| RuleFailure {
                    attribute: attribute.to_string(),
                    rule,
                    error,
                })
            })
            .collect();

        tracing::debug!(rules = issued, failed = errors.len(), "validation finished");
        errors.into_result()
    }
}

/// Builds the failure for `kind`, preferring the custom message template.
fn reject(
    attribute: &str,
    kind: RuleKind,
    custom: Option<&str>,
    args: &[&dyn fmt::Display],
) -> RuleError {
    let message = template::format(custom.unwrap_or(kind.default_template()), args);
    tracing::debug!(attribute, rule = %kind, %message, "rule failed");
    RuleError::invalid(message)
}
