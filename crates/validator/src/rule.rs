//! Rules and rule maps
//!
//! The rule set is closed: [`RuleKind`] lists the six rules and nothing
//! else can be declared. A [`Rule`] is a kind together with its test value,
//! and a [`RuleSpec`] adds the optional custom message.
//!
//! A [`RuleMap`] is the declarative form consumed by `validate()`: for each
//! attribute, the rules to run, in declaration order. It can be built in
//! code or loaded from JSON:
//!
//! ```rust,ignore
//! use model_validator::rule::{Rule, RuleMap};
//!
//! let rules = RuleMap::new()
//!     .rule("location", Rule::Required)
//!     .rule("name", Rule::MaxLength(10).with_message("name must be less than 11 characters long"));
//!
//! let same = RuleMap::from_json(r#"{
//!     "location": { "required": true },
//!     "name": { "maxLength": { "testValue": 10, "message": "name must be less than 11 characters long" } }
//! }"#)?;
//! ```

use std::fmt;

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

// ============================================================================
// RULE KIND
// ============================================================================

/// The six rules a record attribute can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// The value must be truthy.
    Required,
    /// The value must strictly equal another attribute's value.
    Match,
    /// A truthy value must be at least N long.
    MinLength,
    /// A truthy value must be at most N long.
    MaxLength,
    /// A truthy value must match a regular expression.
    Pattern,
    /// No other persisted record may hold the same truthy value.
    Unique,
}

impl RuleKind {
    /// Every rule, in canonical order.
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Required,
        RuleKind::Match,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::Pattern,
        RuleKind::Unique,
    ];

    /// Returns the name used in declarative rule maps.
    pub const fn name(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Match => "match",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Pattern => "pattern",
            RuleKind::Unique => "unique",
        }
    }

    /// Looks a rule up by its declarative name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns the default message template.
    ///
    /// Placeholders are filled with the attribute name then the test value,
    /// except for `pattern`, which receives the offending value first.
    pub const fn default_template(self) -> &'static str {
        match self {
            RuleKind::Required => "#{attribute} is required",
            RuleKind::Match => "#{attribute} must match #{other}",
            RuleKind::MinLength => "#{attribute} must be at least #{min} characters long",
            RuleKind::MaxLength => "#{attribute} must be at most #{max} characters long",
            RuleKind::Pattern => "'#{value}' is not a valid #{attribute}",
            RuleKind::Unique => "#{attribute} must be unique",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// RULE
// ============================================================================

/// A rule together with its test value.
#[derive(Debug, Clone)]
pub enum Rule {
    /// See [`RuleKind::Required`].
    Required,
    /// See [`RuleKind::Match`]; holds the other attribute's name.
    Match(String),
    /// See [`RuleKind::MinLength`].
    MinLength(usize),
    /// See [`RuleKind::MaxLength`].
    MaxLength(usize),
    /// See [`RuleKind::Pattern`].
    Pattern(Regex),
    /// See [`RuleKind::Unique`].
    Unique,
}

impl Rule {
    /// Creates a `match` rule against `other`.
    pub fn matches(other: impl Into<String>) -> Self {
        Rule::Match(other.into())
    }

    /// Returns the kind of this rule.
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::Match(_) => RuleKind::Match,
            Rule::MinLength(_) => RuleKind::MinLength,
            Rule::MaxLength(_) => RuleKind::MaxLength,
            Rule::Pattern(_) => RuleKind::Pattern,
            Rule::Unique => RuleKind::Unique,
        }
    }

    /// Attaches a custom message, overriding the default template.
    pub fn with_message(self, message: impl Into<String>) -> RuleSpec {
        RuleSpec {
            rule: self,
            message: Some(message.into()),
        }
    }

    /// Builds a rule from its declarative test value.
    ///
    /// `required` and `unique` ignore the test value.
    pub fn from_declared(
        attribute: &str,
        kind: RuleKind,
        test_value: &Value,
    ) -> Result<Self, ConfigError> {
        let invalid = |expected: &'static str| ConfigError::InvalidTestValue {
            attribute: attribute.to_string(),
            rule: kind,
            expected,
            found: test_value.to_string(),
        };

        match kind {
            RuleKind::Required => Ok(Rule::Required),
            RuleKind::Unique => Ok(Rule::Unique),
            RuleKind::Match => test_value
                .as_str()
                .map(Rule::matches)
                .ok_or_else(|| invalid("an attribute name")),
            RuleKind::MinLength | RuleKind::MaxLength => {
                let bound = test_value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| invalid("a non-negative integer"))?;
                Ok(if kind == RuleKind::MinLength {
                    Rule::MinLength(bound)
                } else {
                    Rule::MaxLength(bound)
                })
            }
            RuleKind::Pattern => {
                let source = test_value
                    .as_str()
                    .ok_or_else(|| invalid("a regular expression string"))?;
                compile_pattern(source)
                    .map(Rule::Pattern)
                    .map_err(|source| ConfigError::InvalidPattern {
                        attribute: attribute.to_string(),
                        source,
                    })
            }
        }
    }
}

/// Compiles a pattern test value.
///
/// Accepts a bare regular expression or the literal form `/body/flags`,
/// where flags are drawn from `i` (case-insensitive), `m` (multi-line),
/// `s` (dot matches newline), `x` (ignore whitespace) and `u` (no-op).
/// A slash-delimited string with any other trailing letters is compiled
/// as-is.
pub fn compile_pattern(source: &str) -> Result<Regex, regex::Error> {
    match split_literal(source) {
        Some((body, flags)) => RegexBuilder::new(body)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build(),
        None => Regex::new(source),
    }
}

fn split_literal(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    flags
        .chars()
        .all(|flag| "imsxu".contains(flag))
        .then(|| (&rest[..end], flags))
}

/// A rule plus its optional custom message.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    /// The rule and its test value.
    pub rule: Rule,
    /// Replaces the default template when set. May itself use `#{…}`
    /// placeholders.
    pub message: Option<String>,
}

impl RuleSpec {
    /// Returns the kind of the wrapped rule.
    pub fn kind(&self) -> RuleKind {
        self.rule.kind()
    }

    /// Returns the custom message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        Self {
            rule,
            message: None,
        }
    }
}

// ============================================================================
// DECLARED ENTRIES
// ============================================================================

/// One rule entry as written in a declarative rule map.
///
/// Either a structured override (`{"testValue": …, "message": …}`) or any
/// other JSON value, which is taken as the bare test value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Declared {
    /// Test value with an optional custom message.
    Override(Override),
    /// Bare test value.
    Bare(Value),
}

/// The structured form of a [`Declared`] entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Override {
    /// The test value; `null` when omitted.
    #[serde(default)]
    pub test_value: Value,
    /// The custom message.
    #[serde(default)]
    pub message: Option<String>,
}

impl Declared {
    /// Splits the entry into its test value and custom message.
    pub fn into_parts(self) -> (Value, Option<String>) {
        match self {
            Declared::Override(Override {
                test_value,
                message,
            }) => (test_value, message),
            Declared::Bare(test_value) => (test_value, None),
        }
    }
}

/// A rule map as written, before rule names are resolved.
pub type DeclaredRuleMap = IndexMap<String, IndexMap<String, Declared>>;

// ============================================================================
// RULE MAP
// ============================================================================

/// Rules to run per attribute, in declaration order.
///
/// Each rule kind appears at most once per attribute; declaring it again
/// replaces the earlier entry in place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "DeclaredRuleMap")]
pub struct RuleMap {
    attributes: IndexMap<String, IndexMap<RuleKind, RuleSpec>>,
}

impl RuleMap {
    /// Creates an empty rule map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, builder style.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, attribute: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.insert(attribute, spec);
        self
    }

    /// Adds a rule.
    pub fn insert(&mut self, attribute: impl Into<String>, spec: impl Into<RuleSpec>) {
        let spec = spec.into();
        self.attributes
            .entry(attribute.into())
            .or_default()
            .insert(spec.kind(), spec);
    }

    /// Parses a rule map from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let declared: DeclaredRuleMap = serde_json::from_str(json)?;
        Self::try_from(declared)
    }

    /// Builds a rule map from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let declared: DeclaredRuleMap = serde_json::from_value(value)?;
        Self::try_from(declared)
    }

    /// Returns the total number of declared rules.
    pub fn len(&self) -> usize {
        self.attributes.values().map(IndexMap::len).sum()
    }

    /// Returns true if no rule is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over attribute names, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Iterates over the rules declared for one attribute.
    pub fn rules_for(&self, attribute: &str) -> impl Iterator<Item = &RuleSpec> {
        self.attributes
            .get(attribute)
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// Iterates over every `(attribute, rule)` pair: attributes in
    /// declaration order, then rules in declaration order within each.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.attributes.iter().flat_map(|(attribute, rules)| {
            rules.values().map(move |spec| (attribute.as_str(), spec))
        })
    }
}

impl TryFrom<DeclaredRuleMap> for RuleMap {
    type Error = ConfigError;

    fn try_from(declared: DeclaredRuleMap) -> Result<Self, Self::Error> {
        let mut map = RuleMap::new();
        for (attribute, rules) in declared {
            for (name, entry) in rules {
                let kind =
                    RuleKind::from_name(&name).ok_or_else(|| ConfigError::UnknownRule {
                        attribute: attribute.clone(),
                        rule: name.clone(),
                    })?;
                let (test_value, message) = entry.into_parts();
                let rule = Rule::from_declared(&attribute, kind, &test_value)?;
                map.insert(attribute.as_str(), RuleSpec { rule, message });
            }
        }
        Ok(map)
    }
}
