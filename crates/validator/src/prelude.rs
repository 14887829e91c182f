//! Prelude module for convenient imports.
//!
//! Provides a single `use model_validator::prelude::*;` import that brings
//! in the validator, the rule types, the record traits and the error types.

pub use crate::collection::{Collection, Query};
pub use crate::error::{
    CollectionError, ConfigError, RuleError, RuleFailure, RuleResult, ValidationErrors,
};
pub use crate::memory::{MemoryCollection, MemoryRecord};
pub use crate::record::{Attributes, Model, Row};
pub use crate::rule::{Rule, RuleKind, RuleMap, RuleSpec};
pub use crate::validator::Validator;
