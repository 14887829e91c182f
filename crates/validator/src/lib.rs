//! # model-validator
//!
//! Rule-based attribute validation for database-backed model records.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use model_validator::prelude::*;
//!
//! let users = MemoryCollection::shared();
//! let user = MemoryRecord::new(&users).with("name", "Jonathan Clem");
//!
//! let rules = RuleMap::new()
//!     .rule("location", Rule::Required)
//!     .rule("name", Rule::MaxLength(10))
//!     .rule("name", Rule::Unique);
//!
//! let errors = Validator::with_rules(&user, rules).validate().await.unwrap_err();
//! assert_eq!(errors.messages(), [
//!     "location is required",
//!     "name must be at most 10 characters long",
//! ]);
//! ```
//!
//! ## Rules
//!
//! The rule set is fixed: `required`, `match`, `minLength`, `maxLength`,
//! `pattern` and `unique`. Every rule except `required` and `match` lets a
//! falsy value through, so presence is only ever enforced by `required`.
//!
//! ## Records
//!
//! A record is anything implementing [`Attributes`](record::Attributes);
//! `unique` additionally needs [`Model`](record::Model) to reach the
//! [`Collection`](collection::Collection) the record is persisted in.

pub mod collection;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod record;
pub mod rule;
pub mod template;
pub mod validator;
pub mod value;

pub use error::{CollectionError, ConfigError, RuleError, RuleFailure, ValidationErrors};
pub use rule::{Rule, RuleKind, RuleMap, RuleSpec};
pub use validator::Validator;
