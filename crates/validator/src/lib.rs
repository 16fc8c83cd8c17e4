//! Veritas Validator - Declarative, schema-driven validation with cached rule discovery
//!
//! Types describe their own validation by implementing [`Subject`]: a
//! schema lists the members to read, the rules guarding each of them,
//! and rules for the subject as a whole. A [`Validator`] discovers
//! those rules once per `(type, member filter)` pair, caches the
//! result, extracts the member values and evaluates every rule,
//! collecting failures into a [`ValidationReport`] keyed by path.
//!
//! # Quick start
//!
//! ```
//! use veritas_validator::prelude::*;
//!
//! struct SignUp {
//!     username: String,
//!     email: String,
//! }
//!
//! impl Subject for SignUp {
//!     fn schema() -> Result<Schema, ValidatorError> {
//!         Ok(Schema::builder::<Self>()
//!             .member(
//!                 member("username", |s: &Self| s.username.clone())
//!                     .rules(rules![required(), min_length(3)]),
//!             )
//!             .member(
//!                 member("email", |s: &Self| s.email.clone())
//!                     .rule(pattern(r"^[^@\s]+@[^@\s]+$")?),
//!             )
//!             .finish())
//!     }
//! }
//!
//! # fn main() -> Result<(), ValidatorError> {
//! let validator = Validator::new();
//! let report = validator.validate(&SignUp {
//!     username: "al".into(),
//!     email: "al@example.com".into(),
//! })?;
//!
//! assert!(!report.is_valid());
//! assert_eq!(
//!     report.messages_at("username"),
//!     ["Must be at least 3 characters"]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Rules compose: [`RuleExt`] adapters make any rule skip empty input,
//! sit out after an earlier failure, or run only under a condition,
//! while [`Each`](combinators::Each) and [`Nested`](combinators::Nested)
//! push whole rule lists through collections and child objects. Errors
//! carry the dotted-and-bracketed path of the offending value, however
//! deep it sits.

pub mod combinators; // Rules that wrap or fan out other rules
pub mod discovery; // Rule discovery and its cache
pub mod engine; // Rule evaluation
pub mod foundation; // Errors, outcomes, paths, core traits
mod macros;
pub mod prelude;
pub mod subject; // Schemas, members, extraction
pub mod validator; // The façade
pub mod validators; // Built-in leaf rules

// Re-export the types almost every caller touches
pub use foundation::{Rule, RuleOutcome, ValidationError, ValidationReport, ValidatorError};
pub use subject::{Schema, Subject};
pub use validator::Validator;
