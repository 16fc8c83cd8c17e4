//! Built-in leaf rules.
//!
//! Each rule checks one property of a single value and reports
//! failures under a stable code matching its [`Rule::name`]. The free
//! functions mirror the declaration style used in schemas:
//!
//! [`Rule::name`]: crate::foundation::Rule::name
//!
//! ```
//! use veritas_validator::prelude::*;
//!
//! let rules = rules![required(), min_length(3), max_length(64)];
//! assert_eq!(rules.len(), 3);
//! ```
//!
//! Fallible declarations ([`pattern`], [`in_range`]) return `Result`
//! so malformed arguments surface when the schema is built, not when
//! data arrives.

pub mod length;
pub mod numeric;
pub mod one_of;
pub mod pattern;
pub mod required;
pub mod same_as;

pub use length::{MaxLength, MinLength, max_length, min_length};
pub use numeric::{InRange, Max, Min, in_range, max, min};
pub use one_of::{OneOf, one_of};
pub use pattern::{Pattern, pattern};
pub use required::{Required, required};
pub use same_as::{SameAs, same_as};
