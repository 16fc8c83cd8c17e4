//! Core building blocks: paths, errors, outcomes, reports, run context
//! and the [`Rule`] trait everything else composes around.

pub mod context;
pub mod error;
pub mod outcome;
pub mod path;
pub mod report;
pub mod traits;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use context::{DataMap, ValidationContext};
pub use error::{Params, ValidationError, ValidatorError, value_kind};
pub use outcome::RuleOutcome;
pub use path::{ErrorPath, PathSegment};
pub use report::ValidationReport;
pub use traits::{BoxedRule, CallbackFn, EmptyCheck, Rule, RuleExt};
