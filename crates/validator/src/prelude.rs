//! Everything needed to declare schemas and run validations.
//!
//! ```
//! use veritas_validator::prelude::*;
//! ```

// ============================================================================
// ENTRY POINTS
// ============================================================================

pub use crate::validator::{Validator, ValidatorBuilder};

// ============================================================================
// DISCOVERY
// ============================================================================

pub use crate::discovery::{
    CacheItem, CacheValue, DiscoveryCache, DiscoveryKey, DiscoveryOptions, RuleSet,
};

// ============================================================================
// SUBJECTS AND SCHEMAS
// ============================================================================

pub use crate::subject::{
    DataSet, Extractor, MapData, Member, MemberBuilder, MemberSet, MethodTable, RuleDecl, Schema,
    SchemaBuilder, Subject, SubjectBinding, ValueGetter, Visibility, VisibilityMask, member,
};

// ============================================================================
// EVALUATION
// ============================================================================

pub use crate::engine::RuleContext;
pub use crate::foundation::{
    BoxedRule, CallbackFn, DataMap, EmptyCheck, ErrorPath, Params, PathSegment, Rule, RuleExt,
    RuleOutcome, ValidationContext, ValidationError, ValidationReport, ValidatorError, value_kind,
};

// ============================================================================
// RULES
// ============================================================================

pub use crate::combinators::{
    Callback, Condition, Each, Nested, SkipOnEmpty, SkipOnError, When, WithMessage, callback,
    each, nested, skip_on_empty, skip_on_error, when, with_code, with_message,
};
pub use crate::rules;
pub use crate::validators::{
    InRange, Max, MaxLength, Min, MinLength, OneOf, Pattern, Required, SameAs, in_range, max,
    max_length, min, min_length, one_of, pattern, required, same_as,
};

/// The JSON value type rules evaluate.
pub use serde_json::Value;
