//! Validation failures and configuration errors.
//!
//! Two failure channels exist. [`ValidationError`] describes data that
//! broke a rule and lands in a [`ValidationReport`]. [`ValidatorError`]
//! describes a broken setup (a malformed declaration, an unbound callback
//! method, exhausted recursion depth) and aborts the run instead: a
//! subject cannot be judged valid or invalid when its rules are wrong.
//!
//! [`ValidationReport`]: crate::foundation::ValidationReport

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::foundation::path::ErrorPath;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Inline storage for error parameters; most errors carry at most two.
pub type Params = SmallVec<[(Cow<'static, str>, Value); 2]>;

/// A single rule failure.
///
/// Carries a stable machine-readable `code`, a human-readable `message`,
/// the `path` of the offending value and named parameters describing the
/// failure (limits, actual values). The path stays relative to the value
/// the rule inspected until the error is absorbed into a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Stable error code, e.g. `"min_length"`.
    pub code: Cow<'static, str>,
    /// Human-readable message.
    pub message: Cow<'static, str>,
    /// Location of the offending value.
    pub path: ErrorPath,
    /// Named parameters describing the failure.
    pub params: Params,
}

impl ValidationError {
    /// Creates an error at the root path with no parameters.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: ErrorPath::root(),
            params: Params::new(),
        }
    }

    /// Attaches a named parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(name, _)| name.as_ref() == key)
            .map(|(_, value)| value)
    }

    /// Re-roots the error under a member segment.
    #[must_use]
    pub fn under_member(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.path = self.path.prefixed(&ErrorPath::member(name));
        self
    }

    /// Re-roots the error under an index segment.
    #[must_use]
    pub fn under_index(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.path = self.path.prefixed(&ErrorPath::index(key));
        self
    }

    /// Re-roots the error under an arbitrary base path.
    #[must_use]
    pub fn prefixed(mut self, base: &ErrorPath) -> Self {
        self.path = self.path.prefixed(base);
        self
    }
}

// ============================================================================
// CONVENIENCE CONSTRUCTORS
// ============================================================================

impl ValidationError {
    /// A required value is missing or empty.
    #[must_use]
    pub fn required() -> Self {
        Self::new("required", "Value is required")
    }

    /// A string fell short of a minimum length.
    #[must_use]
    pub fn min_length(min: usize, actual: usize) -> Self {
        Self::new("min_length", format!("Must be at least {min} characters"))
            .with_param("min", min)
            .with_param("actual", actual)
    }

    /// A string exceeded a maximum length.
    #[must_use]
    pub fn max_length(max: usize, actual: usize) -> Self {
        Self::new("max_length", format!("Must be at most {max} characters"))
            .with_param("max", max)
            .with_param("actual", actual)
    }

    /// A number fell outside an inclusive range.
    #[must_use]
    pub fn out_of_range(min: f64, max: f64, actual: f64) -> Self {
        Self::new("in_range", format!("Must be between {min} and {max}"))
            .with_param("min", min)
            .with_param("max", max)
            .with_param("actual", actual)
    }

    /// A value had the wrong JSON type for the rule.
    #[must_use]
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::new("type_mismatch", format!("Expected {expected}, got {actual}"))
            .with_param("expected", expected)
            .with_param("actual", actual)
    }

    /// A structural rule could not traverse the value's shape.
    #[must_use]
    pub fn invalid_structure(expected: &'static str, actual: &'static str) -> Self {
        Self::new(
            "invalid_structure",
            format!("Cannot traverse {actual} as {expected}"),
        )
        .with_param("expected", expected)
        .with_param("actual", actual)
    }

    /// A free-form failure with the `"custom"` code.
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("custom", message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.path, self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Names a JSON value's shape for error parameters and messages.
#[must_use]
pub fn value_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// A misconfigured validator, schema or rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// A callback rule was declared with neither a callable nor a method
    /// name.
    #[error("callback rule declared without a callable or a method name")]
    CallbackUnconfigured,

    /// A callback rule was declared with both a callable and a method
    /// name.
    #[error("callback rule accepts either a callable or a method name, not both")]
    CallbackOverconfigured,

    /// A method-backed callback ran before any schema bound it.
    #[error(
        "method callback `{method}` was never bound; discover rules through a validator so the declaring schema can bind it"
    )]
    UnboundMethod {
        /// The declared method name.
        method: String,
    },

    /// A rule names a callback method its schema does not declare.
    #[error("subject `{subject}` declares no method named `{method}`")]
    UnknownMethod {
        /// The declaring subject type.
        subject: String,
        /// The missing method name.
        method: String,
    },

    /// A member set or schema was paired with an instance of a different
    /// type.
    #[error("subject type mismatch: expected `{expected}`, got `{actual}`")]
    SubjectMismatch {
        /// The declared subject type.
        expected: String,
        /// The type actually supplied.
        actual: String,
    },

    /// A rule declaration carried malformed arguments.
    #[error("invalid declaration for rule `{rule}`: {reason}")]
    InvalidDeclaration {
        /// Name of the offending rule.
        rule: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Structural recursion went past the configured bound.
    #[error("validation depth exceeded the configured limit of {limit}")]
    DepthExceeded {
        /// The limit in effect.
        limit: usize,
    },
}

// ============================================================================
// TESTS
// ============================================================================
