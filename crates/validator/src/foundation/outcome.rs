//! Rule verdicts.

use std::borrow::Cow;

use crate::foundation::error::ValidationError;

/// What a rule concluded about a value.
///
/// `Invalid` carries errors with paths relative to the inspected value;
/// enclosing levels prepend their own segments when absorbing them.
/// Configuration problems never travel through an outcome, they abort
/// the run as a [`ValidatorError`](crate::foundation::ValidatorError).
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The value satisfied the rule.
    Valid,
    /// The value broke the rule in one or more ways.
    Invalid(Vec<ValidationError>),
}

impl RuleOutcome {
    /// A passing outcome.
    #[must_use]
    pub fn valid() -> Self {
        Self::Valid
    }

    /// A failing outcome carrying one error.
    #[must_use]
    pub fn invalid(error: ValidationError) -> Self {
        Self::Invalid(vec![error])
    }

    /// A failing outcome from a code and message, handy in callbacks.
    pub fn fail(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::invalid(ValidationError::new(code, message))
    }

    /// Collapses a list of errors: empty means valid.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    /// `Valid` when `passed` holds, otherwise the error built by
    /// `failure`.
    pub fn check(passed: bool, failure: impl FnOnce() -> ValidationError) -> Self {
        if passed {
            Self::Valid
        } else {
            Self::invalid(failure())
        }
    }

    /// Whether the rule passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Whether the rule failed.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The carried errors; empty for `Valid`.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Consumes the outcome into its errors; empty for `Valid`.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(errors) => errors,
        }
    }
}

impl From<ValidationError> for RuleOutcome {
    fn from(error: ValidationError) -> Self {
        Self::invalid(error)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_builds_error_lazily() {
        let outcome = RuleOutcome::check(true, || unreachable!("failure must not be built"));
        assert!(outcome.is_valid());

        let outcome = RuleOutcome::check(false, ValidationError::required);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.errors()[0].code, "required");
    }

    #[test]
    fn from_errors_collapses_empty_to_valid() {
        assert!(RuleOutcome::from_errors(Vec::new()).is_valid());
        assert!(RuleOutcome::from_errors(vec![ValidationError::required()]).is_invalid());
    }

    #[test]
    fn fail_carries_code_and_message() {
        let outcome = RuleOutcome::fail("odd", "Must be even");
        let errors = outcome.into_errors();
        assert_eq!(errors[0].code, "odd");
        assert_eq!(errors[0].message, "Must be even");
    }
}
