//! Error message and code overrides.

use std::borrow::Cow;

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, EmptyCheck, Rule};
use crate::subject::schema::SubjectBinding;

/// Overrides the message and/or code of errors the wrapped rule emits.
///
/// Paths and parameters of the original errors are preserved, so a
/// friendlier message still carries the machine-readable limits.
#[derive(Debug, Clone)]
pub struct WithMessage {
    inner: BoxedRule,
    message: Option<Cow<'static, str>>,
    code: Option<Cow<'static, str>>,
}

impl WithMessage {
    /// Overrides the message of `rule`'s errors.
    pub fn new(rule: impl Rule + 'static, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Box::new(rule),
            message: Some(message.into()),
            code: None,
        }
    }

    /// Overrides only the code of `rule`'s errors.
    pub fn code_only(rule: impl Rule + 'static, code: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Box::new(rule),
            message: None,
            code: Some(code.into()),
        }
    }

    /// Additionally overrides the code.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Rule for WithMessage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        match self.inner.evaluate(value, ctx)? {
            RuleOutcome::Invalid(errors) => {
                let errors = errors
                    .into_iter()
                    .map(|mut error| {
                        if let Some(message) = &self.message {
                            error.message = message.clone();
                        }
                        if let Some(code) = &self.code {
                            error.code = code.clone();
                        }
                        error
                    })
                    .collect();
                Ok(RuleOutcome::Invalid(errors))
            }
            outcome => Ok(outcome),
        }
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }

    fn empty_check(&self) -> Option<&EmptyCheck> {
        self.inner.empty_check()
    }

    fn skips_on_error(&self) -> bool {
        self.inner.skips_on_error()
    }

    fn active(&self, value: Option<&Value>, context: &ValidationContext) -> bool {
        self.inner.active(value, context)
    }

    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        self.inner.after_init(binding)
    }
}

/// Overrides the failure message of `rule`.
pub fn with_message(rule: impl Rule + 'static, message: impl Into<Cow<'static, str>>) -> WithMessage {
    WithMessage::new(rule, message)
}

/// Overrides the failure code of `rule`.
pub fn with_code(rule: impl Rule + 'static, code: impl Into<Cow<'static, str>>) -> WithMessage {
    WithMessage::code_only(rule, code)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use crate::validators::min_length;
    use serde_json::json;

    #[test]
    fn message_and_code_override_but_params_survive() {
        let validator = Validator::new();
        let rule = with_message(min_length(5), "Too short for a slug").with_code("slug_length");

        let report = validator
            .validate_value(Some(&json!("ab")), &[Box::new(rule)])
            .unwrap();
        let error = &report.errors_at("")[0];

        assert_eq!(error.code, "slug_length");
        assert_eq!(error.message, "Too short for a slug");
        assert_eq!(error.param("min"), Some(&json!(5)));
        assert_eq!(error.param("actual"), Some(&json!(2)));
    }

    #[test]
    fn valid_outcomes_pass_through_untouched() {
        let validator = Validator::new();
        let rule = with_code(min_length(1), "renamed");
        let report = validator
            .validate_value(Some(&json!("ok")), &[Box::new(rule)])
            .unwrap();
        assert!(report.is_valid());
    }
}
