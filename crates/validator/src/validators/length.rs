//! String length validation.
//!
//! Lengths count Unicode scalar values, not bytes, so multibyte text
//! is measured the way users perceive it.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError, value_kind};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

/// Requires at least `min` characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Rule for MinLength {
    fn name(&self) -> &str {
        "min_length"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let Some(Value::String(text)) = value else {
            return Ok(RuleOutcome::invalid(ValidationError::type_mismatch(
                "string",
                value_kind(value),
            )));
        };
        let actual = text.chars().count();
        Ok(RuleOutcome::check(actual >= self.min, || {
            ValidationError::min_length(self.min, actual)
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Allows at most `max` characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    max: usize,
}

impl MaxLength {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Rule for MaxLength {
    fn name(&self) -> &str {
        "max_length"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let Some(Value::String(text)) = value else {
            return Ok(RuleOutcome::invalid(ValidationError::type_mismatch(
                "string",
                value_kind(value),
            )));
        };
        let actual = text.chars().count();
        Ok(RuleOutcome::check(actual <= self.max, || {
            ValidationError::max_length(self.max, actual)
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Minimum character count rule.
pub fn min_length(min: usize) -> MinLength {
    MinLength::new(min)
}

/// Maximum character count rule.
pub fn max_length(max: usize) -> MaxLength {
    MaxLength::new(max)
}

// ============================================================================
// TESTS
// ============================================================================
