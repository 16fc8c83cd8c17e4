//! Numeric range validation.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError, value_kind};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

fn number_of(value: Option<&Value>) -> Result<f64, ValidationError> {
    value
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidationError::type_mismatch("number", value_kind(value)))
}

/// Requires a number of at least `min`.
#[derive(Debug, Clone, Copy)]
pub struct Min {
    min: f64,
}

impl Min {
    pub fn new(min: f64) -> Self {
        Self { min }
    }
}

impl Rule for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let actual = match number_of(value) {
            Ok(actual) => actual,
            Err(error) => return Ok(RuleOutcome::invalid(error)),
        };
        Ok(RuleOutcome::check(actual >= self.min, || {
            ValidationError::new("min", format!("Must be at least {}", self.min))
                .with_param("min", self.min)
                .with_param("actual", actual)
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Requires a number of at most `max`.
#[derive(Debug, Clone, Copy)]
pub struct Max {
    max: f64,
}

impl Max {
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl Rule for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let actual = match number_of(value) {
            Ok(actual) => actual,
            Err(error) => return Ok(RuleOutcome::invalid(error)),
        };
        Ok(RuleOutcome::check(actual <= self.max, || {
            ValidationError::new("max", format!("Must be at most {}", self.max))
                .with_param("max", self.max)
                .with_param("actual", actual)
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Requires a number within `[min, max]`, both ends inclusive.
#[derive(Debug, Clone, Copy)]
pub struct InRange {
    min: f64,
    max: f64,
}

impl InRange {
    /// Fails when the bounds are inverted.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidatorError> {
        if min > max {
            return Err(ValidatorError::InvalidDeclaration {
                rule: "in_range".to_owned(),
                reason: format!("min {min} must not exceed max {max}"),
            });
        }
        Ok(Self { min, max })
    }
}

impl Rule for InRange {
    fn name(&self) -> &str {
        "in_range"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let actual = match number_of(value) {
            Ok(actual) => actual,
            Err(error) => return Ok(RuleOutcome::invalid(error)),
        };
        Ok(RuleOutcome::check(
            actual >= self.min && actual <= self.max,
            || ValidationError::out_of_range(self.min, self.max, actual),
        ))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Lower bound rule.
pub fn min(min: f64) -> Min {
    Min::new(min)
}

/// Upper bound rule.
pub fn max(max: f64) -> Max {
    Max::new(max)
}

/// Inclusive range rule. Fails when the bounds are inverted.
pub fn in_range(min: f64, max: f64) -> Result<InRange, ValidatorError> {
    InRange::new(min, max)
}

// ============================================================================
// TESTS
// ============================================================================
