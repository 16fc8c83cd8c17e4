//! Presence validation.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

/// Fails on missing values, nulls, and empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let missing = match value {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        };
        Ok(RuleOutcome::check(!missing, ValidationError::required))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(*self)
    }
}

/// Presence rule.
pub fn required() -> Required {
    Required
}

// ============================================================================
// TESTS
// ============================================================================
