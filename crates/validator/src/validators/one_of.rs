//! Enumerated value validation.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

/// Requires the value to equal one of the allowed candidates.
///
/// Comparison is plain JSON equality, so candidates may be of mixed
/// types. A missing value is compared as `null`.
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<Value>,
}

impl OneOf {
    pub fn new<I, V>(allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for OneOf {
    fn name(&self) -> &str {
        "one_of"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let candidate = value.unwrap_or(&Value::Null);
        Ok(RuleOutcome::check(self.allowed.contains(candidate), || {
            ValidationError::new("one_of", "Must be one of the allowed values")
                .with_param("allowed", self.allowed.clone())
                .with_param("actual", candidate.clone())
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }
}

/// Enumeration rule.
pub fn one_of<I, V>(allowed: I) -> OneOf
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    OneOf::new(allowed)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use serde_json::json;

    #[test]
    fn accepts_listed_values_only() {
        let validator = Validator::new();
        let rule = one_of(["draft", "published", "archived"]);

        let report = validator
            .validate_value(Some(&json!("draft")), &[Box::new(rule.clone())])
            .unwrap();
        assert!(report.is_valid());

        let report = validator
            .validate_value(Some(&json!("deleted")), &[Box::new(rule)])
            .unwrap();
        let error = &report.errors_at("")[0];
        assert_eq!(error.code, "one_of");
        assert_eq!(
            error.param("allowed"),
            Some(&json!(["draft", "published", "archived"]))
        );
        assert_eq!(error.param("actual"), Some(&json!("deleted")));
    }

    #[test]
    fn missing_values_compare_as_null() {
        let validator = Validator::new();
        let rule = one_of([Value::Null, json!("n/a")]);
        let report = validator
            .validate_value(None, &[Box::new(rule)])
            .unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn candidates_may_mix_types() {
        let validator = Validator::new();
        let rule = one_of([json!(1), json!("one")]);
        let report = validator
            .validate_value(Some(&json!(1)), &[Box::new(rule)])
            .unwrap();
        assert!(report.is_valid());
    }
}
