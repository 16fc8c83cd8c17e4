//! Cross-member equality validation.

use std::borrow::Cow;

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

/// Requires the value to equal another top-level member.
///
/// The comparison reads the pinned top-level snapshot, so the rule
/// works unchanged on members of nested objects. Two absent values
/// count as equal.
#[derive(Debug, Clone)]
pub struct SameAs {
    other: Cow<'static, str>,
}

impl SameAs {
    pub fn new(other: impl Into<Cow<'static, str>>) -> Self {
        Self {
            other: other.into(),
        }
    }
}

impl Rule for SameAs {
    fn name(&self) -> &str {
        "same_as"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let other = ctx.context().top_value(&self.other);
        Ok(RuleOutcome::check(value == other, || {
            ValidationError::new("same_as", format!("Must match `{}`", self.other))
                .with_param("other", self.other.to_string())
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }
}

/// Cross-member equality rule.
pub fn same_as(other: impl Into<Cow<'static, str>>) -> SameAs {
    SameAs::new(other)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::RuleSet;
    use crate::subject::MapData;
    use crate::validator::Validator;
    use serde_json::json;

    fn confirm_rules() -> RuleSet {
        RuleSet::new().member_rules("confirm", vec![Box::new(same_as("password"))])
    }

    #[test]
    fn equal_members_pass() {
        let data = MapData::from_iter([
            ("password", json!("hunter2")),
            ("confirm", json!("hunter2")),
        ]);
        let report = Validator::new().validate_data(&data, &confirm_rules()).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn mismatches_name_the_other_member() {
        let data = MapData::from_iter([
            ("password", json!("hunter2")),
            ("confirm", json!("hunter3")),
        ]);
        let report = Validator::new().validate_data(&data, &confirm_rules()).unwrap();
        let error = &report.errors_at("confirm")[0];
        assert_eq!(error.code, "same_as");
        assert_eq!(error.message, "Must match `password`");
        assert_eq!(error.param("other"), Some(&json!("password")));
    }

    #[test]
    fn two_absent_values_are_equal() {
        let data = MapData::from_iter([("confirm", Value::Null)]);
        let rules = RuleSet::new().member_rules("confirm", vec![Box::new(same_as("missing"))]);
        // `confirm` is null, `missing` is absent.
        let report = Validator::new().validate_data(&data, &rules).unwrap();
        assert!(!report.is_valid());

        let rules = RuleSet::new().member_rules("ghost", vec![Box::new(same_as("missing"))]);
        let report = Validator::new().validate_data(&data, &rules).unwrap();
        assert!(report.is_valid());
    }
}
