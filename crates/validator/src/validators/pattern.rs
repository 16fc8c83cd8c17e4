//! Regular expression validation.

use regex::Regex;
use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError, value_kind};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};

/// Requires strings to match a compiled regular expression.
///
/// The expression is compiled once at declaration time. Prototype
/// clones share the compiled program, so repeated discovery never
/// recompiles it.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern`, failing on malformed expressions.
    pub fn new(pattern: &str) -> Result<Self, ValidatorError> {
        let regex = Regex::new(pattern).map_err(|e| ValidatorError::InvalidDeclaration {
            rule: "pattern".to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// The source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Rule for Pattern {
    fn name(&self) -> &str {
        "pattern"
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
        Ok(RuleOutcome::check(self.regex.is_match(text), || {
            ValidationError::new("pattern", "Does not match the expected format")
                .with_param("pattern", self.regex.as_str())
        }))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }
}

/// Regular expression rule. Fails on malformed expressions.
pub fn pattern(pattern: &str) -> Result<Pattern, ValidatorError> {
    Pattern::new(pattern)
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
    fn matches_anywhere_unless_anchored() {
        let validator = Validator::new();
        let rule = pattern(r"\d{4}").unwrap();
        let report = validator
            .validate_value(Some(&json!("year 2024!")), &[Box::new(rule.clone())])
            .unwrap();
        assert!(report.is_valid());

        let anchored = pattern(r"^\d{4}$").unwrap();
        let report = validator
            .validate_value(Some(&json!("year 2024!")), &[Box::new(anchored)])
            .unwrap();
        assert_eq!(report.errors_at("")[0].code, "pattern");
    }

    #[test]
    fn failures_carry_the_source_expression() {
        let report = Validator::new()
            .validate_value(
                Some(&json!("nope")),
                &[Box::new(pattern(r"^[a-z]+-[a-z]+$").unwrap())],
            )
            .unwrap();
        let error = &report.errors_at("")[0];
        assert_eq!(error.message, "Does not match the expected format");
        assert_eq!(error.param("pattern"), Some(&json!("^[a-z]+-[a-z]+$")));
    }

    #[test]
    fn malformed_expressions_fail_at_declaration() {
        let err = pattern("[unclosed").unwrap_err();
        assert!(matches!(
            &err,
            ValidatorError::InvalidDeclaration { rule, .. } if rule == "pattern"
        ));
    }

    #[test]
    fn non_strings_are_a_type_mismatch() {
        let report = Validator::new()
            .validate_value(Some(&json!(2024)), &[Box::new(pattern(r"\d+").unwrap())])
            .unwrap();
        assert_eq!(report.errors_at("")[0].code, "type_mismatch");
    }
}
