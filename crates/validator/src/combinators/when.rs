//! Conditional application.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, EmptyCheck, Rule};
use crate::subject::schema::SubjectBinding;

/// Predicate deciding whether a conditional rule applies.
pub type Condition = Arc<dyn Fn(Option<&Value>, &ValidationContext) -> bool + Send + Sync>;

/// Applies the wrapped rule only while a condition holds.
///
/// The condition sees the candidate value and the run context, so it
/// can depend on sibling members through the top-level snapshot. A
/// false condition skips the rule entirely; it neither passes nor
/// fails.
#[derive(Clone)]
pub struct When {
    inner: BoxedRule,
    condition: Condition,
}

impl When {
    /// Wraps `rule` behind `condition`.
    pub fn new<F>(rule: impl Rule + 'static, condition: F) -> Self
    where
        F: Fn(Option<&Value>, &ValidationContext) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(rule),
            condition: Arc::new(condition),
        }
    }
}

impl Rule for When {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        self.inner.evaluate(value, ctx)
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
        (self.condition)(value, context) && self.inner.active(value, context)
    }

    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        self.inner.after_init(binding)
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("inner", &self.inner)
            .field("condition", &"<function>")
            .finish()
    }
}

/// Applies `rule` only while `condition` holds.
pub fn when<F>(condition: F, rule: impl Rule + 'static) -> When
where
    F: Fn(Option<&Value>, &ValidationContext) -> bool + Send + Sync + 'static,
{
    When::new(rule, condition)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::required;

    #[test]
    fn condition_gates_activity() {
        let gated = when(|value: Option<&Value>, _ctx: &ValidationContext| value.is_some(), required());
        let ctx = ValidationContext::new();
        assert!(!gated.active(None, &ctx));
        assert!(gated.active(Some(&Value::Bool(true)), &ctx));
    }

    #[test]
    fn inner_activity_still_counts() {
        let inert = when(
            |_value: Option<&Value>, _ctx: &ValidationContext| true,
            when(|_value: Option<&Value>, _ctx: &ValidationContext| false, required()),
        );
        assert!(!inert.active(None, &ValidationContext::new()));
    }
}
