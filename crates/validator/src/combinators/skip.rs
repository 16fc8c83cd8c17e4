//! Skip controls: abstain on empty values or after earlier failures.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, EmptyCheck, Rule};
use crate::subject::schema::SubjectBinding;

// ============================================================================
// SKIP ON EMPTY
// ============================================================================

/// Skips the wrapped rule when its input is empty.
///
/// The engine consults [`Rule::empty_check`] before evaluating, so a
/// skipped rule never runs at all. Every other hook forwards to the
/// inner rule, keeping wrappers stackable in any order.
#[derive(Debug, Clone)]
pub struct SkipOnEmpty {
    inner: BoxedRule,
    check: EmptyCheck,
}

impl SkipOnEmpty {
    /// Wraps `rule` with the standard emptiness probe.
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            inner: Box::new(rule),
            check: EmptyCheck::standard(),
        }
    }

    /// Wraps `rule` with a custom probe.
    pub fn with_check(rule: impl Rule + 'static, check: EmptyCheck) -> Self {
        Self {
            inner: Box::new(rule),
            check,
        }
    }
}

impl Rule for SkipOnEmpty {
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
        Some(&self.check)
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

/// Skips `rule` when its input is empty.
pub fn skip_on_empty(rule: impl Rule + 'static) -> SkipOnEmpty {
    SkipOnEmpty::new(rule)
}

// ============================================================================
// SKIP ON ERROR
// ============================================================================

/// Skips the wrapped rule once an earlier rule in the same list failed.
///
/// Useful for expensive or dependent checks that are pointless once the
/// value is already known to be bad.
#[derive(Debug, Clone)]
pub struct SkipOnError {
    inner: BoxedRule,
}

impl SkipOnError {
    /// Wraps `rule`.
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            inner: Box::new(rule),
        }
    }
}

impl Rule for SkipOnError {
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
        true
    }

    fn active(&self, value: Option<&Value>, context: &ValidationContext) -> bool {
        self.inner.active(value, context)
    }

    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        self.inner.after_init(binding)
    }
}

/// Skips `rule` after an earlier failure in the same list.
pub fn skip_on_error(rule: impl Rule + 'static) -> SkipOnError {
    SkipOnError::new(rule)
}

// ============================================================================
// TESTS
// ============================================================================
