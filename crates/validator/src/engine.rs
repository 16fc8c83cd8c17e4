//! Rule application: the per-list skip machinery and the re-entry
//! handle composite rules evaluate through.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::discovery::RuleSet;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::{ValidationError, ValidatorError};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::BoxedRule;
use crate::subject::extract::DataSet;
use crate::validator::Validator;

/// Evaluation handle passed to every rule.
///
/// Carries the owning validator for re-entry (nested and per-element
/// rules discover and apply sub-rules through it) plus the mutable
/// [`ValidationContext`] of the run. Errors returned by `apply` keep
/// paths relative to the value they were applied to; the caller decides
/// which segment to prepend.
pub struct RuleContext<'v> {
    validator: &'v Validator,
    context: ValidationContext,
}

impl<'v> RuleContext<'v> {
    pub(crate) fn new(validator: &'v Validator) -> Self {
        Self {
            validator,
            context: ValidationContext::new(),
        }
    }

    /// The validator this run belongs to.
    #[must_use]
    pub fn validator(&self) -> &'v Validator {
        self.validator
    }

    /// Shared run state.
    #[must_use]
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Mutable run state, for rules that publish parameters.
    pub fn context_mut(&mut self) -> &mut ValidationContext {
        &mut self.context
    }

    /// Runs `scope` one structural level deeper.
    ///
    /// Fails with [`ValidatorError::DepthExceeded`] once the validator's
    /// depth limit is reached, which is what bounds runaway recursion
    /// through self-referential rule graphs.
    pub fn descend<R>(
        &mut self,
        scope: impl FnOnce(&mut Self) -> Result<R, ValidatorError>,
    ) -> Result<R, ValidatorError> {
        let limit = self.validator.max_depth();
        if self.context.depth() >= limit {
            return Err(ValidatorError::DepthExceeded { limit });
        }
        self.context.raise_depth();
        let outcome = scope(self);
        self.context.lower_depth();
        outcome
    }

    /// Applies one rule list to one value, in declaration order.
    ///
    /// Each rule's skip hooks are consulted first: skip-on-error once an
    /// earlier rule in this list failed, then the emptiness probe, then
    /// the activity condition. Skipped rules are never evaluated.
    pub fn apply(
        &mut self,
        value: Option<&Value>,
        rules: &[BoxedRule],
    ) -> Result<Vec<ValidationError>, ValidatorError> {
        let mut errors = Vec::new();
        let mut failed = false;
        for rule in rules {
            if failed && rule.skips_on_error() {
                trace!(rule = rule.name(), "skipped after earlier failure");
                continue;
            }
            if let Some(check) = rule.empty_check() {
                if check.is_empty(value) {
                    trace!(rule = rule.name(), "skipped on empty value");
                    continue;
                }
            }
            if !rule.active(value, &self.context) {
                trace!(rule = rule.name(), "skipped by condition");
                continue;
            }
            match rule.evaluate(value, self)? {
                RuleOutcome::Valid => {}
                RuleOutcome::Invalid(found) => {
                    trace!(rule = rule.name(), errors = found.len(), "rule failed");
                    failed = true;
                    errors.extend(found);
                }
            }
        }
        Ok(errors)
    }

    /// Applies a whole rule set to a data set, one structural level
    /// deep.
    ///
    /// Subject-level rules see the data set as one object; member rules
    /// see their member's value, with returned errors re-rooted under
    /// the member name. The data snapshot becomes the run's current data
    /// for the duration, and its top-level data if none is pinned yet.
    pub fn apply_set(
        &mut self,
        data: &dyn DataSet,
        rules: &RuleSet,
    ) -> Result<Vec<ValidationError>, ValidatorError> {
        self.descend(|ctx| {
            let snapshot = data.data();
            ctx.context.ensure_top(&snapshot);
            let saved = ctx.context.swap_current(Some(Arc::clone(&snapshot)));
            let outcome = ctx.apply_set_rules(data, rules);
            ctx.context.swap_current(saved);
            outcome
        })
    }

    fn apply_set_rules(
        &mut self,
        data: &dyn DataSet,
        rules: &RuleSet,
    ) -> Result<Vec<ValidationError>, ValidatorError> {
        let mut errors = Vec::new();
        if !rules.subject_rules().is_empty() {
            let whole = data.to_value();
            errors.extend(self.apply(Some(&whole), rules.subject_rules())?);
        }
        for (name, list) in rules.iter_members() {
            let found = self.apply(data.value(name), list)?;
            errors.extend(
                found
                    .into_iter()
                    .map(|error| error.under_member(name.to_owned())),
            );
        }
        Ok(errors)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::traits::{EmptyCheck, Rule};
    use serde_json::json;
    use std::sync::Mutex;

    // cloning shares `calls`, so assertions work through the original
    #[derive(Debug, Clone, Default)]
    struct Probe {
        calls: Arc<Mutex<Vec<Option<Value>>>>,
        fail_with: Option<&'static str>,
        skip_on_error: bool,
        empty_check: Option<EmptyCheck>,
    }

    impl Rule for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn evaluate(
            &self,
            value: Option<&Value>,
            _ctx: &mut RuleContext<'_>,
        ) -> Result<RuleOutcome, ValidatorError> {
            self.calls.lock().unwrap().push(value.cloned());
            Ok(match self.fail_with {
                Some(code) => RuleOutcome::fail(code, "probe failure"),
                None => RuleOutcome::valid(),
            })
        }

        fn clone_rule(&self) -> BoxedRule {
            Box::new(self.clone())
        }

        fn empty_check(&self) -> Option<&EmptyCheck> {
            self.empty_check.as_ref()
        }

        fn skips_on_error(&self) -> bool {
            self.skip_on_error
        }
    }

    fn boxed(probe: &Probe) -> BoxedRule {
        Box::new(probe.clone())
    }

    #[test]
    fn rules_run_in_declaration_order() {
        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let first = Probe {
            fail_with: Some("first"),
            ..Probe::default()
        };
        let second = Probe::default();
        let errors = ctx
            .apply(Some(&json!(1)), &[boxed(&first), boxed(&second)])
            .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "first");
        assert_eq!(second.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn skip_on_error_abstains_after_a_failure() {
        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let first = Probe {
            fail_with: Some("first"),
            ..Probe::default()
        };
        let second = Probe {
            skip_on_error: true,
            ..Probe::default()
        };
        let errors = ctx
            .apply(Some(&json!(1)), &[boxed(&first), boxed(&second)])
            .unwrap();

        assert_eq!(errors.len(), 1);
        assert!(second.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn skip_on_error_still_runs_without_prior_failure() {
        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let rule = Probe {
            skip_on_error: true,
            ..Probe::default()
        };
        ctx.apply(Some(&json!(1)), &[boxed(&rule)]).unwrap();
        assert_eq!(rule.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_values_skip_probed_rules() {
        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let rule = Probe {
            empty_check: Some(EmptyCheck::standard()),
            fail_with: Some("never"),
            ..Probe::default()
        };
        let errors = ctx.apply(Some(&json!("")), &[boxed(&rule)]).unwrap();

        assert!(errors.is_empty());
        assert!(rule.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn descend_enforces_the_depth_limit() {
        let validator = Validator::builder().max_depth(2).build();
        let mut ctx = RuleContext::new(&validator);

        let result = ctx.descend(|ctx| {
            ctx.descend(|ctx| ctx.descend(|_ctx| Ok(())))
        });
        assert_eq!(result, Err(ValidatorError::DepthExceeded { limit: 2 }));

        // the guard unwinds depth on the way out
        assert_eq!(ctx.context().depth(), 0);
    }

    #[test]
    fn apply_set_prefixes_member_errors() {
        use crate::subject::extract::MapData;

        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let failing = Probe {
            fail_with: Some("bad"),
            ..Probe::default()
        };
        let rules = RuleSet::new().member_rules("title", vec![boxed(&failing)]);
        let data: MapData = [("title", json!("x"))].into_iter().collect();

        let errors = ctx.apply_set(&data, &rules).unwrap();
        assert_eq!(errors[0].path.to_string(), "title");
    }

    #[test]
    fn subject_rules_see_the_whole_object() {
        use crate::subject::extract::MapData;

        let validator = Validator::new();
        let mut ctx = RuleContext::new(&validator);

        let probe = Probe::default();
        let rules = RuleSet::new().rule(probe.clone());
        let data: MapData = [("a", json!(1))].into_iter().collect();

        ctx.apply_set(&data, &rules).unwrap();
        let seen = probe.calls.lock().unwrap();
        assert_eq!(*seen, [Some(json!({"a": 1}))]);
    }
}
