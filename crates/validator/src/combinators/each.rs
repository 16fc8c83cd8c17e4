//! Per-element application over arrays and objects.

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError, value_kind};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};
use crate::subject::schema::SubjectBinding;

/// Applies inner rules to every element of an array or object value.
///
/// Elements are visited in order (array order, or object insertion
/// order). While an element is under evaluation its key, the array
/// index or map key as a string, is published as the [`Each::KEY`]
/// context parameter; element errors come back re-rooted under
/// `[key]`. Any previous value of the parameter is restored afterwards,
/// so nested `Each` rules see their own key and the outer one sees its
/// own again.
///
/// A value that is neither an array nor an object fails with an
/// `invalid_structure` error rather than aborting the run.
#[derive(Debug, Clone)]
pub struct Each {
    rules: Vec<BoxedRule>,
}

impl Each {
    /// Context parameter naming the element under evaluation.
    pub const KEY: &'static str = "each.key";

    /// Applies one rule to every element.
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            rules: vec![Box::new(rule)],
        }
    }

    /// Applies a whole rule list to every element.
    #[must_use]
    pub fn all(rules: Vec<BoxedRule>) -> Self {
        Self { rules }
    }
}

impl Rule for Each {
    fn name(&self) -> &str {
        "each"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let entries: Vec<(String, &Value)> = match value {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, item)| (key.clone(), item))
                .collect(),
            other => {
                return Ok(RuleOutcome::invalid(ValidationError::invalid_structure(
                    "array or object",
                    value_kind(other),
                )));
            }
        };

        let saved = ctx.context().param(Self::KEY).cloned();
        let applied = ctx.descend(|ctx| {
            let mut errors = Vec::new();
            for (key, item) in entries {
                ctx.context_mut()
                    .set_param(Self::KEY, Value::String(key.clone()));
                let found = ctx.apply(Some(item), &self.rules)?;
                errors.extend(
                    found
                        .into_iter()
                        .map(|error| error.under_index(key.clone())),
                );
            }
            Ok(errors)
        });
        // restore before surfacing any error from the walk
        match saved {
            Some(previous) => {
                ctx.context_mut().set_param(Self::KEY, previous);
            }
            None => {
                ctx.context_mut().remove_param(Self::KEY);
            }
        }
        Ok(RuleOutcome::from_errors(applied?))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }

    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        for rule in &mut self.rules {
            rule.after_init(binding)?;
        }
        Ok(())
    }
}

/// Applies `rule` to every element of an array or object.
pub fn each(rule: impl Rule + 'static) -> Each {
    Each::new(rule)
}

// ============================================================================
// TESTS
// ============================================================================
