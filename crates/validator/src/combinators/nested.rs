//! Structural recursion into nested objects.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::discovery::RuleSet;
use crate::engine::RuleContext;
use crate::foundation::error::{ValidationError, ValidatorError, value_kind};
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, Rule};
use crate::subject::extract::MapData;
use crate::subject::schema::{Subject, SubjectBinding};
use crate::validator::Validator;

type DiscoverFn = Arc<dyn Fn(&Validator) -> Result<Arc<RuleSet>, ValidatorError> + Send + Sync>;

#[derive(Clone)]
enum Mode {
    Inline(IndexMap<String, Vec<BoxedRule>>),
    Typed {
        subject: &'static str,
        discover: DiscoverFn,
    },
}

/// Validates an object-shaped value, re-rooting sub-errors under it.
///
/// Inline mode carries an explicit member-to-rules mapping and is
/// self-contained. Typed mode names another [`Subject`] and resolves
/// its rule set through the owning validator at evaluation time, which
/// gives full recursion: the nested subject's own member rules, subject
/// rules and bound methods all apply, and its discovery is cached like
/// any other.
///
/// A value that is not an object fails with an `invalid_structure`
/// error rather than aborting the run.
#[derive(Clone)]
pub struct Nested {
    mode: Mode,
}

impl Nested {
    /// Inline mapping of member names to their rules.
    pub fn new<K, I>(mapping: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<BoxedRule>)>,
    {
        Self {
            mode: Mode::Inline(
                mapping
                    .into_iter()
                    .map(|(name, rules)| (name.into(), rules))
                    .collect(),
            ),
        }
    }

    /// Full recursion into subject type `U`.
    #[must_use]
    pub fn of<U: Subject>() -> Self {
        Self {
            mode: Mode::Typed {
                subject: type_name::<U>(),
                discover: Arc::new(|validator: &Validator| validator.rules_for::<U>()),
            },
        }
    }
}

impl Rule for Nested {
    fn name(&self) -> &str {
        "nested"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        let Some(Value::Object(entries)) = value else {
            return Ok(RuleOutcome::invalid(ValidationError::invalid_structure(
                "object",
                value_kind(value),
            )));
        };
        let errors = match &self.mode {
            Mode::Inline(mapping) => ctx.descend(|ctx| {
                let mut errors = Vec::new();
                for (name, rules) in mapping {
                    let found = ctx.apply(entries.get(name.as_str()), rules)?;
                    errors.extend(
                        found
                            .into_iter()
                            .map(|error| error.under_member(name.clone())),
                    );
                }
                Ok(errors)
            })?,
            Mode::Typed { discover, .. } => {
                let rules = discover(ctx.validator())?;
                let data = MapData::from(entries.clone());
                ctx.apply_set(&data, &rules)?
            }
        };
        Ok(RuleOutcome::from_errors(errors))
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }

    // typed mode binds through the nested subject's own discovery
    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        if let Mode::Inline(mapping) = &mut self.mode {
            for rules in mapping.values_mut() {
                for rule in rules {
                    rule.after_init(binding)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Nested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Mode::Inline(mapping) => f
                .debug_struct("Nested")
                .field("members", &mapping.keys().collect::<Vec<_>>())
                .finish(),
            Mode::Typed { subject, .. } => {
                f.debug_struct("Nested").field("subject", subject).finish()
            }
        }
    }
}

/// Inline nested validation of an object-shaped value.
pub fn nested<K, I>(mapping: I) -> Nested
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Vec<BoxedRule>)>,
{
    Nested::new(mapping)
}

// ============================================================================
// TESTS
// ============================================================================
