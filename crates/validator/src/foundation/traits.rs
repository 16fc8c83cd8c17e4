//! The rule abstraction and its composition hooks.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::combinators::{SkipOnEmpty, SkipOnError, When, WithMessage};
use crate::engine::RuleContext;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::subject::schema::SubjectBinding;

/// A heap-allocated rule, as stored in rule sets and declarations.
pub type BoxedRule = Box<dyn Rule>;

/// Signature shared by direct callbacks and schema methods.
pub type CallbackFn = Arc<dyn Fn(Option<&Value>, &ValidationContext) -> RuleOutcome + Send + Sync>;

// ============================================================================
// RULE
// ============================================================================

/// A single validation rule over an optional JSON value.
///
/// `None` means the member does not exist in the data set, which is
/// distinct from `Some(Value::Null)`. Rules return a [`RuleOutcome`] for
/// data verdicts and reserve `Err` for configuration failures that make
/// the verdict meaningless.
///
/// The default hook implementations make a rule unconditional: never
/// skipped, active everywhere, nothing to bind after discovery. Wrapper
/// rules forward the hooks they do not own, so stacking wrappers never
/// masks an inner rule's behavior.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Stable rule name, used in logs.
    fn name(&self) -> &str;

    /// Judges `value`. Composite rules re-enter the engine through `ctx`.
    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError>;

    /// Clones the rule behind a fresh box.
    fn clone_rule(&self) -> BoxedRule;

    /// Emptiness probe consulted before evaluation; returning `Some`
    /// opts in to skip-on-empty.
    fn empty_check(&self) -> Option<&EmptyCheck> {
        None
    }

    /// Whether this rule abstains once an earlier rule in the same list
    /// has already failed.
    fn skips_on_error(&self) -> bool {
        false
    }

    /// Whether this rule applies to `value` at all; inactive rules are
    /// skipped without being evaluated.
    fn active(&self, _value: Option<&Value>, _context: &ValidationContext) -> bool {
        true
    }

    /// Called once after discovery instantiates the rule, with a binding
    /// to the declaring subject's schema.
    fn after_init(&mut self, _binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        Ok(())
    }
}

impl Clone for BoxedRule {
    fn clone(&self) -> Self {
        self.clone_rule()
    }
}

// ============================================================================
// RULE EXTENSIONS
// ============================================================================

/// Wrapper sugar available on every sized rule.
///
/// # Examples
///
/// ```
/// use veritas_validator::prelude::*;
///
/// let rule = min_length(3)
///     .skip_on_empty()
///     .with_message("Pick a longer name");
/// assert_eq!(rule.name(), "min_length");
/// ```
pub trait RuleExt: Rule + Sized + 'static {
    /// Skips this rule when the standard emptiness probe matches.
    fn skip_on_empty(self) -> SkipOnEmpty {
        SkipOnEmpty::new(self)
    }

    /// Skips this rule when `probe` reports the value as empty.
    fn skip_on_empty_with<F>(self, probe: F) -> SkipOnEmpty
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        SkipOnEmpty::with_check(self, EmptyCheck::new(probe))
    }

    /// Skips this rule once an earlier rule in the same list failed.
    fn skip_on_error(self) -> SkipOnError {
        SkipOnError::new(self)
    }

    /// Evaluates this rule only when `condition` holds.
    fn when<F>(self, condition: F) -> When
    where
        F: Fn(Option<&Value>, &ValidationContext) -> bool + Send + Sync + 'static,
    {
        When::new(self, condition)
    }

    /// Overrides the message of errors this rule produces.
    fn with_message(self, message: impl Into<Cow<'static, str>>) -> WithMessage {
        WithMessage::new(self, message)
    }

    /// Overrides the code of errors this rule produces.
    fn with_code(self, code: impl Into<Cow<'static, str>>) -> WithMessage {
        WithMessage::code_only(self, code)
    }
}

impl<R: Rule + Sized + 'static> RuleExt for R {}

// ============================================================================
// EMPTINESS
// ============================================================================

/// Pluggable emptiness probe backing skip-on-empty.
///
/// The standard probe treats a missing member, `null` and the empty
/// string as empty, which is what optional form input looks like.
/// Anything else, including `0`, `false` and empty collections, counts
/// as present.
#[derive(Clone)]
pub struct EmptyCheck {
    probe: Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>,
}

impl EmptyCheck {
    /// A probe with custom emptiness semantics.
    pub fn new<F>(probe: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// The standard probe: missing, `null` or `""`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(|value| match value {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        })
    }

    /// Whether `value` counts as empty under this probe.
    #[must_use]
    pub fn is_empty(&self, value: Option<&Value>) -> bool {
        (self.probe)(value)
    }
}

impl Default for EmptyCheck {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for EmptyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmptyCheck")
            .field("probe", &"<function>")
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
