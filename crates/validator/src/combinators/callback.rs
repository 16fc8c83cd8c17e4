//! Custom callback rules, direct or bound to schema methods.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::RuleContext;
use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, CallbackFn, Rule};
use crate::subject::schema::SubjectBinding;

#[derive(Clone)]
enum Kind {
    Direct(CallbackFn),
    Method {
        name: Cow<'static, str>,
        bound: Option<CallbackFn>,
    },
}

/// Validates through a user-supplied callback.
///
/// A callback is either a direct closure or the name of a method the
/// declaring schema exposes. Method-backed callbacks start unbound and
/// are resolved during discovery's binding pass; evaluating one that
/// was never discovered through its subject is a configuration error,
/// not a validation failure.
#[derive(Clone)]
pub struct Callback {
    kind: Kind,
}

impl Callback {
    /// Callback backed by a closure.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Option<&Value>, &ValidationContext) -> RuleOutcome + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Direct(Arc::new(callback)),
        }
    }

    /// Callback backed by the named schema method, bound at discovery.
    pub fn method(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: Kind::Method {
                name: name.into(),
                bound: None,
            },
        }
    }

    /// Builds from optional parts, enforcing that exactly one is given.
    ///
    /// Declaration layers that collect both fields before constructing
    /// the rule go through here.
    pub fn from_parts(
        callback: Option<CallbackFn>,
        method: Option<Cow<'static, str>>,
    ) -> Result<Self, ValidatorError> {
        match (callback, method) {
            (Some(_), Some(_)) => Err(ValidatorError::CallbackOverconfigured),
            (None, None) => Err(ValidatorError::CallbackUnconfigured),
            (Some(callback), None) => Ok(Self {
                kind: Kind::Direct(callback),
            }),
            (None, Some(name)) => Ok(Self {
                kind: Kind::Method { name, bound: None },
            }),
        }
    }
}

impl Rule for Callback {
    fn name(&self) -> &str {
        "callback"
    }

    fn evaluate(
        &self,
        value: Option<&Value>,
        ctx: &mut RuleContext<'_>,
    ) -> Result<RuleOutcome, ValidatorError> {
        match &self.kind {
            Kind::Direct(callback) => Ok(callback(value, ctx.context())),
            Kind::Method {
                bound: Some(method),
                ..
            } => Ok(method(value, ctx.context())),
            Kind::Method { name, bound: None } => Err(ValidatorError::UnboundMethod {
                method: name.to_string(),
            }),
        }
    }

    fn clone_rule(&self) -> BoxedRule {
        Box::new(self.clone())
    }

    fn after_init(&mut self, binding: &SubjectBinding<'_>) -> Result<(), ValidatorError> {
        if let Kind::Method { name, bound } = &mut self.kind {
            let method = binding
                .method(name)
                .ok_or_else(|| ValidatorError::UnknownMethod {
                    subject: binding.subject_name().to_owned(),
                    method: name.to_string(),
                })?;
            *bound = Some(method);
        }
        Ok(())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Direct(_) => f
                .debug_struct("Callback")
                .field("callback", &"<function>")
                .finish(),
            Kind::Method { name, bound } => f
                .debug_struct("Callback")
                .field("method", name)
                .field("bound", &bound.is_some())
                .finish(),
        }
    }
}

/// Callback rule backed by a closure.
pub fn callback<F>(callback: F) -> Callback
where
    F: Fn(Option<&Value>, &ValidationContext) -> RuleOutcome + Send + Sync + 'static,
{
    Callback::new(callback)
}

// ============================================================================
// TESTS
// ============================================================================
