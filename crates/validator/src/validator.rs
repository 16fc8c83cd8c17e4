//! The validator façade: entry points, options and defaults.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::discovery::{self, DiscoveryCache, DiscoveryOptions, RuleSet};
use crate::engine::RuleContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::path::ErrorPath;
use crate::foundation::report::ValidationReport;
use crate::foundation::traits::BoxedRule;
use crate::subject::extract::{DataSet, Extractor};
use crate::subject::member::{MemberSet, VisibilityMask};
use crate::subject::schema::Subject;

// ============================================================================
// VALIDATOR
// ============================================================================

/// Discovers and applies rules for [`Subject`] types.
///
/// Validators are cheap to clone and share their discovery cache, so
/// one validator (or clones of it) should serve many validation calls.
/// All entry points return `Err` only for configuration problems; data
/// failures land in the returned [`ValidationReport`].
///
/// # Examples
///
/// ```no_run
/// use veritas_validator::prelude::*;
///
/// # struct Draft;
/// # impl Subject for Draft {
/// #     fn schema() -> Result<Schema, ValidatorError> {
/// #         Ok(Schema::builder::<Self>().finish())
/// #     }
/// # }
/// # fn main() -> Result<(), ValidatorError> {
/// let validator = Validator::new();
/// let report = validator.validate(&Draft)?;
/// if !report.is_valid() {
///     println!("{report}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    cache: Arc<DiscoveryCache>,
    options: DiscoveryOptions,
    max_depth: usize,
}

impl Validator {
    /// Default structural depth limit.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// A validator with default options and a fresh enabled cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DiscoveryCache::new()),
            options: DiscoveryOptions::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Starts building a customized validator.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Validates `subject` against its discovered rules.
    pub fn validate<T: Subject>(&self, subject: &T) -> Result<ValidationReport, ValidatorError> {
        let discovered = discovery::discover(&self.cache, &self.options, Some(subject))?;
        let extractor = Extractor::new(subject, Arc::clone(&discovered.members))?;
        let mut ctx = RuleContext::new(self);
        let errors = ctx.apply_set(&extractor, &discovered.rules)?;
        let mut report = ValidationReport::new();
        report.absorb(&ErrorPath::root(), errors);
        debug!(
            subject = discovered.schema.subject_name(),
            errors = report.len(),
            "subject validated"
        );
        Ok(report)
    }

    /// Validates a raw data set against programmatically supplied
    /// rules.
    pub fn validate_data(
        &self,
        data: &dyn DataSet,
        rules: &RuleSet,
    ) -> Result<ValidationReport, ValidatorError> {
        let mut ctx = RuleContext::new(self);
        let errors = ctx.apply_set(data, rules)?;
        let mut report = ValidationReport::new();
        report.absorb(&ErrorPath::root(), errors);
        Ok(report)
    }

    /// Validates one value against an explicit rule list.
    pub fn validate_value(
        &self,
        value: Option<&Value>,
        rules: &[BoxedRule],
    ) -> Result<ValidationReport, ValidatorError> {
        let mut ctx = RuleContext::new(self);
        let errors = ctx.apply(value, rules)?;
        let mut report = ValidationReport::new();
        report.absorb(&ErrorPath::root(), errors);
        Ok(report)
    }

    /// Discovers the rule set for `subject`'s type, binding method
    /// callbacks through the live instance's schema.
    pub fn discover_rules<T: Subject>(&self, subject: &T) -> Result<Arc<RuleSet>, ValidatorError> {
        Ok(discovery::discover(&self.cache, &self.options, Some(subject))?.rules)
    }

    /// Discovers the rule set for `T` without an instance.
    pub fn rules_for<T: Subject>(&self) -> Result<Arc<RuleSet>, ValidatorError> {
        Ok(discovery::discover::<T>(&self.cache, &self.options, None)?.rules)
    }

    /// The members of `T` admitted by this validator's filter.
    pub fn members_of<T: Subject>(&self) -> Result<Arc<MemberSet>, ValidatorError> {
        Ok(discovery::members_of::<T>(&self.cache, &self.options)?.1)
    }

    /// Snapshot of `subject` taken through the discovered member set.
    pub fn extract<T: Subject>(&self, subject: &T) -> Result<Extractor, ValidatorError> {
        let members = self.members_of::<T>()?;
        Extractor::new(subject, members)
    }

    /// The shared discovery cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<DiscoveryCache> {
        &self.cache
    }

    /// The discovery options in effect.
    #[must_use]
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// The structural depth limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds a [`Validator`] with custom filtering, caching and limits.
#[derive(Debug)]
pub struct ValidatorBuilder {
    cache: Option<Arc<DiscoveryCache>>,
    options: DiscoveryOptions,
    max_depth: usize,
}

impl ValidatorBuilder {
    /// A builder seeded with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: None,
            options: DiscoveryOptions::default(),
            max_depth: Validator::DEFAULT_MAX_DEPTH,
        }
    }

    /// Admits only members of the given visibility levels.
    #[must_use = "builder methods must be chained or built"]
    pub fn visibility(mut self, mask: VisibilityMask) -> Self {
        self.options.visibility = mask;
        self
    }

    /// Includes or skips static members.
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_static(mut self, skip: bool) -> Self {
        self.options.skip_static = skip;
        self
    }

    /// Turns cache participation on or off for this validator.
    #[must_use = "builder methods must be chained or built"]
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.options.use_cache = use_cache;
        self
    }

    /// Shares an existing discovery cache.
    #[must_use = "builder methods must be chained or built"]
    pub fn cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Caps structural recursion depth.
    #[must_use = "builder methods must be chained or built"]
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Finishes the validator.
    #[must_use]
    pub fn build(self) -> Validator {
        Validator {
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(DiscoveryCache::new())),
            options: self.options,
            max_depth: self.max_depth,
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_cached_and_bounded() {
        let validator = Validator::new();
        assert!(validator.options().use_cache);
        assert!(validator.options().skip_static);
        assert_eq!(validator.options().visibility, VisibilityMask::ALL);
        assert_eq!(validator.max_depth(), Validator::DEFAULT_MAX_DEPTH);
        assert!(validator.cache().enabled());
    }

    #[test]
    fn builder_wires_every_knob() {
        let cache = Arc::new(DiscoveryCache::new());
        let validator = Validator::builder()
            .visibility(VisibilityMask::PUBLIC)
            .skip_static(false)
            .use_cache(false)
            .cache(Arc::clone(&cache))
            .max_depth(8)
            .build();

        assert_eq!(validator.options().visibility, VisibilityMask::PUBLIC);
        assert!(!validator.options().skip_static);
        assert!(!validator.options().use_cache);
        assert_eq!(validator.max_depth(), 8);
        assert!(Arc::ptr_eq(validator.cache(), &cache));
    }

    #[test]
    fn clones_share_the_cache() {
        let validator = Validator::new();
        let clone = validator.clone();
        assert!(Arc::ptr_eq(validator.cache(), clone.cache()));
    }
}
