//! Rule discovery: from subject schemas to runnable rule sets.
//!
//! Discovery resolves a subject's schema, filters its members and
//! instantiates its declared rules, consulting the cache one artifact
//! at a time so partial results (a member set without rules, say) are
//! reused too. Freshly instantiated rules get one [`after_init`] pass
//! binding them to the declaring schema before the set is frozen behind
//! an `Arc` and shared.
//!
//! [`after_init`]: crate::foundation::Rule::after_init

pub mod cache;

pub use cache::{CacheItem, CacheSlots, CacheValue, DiscoveryCache, DiscoveryKey};

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::foundation::error::ValidatorError;
use crate::foundation::traits::{BoxedRule, Rule};
use crate::subject::member::{MemberSet, VisibilityMask};
use crate::subject::schema::{RuleDecl, Schema, Subject, SubjectBinding};

// ============================================================================
// OPTIONS
// ============================================================================

/// Filter and caching switches applied during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Visibility levels whose members participate.
    pub visibility: VisibilityMask,
    /// Whether static members are left out.
    pub skip_static: bool,
    /// Whether the discovery cache is consulted and filled.
    pub use_cache: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            visibility: VisibilityMask::ALL,
            skip_static: true,
            use_cache: true,
        }
    }
}

// ============================================================================
// RULE SET
// ============================================================================

/// Runnable rules of one discovery: subject-level rules plus per-member
/// rule lists keyed by member name, in discovery order.
///
/// Rule sets also build fluently for validating raw data without a
/// subject type; see [`Validator::validate_data`].
///
/// [`Validator::validate_data`]: crate::validator::Validator::validate_data
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    subject_rules: Vec<BoxedRule>,
    member_rules: IndexMap<String, Vec<BoxedRule>>,
}

impl RuleSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule evaluated against the whole data set.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.subject_rules.push(Box::new(rule));
        self
    }

    /// Adds rules for one member, e.g. from [`rules!`](crate::rules).
    #[must_use = "builder methods must be chained or built"]
    pub fn member_rules(mut self, name: impl Into<String>, rules: Vec<BoxedRule>) -> Self {
        self.member_rules.entry(name.into()).or_default().extend(rules);
        self
    }

    /// Subject-level rules, in declaration order.
    #[must_use]
    pub fn subject_rules(&self) -> &[BoxedRule] {
        &self.subject_rules
    }

    /// Rules of one member; empty when the member has none.
    #[must_use]
    pub fn rules_for(&self, name: &str) -> &[BoxedRule] {
        self.member_rules.get(name).map_or(&[], Vec::as_slice)
    }

    /// Names of members that carry rules, in discovery order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.member_rules.keys().map(String::as_str)
    }

    /// Iterates per-member rule lists in discovery order.
    pub fn iter_members(&self) -> impl Iterator<Item = (&str, &[BoxedRule])> {
        self.member_rules
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Total number of rules across the subject and all members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subject_rules.len() + self.member_rules.values().map(Vec::len).sum::<usize>()
    }

    /// Whether the set holds no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject_rules.is_empty() && self.member_rules.values().all(Vec::is_empty)
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Everything one discovery produced.
pub(crate) struct Discovered {
    pub schema: Arc<Schema>,
    pub members: Arc<MemberSet>,
    pub rules: Arc<RuleSet>,
}

/// Resolves `T`'s schema, through the cache when allowed.
pub(crate) fn schema_of<T: Subject>(
    cache: &DiscoveryCache,
    options: &DiscoveryOptions,
) -> Result<Arc<Schema>, ValidatorError> {
    let key = DiscoveryKey::of::<T>(options);
    if options.use_cache {
        if let Some(schema) = cache.schema(&key) {
            debug!(subject = schema.subject_name(), "schema cache hit");
            return Ok(schema);
        }
    }
    let schema = Arc::new(T::schema()?);
    if schema.subject_type() != TypeId::of::<T>() {
        return Err(ValidatorError::SubjectMismatch {
            expected: type_name::<T>().to_owned(),
            actual: schema.subject_name().to_owned(),
        });
    }
    debug!(
        subject = schema.subject_name(),
        members = schema.member_names().count(),
        "schema built"
    );
    if options.use_cache {
        cache.put(key, CacheValue::Schema(Arc::clone(&schema)));
    }
    Ok(schema)
}

/// Resolves `T`'s filtered member set, through the cache when allowed.
pub(crate) fn members_of<T: Subject>(
    cache: &DiscoveryCache,
    options: &DiscoveryOptions,
) -> Result<(Arc<Schema>, Arc<MemberSet>), ValidatorError> {
    let key = DiscoveryKey::of::<T>(options);
    let schema = schema_of::<T>(cache, options)?;
    if options.use_cache {
        if let Some(members) = cache.members(&key) {
            debug!(subject = schema.subject_name(), "member set cache hit");
            return Ok((schema, members));
        }
    }
    let members = Arc::new(schema.members_for(options.visibility, options.skip_static));
    debug!(
        subject = schema.subject_name(),
        members = members.len(),
        "member set built"
    );
    if options.use_cache {
        cache.put(key, CacheValue::Members(Arc::clone(&members)));
    }
    Ok((schema, members))
}

/// Resolves `T`'s full discovery: schema, members and instantiated,
/// bound rules.
///
/// A cached rule set is reused as-is; its binding pass already ran when
/// it was first built, and bindings are type-level, never per-instance.
pub(crate) fn discover<T: Subject>(
    cache: &DiscoveryCache,
    options: &DiscoveryOptions,
    instance: Option<&T>,
) -> Result<Discovered, ValidatorError> {
    let key = DiscoveryKey::of::<T>(options);
    let (schema, members) = members_of::<T>(cache, options)?;
    if options.use_cache {
        if let Some(rules) = cache.rules(&key) {
            debug!(subject = schema.subject_name(), "rule set cache hit");
            return Ok(Discovered {
                schema,
                members,
                rules,
            });
        }
    }
    let rules = Arc::new(instantiate(&schema, &members, instance)?);
    debug!(
        subject = schema.subject_name(),
        rules = rules.len(),
        "rule set built"
    );
    if options.use_cache {
        cache.put(key, CacheValue::Rules(Arc::clone(&rules)));
    }
    Ok(Discovered {
        schema,
        members,
        rules,
    })
}

/// Instantiates every declaration the filter admits, then runs the
/// binding pass over the fresh rules.
fn instantiate<T: Subject>(
    schema: &Schema,
    members: &MemberSet,
    instance: Option<&T>,
) -> Result<RuleSet, ValidatorError> {
    let mut subject_rules: Vec<BoxedRule> = schema
        .subject_decls()
        .iter()
        .map(RuleDecl::instantiate)
        .collect();

    let mut member_rules: IndexMap<String, Vec<BoxedRule>> = IndexMap::new();
    for name in members.names() {
        let decls = schema.member_decls(name);
        if decls.is_empty() {
            continue;
        }
        member_rules.insert(name.to_owned(), decls.iter().map(RuleDecl::instantiate).collect());
    }

    let binding = SubjectBinding::new(schema, instance.map(|instance| instance as &dyn Any));
    for rule in &mut subject_rules {
        rule.after_init(&binding)?;
    }
    for rules in member_rules.values_mut() {
        for rule in rules {
            rule.after_init(&binding)?;
        }
    }

    Ok(RuleSet {
        subject_rules,
        member_rules,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::ValidatorError;
    use crate::subject::schema::member;
    use crate::validators::{min_length, required};

    struct Draft {
        title: String,
        notes: String,
    }

    impl Subject for Draft {
        fn schema() -> Result<Schema, ValidatorError> {
            Ok(Schema::builder::<Self>()
                .member(
                    member("title", |draft: &Self| draft.title.clone())
                        .rule(required())
                        .rule(min_length(3)),
                )
                .member(member("notes", |draft: &Self| draft.notes.clone()).private())
                .finish())
        }
    }

    #[test]
    fn defaults_admit_everything_but_statics() {
        let options = DiscoveryOptions::default();
        assert_eq!(options.visibility, VisibilityMask::ALL);
        assert!(options.skip_static);
        assert!(options.use_cache);
    }

    #[test]
    fn instantiation_keeps_declaration_order_and_skips_ruleless_members() {
        let cache = DiscoveryCache::new();
        let discovered =
            discover::<Draft>(&cache, &DiscoveryOptions::default(), None).unwrap();

        assert_eq!(
            discovered.rules.member_names().collect::<Vec<_>>(),
            ["title"]
        );
        let title_rules: Vec<_> = discovered
            .rules
            .rules_for("title")
            .iter()
            .map(|rule| rule.name().to_owned())
            .collect();
        assert_eq!(title_rules, ["required", "min_length"]);
        assert_eq!(discovered.rules.len(), 2);
    }

    #[test]
    fn filtered_out_members_lose_their_rules() {
        let cache = DiscoveryCache::new();
        let options = DiscoveryOptions {
            visibility: VisibilityMask::PRIVATE,
            ..DiscoveryOptions::default()
        };
        let discovered = discover::<Draft>(&cache, &options, None).unwrap();
        assert!(discovered.rules.rules_for("title").is_empty());
        assert_eq!(discovered.members.names().collect::<Vec<_>>(), ["notes"]);
    }

    #[test]
    fn fluent_rule_sets_accumulate() {
        let set = RuleSet::new()
            .rule(required())
            .member_rules("email", vec![Box::new(min_length(3))])
            .member_rules("email", vec![Box::new(required())]);

        assert_eq!(set.subject_rules().len(), 1);
        assert_eq!(set.rules_for("email").len(), 2);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
        assert!(RuleSet::new().is_empty());
    }

    #[test]
    fn lying_schema_is_rejected() {
        struct Imposter;

        impl Subject for Imposter {
            fn schema() -> Result<Schema, ValidatorError> {
                Ok(Schema::builder::<Draft>().finish())
            }
        }

        let cache = DiscoveryCache::new();
        let err = schema_of::<Imposter>(&cache, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, ValidatorError::SubjectMismatch { .. }));
    }
}
