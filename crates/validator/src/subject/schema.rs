//! Subject schemas: declared members, rules and callback methods.
//!
//! A [`Schema`] is the frozen declaration of one subject type. Rule
//! declarations hold prototypes and hand out fresh clones, so a schema
//! can be discovered any number of times without sharing rule state
//! between discoveries. Schemas are built fluently and can inherit
//! another schema through a projection, which keeps inherited accessors
//! reading off child instances.

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::foundation::context::ValidationContext;
use crate::foundation::error::ValidatorError;
use crate::foundation::outcome::RuleOutcome;
use crate::foundation::traits::{BoxedRule, CallbackFn, Rule};
use crate::subject::member::{Member, MemberSet, ValueGetter, Visibility, VisibilityMask};

// ============================================================================
// SUBJECT
// ============================================================================

/// A type that declares how its instances are validated.
///
/// `schema()` is re-run on every uncached discovery, so declarations
/// execute fresh each time and construction failures surface as
/// [`ValidatorError::InvalidDeclaration`] instead of panicking.
///
/// # Examples
///
/// ```
/// use veritas_validator::prelude::*;
///
/// struct Comment {
///     body: String,
/// }
///
/// impl Subject for Comment {
///     fn schema() -> Result<Schema, ValidatorError> {
///         Ok(Schema::builder::<Self>()
///             .member(
///                 member("body", |comment: &Self| comment.body.clone())
///                     .rule(required())
///                     .rule(max_length(500)),
///             )
///             .finish())
///     }
/// }
/// ```
pub trait Subject: 'static {
    /// Declares the subject's members, rules and callback methods.
    fn schema() -> Result<Schema, ValidatorError>;
}

// ============================================================================
// RULE DECLARATIONS
// ============================================================================

/// A re-runnable rule constructor held by a schema.
///
/// Keeps a prototype and hands out clones, so every discovery gets its
/// own instances and post-discovery binding never leaks between rule
/// sets.
#[derive(Debug, Clone)]
pub struct RuleDecl {
    prototype: BoxedRule,
}

impl RuleDecl {
    /// Declares `rule` as the prototype.
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            prototype: Box::new(rule),
        }
    }

    /// Declares an already boxed prototype.
    #[must_use]
    pub fn from_boxed(rule: BoxedRule) -> Self {
        Self { prototype: rule }
    }

    /// Produces a fresh instance of the declared rule.
    #[must_use]
    pub fn instantiate(&self) -> BoxedRule {
        self.prototype.clone()
    }

    /// Name of the declared rule.
    #[must_use]
    pub fn name(&self) -> &str {
        self.prototype.name()
    }
}

// ============================================================================
// METHOD TABLE
// ============================================================================

/// Callback methods a schema exposes to method-backed rules.
#[derive(Clone, Default)]
pub struct MethodTable {
    entries: IndexMap<Cow<'static, str>, CallbackFn>,
}

impl MethodTable {
    pub(crate) fn insert(&mut self, name: Cow<'static, str>, method: CallbackFn) {
        self.entries.insert(name, method);
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CallbackFn> {
        self.entries.get(name).map(Arc::clone)
    }

    /// Whether a method with this name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Declared method names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|name| name.as_ref())
    }

    /// Number of declared methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no methods are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone)]
struct MemberDef {
    member: Member,
    rules: Vec<RuleDecl>,
}

/// Frozen declaration of a subject type: members with their rule
/// declarations, subject-level rules and callback methods.
#[derive(Debug, Clone)]
pub struct Schema {
    subject_type: TypeId,
    subject_name: &'static str,
    members: IndexMap<String, MemberDef>,
    subject_rules: Vec<RuleDecl>,
    methods: MethodTable,
}

impl Schema {
    /// Starts a schema for subject type `T`.
    #[must_use]
    pub fn builder<T: 'static>() -> SchemaBuilder<T> {
        SchemaBuilder::new()
    }

    /// `TypeId` of the declaring subject type.
    #[must_use]
    pub fn subject_type(&self) -> TypeId {
        self.subject_type
    }

    /// Name of the declaring subject type.
    #[must_use]
    pub fn subject_name(&self) -> &'static str {
        self.subject_name
    }

    /// Subject-level rule declarations, in declaration order.
    #[must_use]
    pub fn subject_decls(&self) -> &[RuleDecl] {
        &self.subject_rules
    }

    /// Rule declarations of one member; empty when the member is
    /// unknown or has no rules.
    #[must_use]
    pub fn member_decls(&self, name: &str) -> &[RuleDecl] {
        self.members
            .get(name)
            .map_or(&[], |def| def.rules.as_slice())
    }

    /// Declared member names, own first, inherited after.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Looks up a callback method.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<CallbackFn> {
        self.methods.get(name)
    }

    /// The declared callback methods.
    #[must_use]
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Members surviving `mask` and the static filter, in declaration
    /// order.
    #[must_use]
    pub fn members_for(&self, mask: VisibilityMask, skip_static: bool) -> MemberSet {
        let members = self
            .members
            .iter()
            .filter(|(_, def)| mask.admits(def.member.visibility()))
            .filter(|(_, def)| !(skip_static && def.member.is_static()))
            .map(|(name, def)| (name.clone(), def.member.clone()))
            .collect();
        MemberSet::new(self.subject_type, self.subject_name, members)
    }
}

// ============================================================================
// MEMBER BUILDER
// ============================================================================

/// Declares one member: accessor, visibility markers and rules.
///
/// Produced by [`member`] and consumed by [`SchemaBuilder::member`].
pub struct MemberBuilder<T> {
    name: Cow<'static, str>,
    visibility: Visibility,
    is_static: bool,
    read: ValueGetter,
    rules: Vec<RuleDecl>,
    _subject: PhantomData<fn(&T)>,
}

/// Declares a member of `T` read through `getter`.
///
/// The getter runs against live instances during extraction; whatever
/// it returns becomes the member's value in the data snapshot.
pub fn member<T, V, F>(name: impl Into<Cow<'static, str>>, getter: F) -> MemberBuilder<T>
where
    T: 'static,
    V: Into<Value>,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    let read: ValueGetter = Arc::new(move |subject: &dyn Any| {
        subject
            .downcast_ref::<T>()
            .map(|subject| getter(subject).into())
    });
    MemberBuilder {
        name: name.into(),
        visibility: Visibility::Public,
        is_static: false,
        read,
        rules: Vec::new(),
        _subject: PhantomData,
    }
}

impl<T: 'static> MemberBuilder<T> {
    /// Marks the member protected.
    #[must_use = "builder methods must be chained or built"]
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    /// Marks the member private.
    #[must_use = "builder methods must be chained or built"]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the member static (type-level rather than per-instance).
    #[must_use = "builder methods must be chained or built"]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attaches a rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(RuleDecl::new(rule));
        self
    }

    /// Attaches a prebuilt declaration.
    #[must_use = "builder methods must be chained or built"]
    pub fn decl(mut self, decl: RuleDecl) -> Self {
        self.rules.push(decl);
        self
    }

    /// Attaches several boxed rules at once, e.g. from [`rules!`].
    ///
    /// [`rules!`]: crate::rules
    #[must_use = "builder methods must be chained or built"]
    pub fn rules(mut self, rules: Vec<BoxedRule>) -> Self {
        self.rules.extend(rules.into_iter().map(RuleDecl::from_boxed));
        self
    }

    fn build(self) -> MemberDef {
        MemberDef {
            member: Member::new(self.name, self.visibility, self.is_static, self.read),
            rules: self.rules,
        }
    }
}

impl<T> fmt::Debug for MemberBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberBuilder")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("rules", &self.rules.len())
            .finish()
    }
}

// ============================================================================
// SCHEMA BUILDER
// ============================================================================

/// Fluent builder for [`Schema`].
///
/// Own declarations win over inherited ones with the same name, and the
/// first inherit wins over later ones. Inherited members keep their
/// relative order after all own members.
pub struct SchemaBuilder<T> {
    members: IndexMap<String, MemberDef>,
    inherited_members: IndexMap<String, MemberDef>,
    subject_rules: Vec<RuleDecl>,
    inherited_subject_rules: Vec<RuleDecl>,
    methods: MethodTable,
    inherited_methods: MethodTable,
    _subject: PhantomData<fn(&T)>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// An empty builder for subject type `T`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: IndexMap::new(),
            inherited_members: IndexMap::new(),
            subject_rules: Vec::new(),
            inherited_subject_rules: Vec::new(),
            methods: MethodTable::default(),
            inherited_methods: MethodTable::default(),
            _subject: PhantomData,
        }
    }

    /// Adds a member declaration; a member of the same name replaces the
    /// earlier one.
    #[must_use = "builder methods must be chained or built"]
    pub fn member(mut self, member: MemberBuilder<T>) -> Self {
        let def = member.build();
        self.members.insert(def.member.name().to_owned(), def);
        self
    }

    /// Adds a subject-level rule evaluated against the whole data set.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.subject_rules.push(RuleDecl::new(rule));
        self
    }

    /// Adds a prebuilt subject-level declaration.
    #[must_use = "builder methods must be chained or built"]
    pub fn decl(mut self, decl: RuleDecl) -> Self {
        self.subject_rules.push(decl);
        self
    }

    /// Declares a callback method that method-backed rules bind to
    /// during discovery.
    #[must_use = "builder methods must be chained or built"]
    pub fn method<F>(mut self, name: impl Into<Cow<'static, str>>, method: F) -> Self
    where
        F: Fn(Option<&Value>, &ValidationContext) -> RuleOutcome + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Inherits `parent`'s members, methods and subject rules.
    ///
    /// `project` locates the embedded parent value inside a `T`, so
    /// inherited accessors keep working against child instances. Own
    /// declarations shadow inherited ones of the same name; when several
    /// parents declare the same name, the first inherit wins.
    #[must_use = "builder methods must be chained or built"]
    pub fn inherits<P, F>(mut self, parent: Schema, project: F) -> Self
    where
        P: 'static,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for (name, def) in parent.members {
            if self.inherited_members.contains_key(&name) {
                continue;
            }
            let read = def.member.getter();
            let project = Arc::clone(&project);
            let wrapped: ValueGetter = Arc::new(move |subject: &dyn Any| {
                let subject = subject.downcast_ref::<T>()?;
                read(project(subject) as &dyn Any)
            });
            let member = def.member.with_getter(wrapped);
            self.inherited_members.insert(
                name,
                MemberDef {
                    member,
                    rules: def.rules,
                },
            );
        }
        for (name, method) in parent.methods.entries {
            self.inherited_methods.entries.entry(name).or_insert(method);
        }
        self.inherited_subject_rules.extend(parent.subject_rules);
        self
    }

    /// Freezes the declarations into a [`Schema`] for `T`.
    #[must_use]
    pub fn finish(self) -> Schema {
        let mut members = self.members;
        for (name, def) in self.inherited_members {
            if !members.contains_key(&name) {
                members.insert(name, def);
            }
        }
        let mut methods = self.methods;
        for (name, method) in self.inherited_methods.entries {
            methods.entries.entry(name).or_insert(method);
        }
        let mut subject_rules = self.subject_rules;
        subject_rules.extend(self.inherited_subject_rules);
        Schema {
            subject_type: TypeId::of::<T>(),
            subject_name: type_name::<T>(),
            members,
            subject_rules,
            methods,
        }
    }
}

impl<T: 'static> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SchemaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("inherited", &self.inherited_members.keys().collect::<Vec<_>>())
            .field("subject_rules", &self.subject_rules.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ============================================================================
// SUBJECT BINDING
// ============================================================================

/// Handle passed to [`Rule::after_init`] when discovery instantiates a
/// rule set.
///
/// Exposes the declaring schema's method table and, when discovery was
/// started from a live instance, the instance itself. Bindings are
/// type-level: a rule must not capture per-instance state through one,
/// because cached rule sets outlive the instance they were first
/// discovered through.
pub struct SubjectBinding<'a> {
    schema: &'a Schema,
    instance: Option<&'a dyn Any>,
}

impl<'a> SubjectBinding<'a> {
    pub(crate) fn new(schema: &'a Schema, instance: Option<&'a dyn Any>) -> Self {
        Self { schema, instance }
    }

    /// Name of the subject type being bound.
    #[must_use]
    pub fn subject_name(&self) -> &'static str {
        self.schema.subject_name()
    }

    /// Looks up a declared callback method.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<CallbackFn> {
        self.schema.method(name)
    }

    /// The instance discovery started from, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&'a dyn Any> {
        self.instance
    }
}

impl fmt::Debug for SubjectBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectBinding")
            .field("subject", &self.schema.subject_name())
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
