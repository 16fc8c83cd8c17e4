//! Member metadata: visibility, staticness and type-erased access.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

// ============================================================================
// VISIBILITY
// ============================================================================

/// Declared visibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Part of the subject's public surface.
    #[default]
    Public,
    /// Reachable by the subject and types extending it.
    Protected,
    /// Internal to the subject.
    Private,
}

impl Visibility {
    /// The mask bit admitting exactly this level.
    #[must_use]
    pub const fn mask(self) -> VisibilityMask {
        match self {
            Self::Public => VisibilityMask::PUBLIC,
            Self::Protected => VisibilityMask::PROTECTED,
            Self::Private => VisibilityMask::PRIVATE,
        }
    }
}

/// Bit set of admitted visibility levels.
///
/// Masks are part of the discovery cache key: two filters admitting
/// different levels must never share cached member or rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityMask(u8);

impl VisibilityMask {
    /// Admits public members.
    pub const PUBLIC: Self = Self(1);
    /// Admits protected members.
    pub const PROTECTED: Self = Self(1 << 1);
    /// Admits private members.
    pub const PRIVATE: Self = Self(1 << 2);
    /// Admits every level.
    pub const ALL: Self = Self(0b111);

    /// Whether members of `visibility` pass this mask.
    #[must_use]
    pub const fn admits(self, visibility: Visibility) -> bool {
        self.0 & visibility.mask().0 != 0
    }

    /// Whether every level of `other` is admitted here.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for VisibilityMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for VisibilityMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for VisibilityMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// MEMBER
// ============================================================================

/// Type-erased accessor reading one member off a subject instance.
///
/// Returns `None` when the instance is not of the declaring type.
pub type ValueGetter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;

/// One data-carrying member of a subject.
#[derive(Clone)]
pub struct Member {
    name: Cow<'static, str>,
    visibility: Visibility,
    is_static: bool,
    read: ValueGetter,
}

impl Member {
    pub(crate) fn new(
        name: Cow<'static, str>,
        visibility: Visibility,
        is_static: bool,
        read: ValueGetter,
    ) -> Self {
        Self {
            name,
            visibility,
            is_static,
            read,
        }
    }

    /// Clone of this member reading through a different accessor; used
    /// when inheritance re-targets a parent member at child instances.
    pub(crate) fn with_getter(&self, read: ValueGetter) -> Self {
        Self {
            name: self.name.clone(),
            visibility: self.visibility,
            is_static: self.is_static,
            read,
        }
    }

    pub(crate) fn getter(&self) -> ValueGetter {
        Arc::clone(&self.read)
    }

    /// Declared member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the member is type-level rather than per-instance.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Reads the member's current value off `subject`; `None` when
    /// `subject` is not an instance of the declaring type.
    #[must_use]
    pub fn read(&self, subject: &dyn Any) -> Option<Value> {
        (self.read)(subject)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("read", &"<getter>")
            .finish()
    }
}

// ============================================================================
// MEMBER SET
// ============================================================================

/// Members of one subject type that survived a discovery filter.
///
/// Keeps declaration order: own members first, inherited ones after.
#[derive(Debug, Clone)]
pub struct MemberSet {
    subject_type: TypeId,
    subject_name: &'static str,
    members: IndexMap<String, Member>,
}

impl MemberSet {
    pub(crate) fn new(
        subject_type: TypeId,
        subject_name: &'static str,
        members: IndexMap<String, Member>,
    ) -> Self {
        Self {
            subject_type,
            subject_name,
            members,
        }
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

    /// Whether a member with this name survived the filter.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Iterates members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the filter admitted no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_mask_admits_everything() {
        let mask = VisibilityMask::default();
        assert!(mask.admits(Visibility::Public));
        assert!(mask.admits(Visibility::Protected));
        assert!(mask.admits(Visibility::Private));
    }

    #[test]
    fn masks_compose_with_bitor() {
        let mask = VisibilityMask::PUBLIC | VisibilityMask::PROTECTED;
        assert!(mask.admits(Visibility::Public));
        assert!(mask.admits(Visibility::Protected));
        assert!(!mask.admits(Visibility::Private));
        assert!(VisibilityMask::ALL.contains(mask));
        assert!(!mask.contains(VisibilityMask::ALL));
    }

    #[test]
    fn bitor_assign_accumulates_levels() {
        let mut mask = VisibilityMask::PUBLIC;
        mask |= VisibilityMask::PRIVATE;
        assert!(mask.admits(Visibility::Private));
        assert!(!mask.admits(Visibility::Protected));
    }

    struct Sample {
        count: u32,
    }

    fn count_member() -> Member {
        let read: ValueGetter = Arc::new(|subject: &dyn Any| {
            subject
                .downcast_ref::<Sample>()
                .map(|sample| Value::from(sample.count))
        });
        Member::new(Cow::Borrowed("count"), Visibility::Public, false, read)
    }

    #[test]
    fn member_reads_through_erased_getter() {
        let member = count_member();
        let sample = Sample { count: 7 };
        assert_eq!(member.read(&sample), Some(json!(7)));
    }

    #[test]
    fn member_rejects_foreign_instances() {
        let member = count_member();
        let not_a_sample = "something else".to_owned();
        assert_eq!(member.read(&not_a_sample), None);
    }

    #[test]
    fn member_set_keeps_insertion_order() {
        let members = IndexMap::from_iter([
            ("b".to_owned(), count_member()),
            ("a".to_owned(), count_member()),
        ]);
        let set = MemberSet::new(TypeId::of::<Sample>(), "Sample", members);
        assert_eq!(set.names().collect::<Vec<_>>(), ["b", "a"]);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
        assert_eq!(set.len(), 2);
    }
}
