//! Error paths locating a failure inside nested data.
//!
//! A path is a sequence of segments. Member accesses render dot-joined
//! (`author.name`), element accesses render bracketed (`tags[0]`,
//! `meta[locale]`). The root path is empty and renders as `""`.
//!
//! Rules report errors with paths relative to the value they inspected;
//! each enclosing level prepends its own segment on the way out, so a
//! deeply nested failure ends up addressable from the top of the report.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

// ============================================================================
// PATH SEGMENT
// ============================================================================

/// One step of an [`ErrorPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named member access, rendered as `.name`.
    Member(Cow<'static, str>),
    /// An element access by array index or map key, rendered as `[key]`.
    Index(Cow<'static, str>),
}

impl PathSegment {
    /// Creates a member segment.
    pub fn member(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Member(name.into())
    }

    /// Creates an index segment from an array index or map key.
    pub fn index(key: impl Into<Cow<'static, str>>) -> Self {
        Self::Index(key.into())
    }
}

// ============================================================================
// ERROR PATH
// ============================================================================

/// Where in the validated structure an error occurred.
///
/// Most paths are one or two segments deep, so segments are stored
/// inline. Paths serialize as their rendered string form.
///
/// # Examples
///
/// ```
/// use veritas_validator::foundation::ErrorPath;
///
/// let mut path = ErrorPath::member("tags");
/// path.push_index("0");
/// path.push_member("name");
/// assert_eq!(path.to_string(), "tags[0].name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ErrorPath {
    segments: SmallVec<[PathSegment; 4]>,
}

impl ErrorPath {
    /// The empty path, designating the validated value itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A path of a single member segment.
    pub fn member(name: impl Into<Cow<'static, str>>) -> Self {
        let mut path = Self::root();
        path.push_member(name);
        path
    }

    /// A path of a single index segment.
    pub fn index(key: impl Into<Cow<'static, str>>) -> Self {
        let mut path = Self::root();
        path.push_index(key);
        path
    }

    /// Whether this is the empty root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path holds no segments; same as [`is_root`](Self::is_root).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Appends a member segment.
    pub fn push_member(&mut self, name: impl Into<Cow<'static, str>>) {
        self.segments.push(PathSegment::Member(name.into()));
    }

    /// Appends an index segment.
    pub fn push_index(&mut self, key: impl Into<Cow<'static, str>>) {
        self.segments.push(PathSegment::Index(key.into()));
    }

    /// This path re-rooted under `base`.
    ///
    /// Re-rooting under the root path is an identity, so relative paths
    /// cost nothing until an enclosing level actually exists.
    #[must_use]
    pub fn prefixed(&self, base: &Self) -> Self {
        if base.is_root() {
            return self.clone();
        }
        let mut segments = base.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Member(name) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for ErrorPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromIterator<PathSegment> for ErrorPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Extend<PathSegment> for ErrorPath {
    fn extend<I: IntoIterator<Item = PathSegment>>(&mut self, iter: I) {
        self.segments.extend(iter);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_empty() {
        assert!(ErrorPath::root().is_root());
        assert_eq!(ErrorPath::root().to_string(), "");
    }

    #[test]
    fn members_join_with_dots() {
        let mut path = ErrorPath::member("author");
        path.push_member("name");
        assert_eq!(path.to_string(), "author.name");
    }

    #[test]
    fn index_attaches_without_dot() {
        let mut path = ErrorPath::member("tags");
        path.push_index("k1");
        assert_eq!(path.to_string(), "tags[k1]");
    }

    #[test]
    fn leading_index_has_no_prefix() {
        let mut path = ErrorPath::index("0");
        path.push_member("name");
        assert_eq!(path.to_string(), "[0].name");
    }

    #[test]
    fn mixed_segments_render_in_order() {
        let path: ErrorPath = [
            PathSegment::member("tags"),
            PathSegment::index("0"),
            PathSegment::member("label"),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), "tags[0].label");
    }

    #[test]
    fn prefixed_under_root_is_identity() {
        let rel = ErrorPath::member("name");
        assert_eq!(rel.prefixed(&ErrorPath::root()), rel);
    }

    #[test]
    fn prefixed_prepends_base_segments() {
        let rel = ErrorPath::member("name");
        let base = ErrorPath::member("author");
        let full = rel.prefixed(&base);
        assert_eq!(full.to_string(), "author.name");
        assert_eq!(full.len(), 2);
    }

    #[test]
    fn serializes_as_rendered_string() {
        let mut path = ErrorPath::member("tags");
        path.push_index("2");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!("tags[2]"));
    }
}
