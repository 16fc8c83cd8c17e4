//! Data sets: uniform read access over subject snapshots and raw maps.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::context::DataMap;
use crate::foundation::error::ValidatorError;
use crate::subject::member::MemberSet;

// ============================================================================
// DATA SET
// ============================================================================

/// Read access to named values during evaluation.
///
/// `has` answers member existence, which is distinct from the member's
/// value being `null` or empty. `data` exposes the full snapshot in
/// discovery order; the engine pins it as the run's top-level and
/// current data.
pub trait DataSet: fmt::Debug {
    /// Whether a member with this name exists at all.
    fn has(&self, name: &str) -> bool;

    /// Current value of the named member; `None` for unknown names.
    fn value(&self, name: &str) -> Option<&Value>;

    /// Snapshot of every member's value, in discovery order.
    fn data(&self) -> Arc<DataMap>;

    /// The whole data set as a single JSON object, for subject-level
    /// rules.
    fn to_value(&self) -> Value {
        Value::Object(
            self.data()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Snapshot of a live subject instance taken through its member set.
///
/// Extraction materializes every admitted member's value once, up
/// front, so rules never observe a half-updated subject and getters run
/// exactly once per validation.
#[derive(Debug, Clone)]
pub struct Extractor {
    members: Arc<MemberSet>,
    snapshot: Arc<DataMap>,
}

impl Extractor {
    /// Reads every member of `subject` into a snapshot.
    ///
    /// Fails with [`ValidatorError::SubjectMismatch`] when `subject` is
    /// not an instance of the member set's declaring type.
    pub fn new<T: 'static>(subject: &T, members: Arc<MemberSet>) -> Result<Self, ValidatorError> {
        if members.subject_type() != TypeId::of::<T>() {
            return Err(mismatch::<T>(&members));
        }
        let mut snapshot = DataMap::with_capacity(members.len());
        for (name, member) in members.iter() {
            let value = member.read(subject).ok_or_else(|| mismatch::<T>(&members))?;
            snapshot.insert(name.to_owned(), value);
        }
        Ok(Self {
            members,
            snapshot: Arc::new(snapshot),
        })
    }

    /// The member set this snapshot was taken through.
    #[must_use]
    pub fn members(&self) -> &MemberSet {
        &self.members
    }
}

fn mismatch<T>(members: &MemberSet) -> ValidatorError {
    ValidatorError::SubjectMismatch {
        expected: members.subject_name().to_owned(),
        actual: type_name::<T>().to_owned(),
    }
}

impl DataSet for Extractor {
    fn has(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    fn value(&self, name: &str) -> Option<&Value> {
        self.snapshot.get(name)
    }

    fn data(&self) -> Arc<DataMap> {
        Arc::clone(&self.snapshot)
    }
}

// ============================================================================
// MAP DATA
// ============================================================================

/// A raw name-to-value data set, for validating plain JSON maps against
/// programmatically supplied rules.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    entries: Arc<DataMap>,
}

impl MapData {
    /// Wraps an already ordered map.
    #[must_use]
    pub fn new(entries: DataMap) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Wraps a JSON object; `None` for any other value shape.
    #[must_use]
    pub fn from_object(value: &Value) -> Option<Self> {
        match value {
            Value::Object(entries) => Some(Self::from(entries.clone())),
            _ => None,
        }
    }
}

impl From<DataMap> for MapData {
    fn from(entries: DataMap) -> Self {
        Self::new(entries)
    }
}

impl From<serde_json::Map<String, Value>> for MapData {
    fn from(entries: serde_json::Map<String, Value>) -> Self {
        Self::new(entries.into_iter().collect())
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for MapData {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

impl DataSet for MapData {
    fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    fn data(&self) -> Arc<DataMap> {
        Arc::clone(&self.entries)
    }
}

// ============================================================================
// TESTS
// ============================================================================
