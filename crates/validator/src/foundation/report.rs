//! Aggregated validation results.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::foundation::error::ValidationError;
use crate::foundation::path::ErrorPath;

/// Validation errors grouped by the rendered path of the offending value.
///
/// Buckets keep first-error order, as do the errors inside one bucket,
/// so a report reads back in evaluation order. An empty report means the
/// subject passed. Serializes as a `path -> [errors]` object; the root
/// path is the empty string.
///
/// # Examples
///
/// ```
/// use veritas_validator::foundation::{ValidationError, ValidationReport};
///
/// let mut report = ValidationReport::new();
/// report.push(ValidationError::required().under_member("title"));
/// assert!(!report.is_valid());
/// assert_eq!(report.messages_at("title"), ["Value is required"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: IndexMap<String, Vec<ValidationError>>,
}

impl ValidationReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no rule failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of recorded errors across all paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Whether the report holds no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Paths that collected at least one error, in first-error order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Errors recorded at one rendered path; empty when the path is
    /// clean.
    #[must_use]
    pub fn errors_at(&self, path: &str) -> &[ValidationError] {
        self.errors.get(path).map_or(&[], Vec::as_slice)
    }

    /// Messages recorded at one rendered path.
    #[must_use]
    pub fn messages_at(&self, path: &str) -> Vec<&str> {
        self.errors_at(path)
            .iter()
            .map(|error| error.message.as_ref())
            .collect()
    }

    /// Iterates buckets as `(path, errors)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.errors
            .iter()
            .map(|(path, errors)| (path.as_str(), errors.as_slice()))
    }

    /// Records one error under its own path.
    pub fn push(&mut self, error: ValidationError) {
        self.errors
            .entry(error.path.to_string())
            .or_default()
            .push(error);
    }

    /// Re-roots `errors` under `base` and records them all.
    pub fn absorb(&mut self, base: &ErrorPath, errors: Vec<ValidationError>) {
        for error in errors {
            self.push(error.prefixed(base));
        }
    }

    /// `Ok` when valid, otherwise the report itself as the error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("no validation errors");
        }
        writeln!(f, "{} validation error(s)", self.len())?;
        for (path, errors) in &self.errors {
            for error in errors {
                if path.is_empty() {
                    writeln!(f, "  - {}", error.message)?;
                } else {
                    writeln!(f, "  - {path}: {}", error.message)?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
