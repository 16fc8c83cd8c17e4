//! Shared state that travels with one validation run.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// Member name to current value, in discovery order.
pub type DataMap = IndexMap<String, Value>;

/// State visible to every rule of one validation run.
///
/// Holds the top-level data snapshot for cross-member rules, the
/// snapshot of the data set currently being walked, a named-parameter
/// bag and the structural depth. Collection rules publish the element
/// key under [`Each::KEY`](crate::combinators::Each::KEY) while
/// visiting elements.
///
/// The top snapshot is pinned by the outermost data set of the run and
/// stays put while nested levels swap the current one in and out, which
/// is what lets a rule deep inside a nested object compare against a
/// top-level sibling.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    top: Option<Arc<DataMap>>,
    current: Option<Arc<DataMap>>,
    params: IndexMap<String, Value>,
    depth: usize,
}

impl ValidationContext {
    /// A fresh context with no data bound yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a top-level member, for cross-member comparisons.
    #[must_use]
    pub fn top_value(&self, name: &str) -> Option<&Value> {
        self.top.as_deref()?.get(name)
    }

    /// Value of a member in the data set currently being walked.
    #[must_use]
    pub fn current_value(&self, name: &str) -> Option<&Value> {
        self.current.as_deref()?.get(name)
    }

    /// Looks up a named parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// All named parameters, in insertion order.
    #[must_use]
    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    /// Sets a named parameter, returning the value it replaced.
    pub fn set_param(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.params.insert(key.into(), value)
    }

    /// Removes a named parameter, returning it.
    pub fn remove_param(&mut self, key: &str) -> Option<Value> {
        self.params.shift_remove(key)
    }

    /// Structural nesting depth of the value currently under evaluation.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Pins the top-level snapshot if none is bound yet.
    pub(crate) fn ensure_top(&mut self, snapshot: &Arc<DataMap>) {
        if self.top.is_none() {
            self.top = Some(Arc::clone(snapshot));
        }
    }

    /// Swaps the walked data set, returning the previous one so callers
    /// can restore it on the way out.
    pub(crate) fn swap_current(&mut self, next: Option<Arc<DataMap>>) -> Option<Arc<DataMap>> {
        std::mem::replace(&mut self.current, next)
    }

    pub(crate) fn raise_depth(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn lower_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

// ============================================================================
// TESTS
// ============================================================================
