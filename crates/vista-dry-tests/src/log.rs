// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ordered, shareable call log for asserting cross-task ordering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Append-only list of labels such as `"start:menu-0"` or `"deactivate:menu-0"`.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `entry`.
    pub fn push(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    /// Snapshot of all entries in order.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Index of the first entry equal to `entry`.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.lock().iter().position(|e| e == entry)
    }

    /// Whether `first` was logged before `second` (both must be present).
    pub fn ordered(&self, first: &str, second: &str) -> bool {
        matches!(
            (self.position(first), self.position(second)),
            (Some(a), Some(b)) if a < b
        )
    }
}
