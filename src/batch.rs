//! Batch state: the ordered list of certificate recipients.
//!
//! The batch is the single piece of process-wide mutable state. It has one
//! owner (the session or CLI driver); everything else borrows it. Per-item
//! export operations clone the [`Name`] they act on at submission time, so a
//! clear that lands mid-export cannot change the filename or content of an
//! item that is already in flight.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One certificate recipient: a trimmed, non-empty text entry.
///
/// Duplicates are allowed — two people can share a name, and the batch
/// preserves input order rather than deduplicating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Build a `Name` from a raw piece of input, trimming surrounding
    /// whitespace. Returns `None` if nothing remains after the trim.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Name(trimmed.to_string()))
        }
    }

    /// The cleaned name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ordered collection of names currently staged for export.
///
/// Replaced wholesale by each generate action and emptied by an explicit
/// clear; never mutated item-by-item. Index addressing is how the list UI
/// binds its per-row preview/export actions.
#[derive(Debug, Default, Clone)]
pub struct CertificateBatch {
    names: Vec<Name>,
}

impl CertificateBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole batch with a freshly parsed name list.
    ///
    /// Callers presenting a list view must rebuild it after this — rows
    /// bound to the previous batch's indices are stale.
    pub fn replace(&mut self, names: Vec<Name>) {
        self.names = names;
    }

    /// Drop every staged name.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// The name at `index`, or `None` when the index is out of range.
    ///
    /// UI boundaries validate indices through this method; the export driver
    /// never constructs an out-of-range index (it enumerates a snapshot).
    pub fn get(&self, index: usize) -> Option<&Name> {
        self.names.get(index)
    }

    /// Snapshot the batch contents by value.
    ///
    /// This is the submission-time capture for batch exports: the returned
    /// names stay valid even if the batch is cleared while the export runs.
    pub fn snapshot(&self) -> Vec<Name> {
        self.names.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
