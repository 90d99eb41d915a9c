//! Export outcome types: what happened to each item and to the batch.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};

/// The outcome of one certificate in a batch export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// 0-based position in the batch at submission time.
    pub index: usize,
    /// Recipient name, captured by value when the item was submitted.
    pub name: String,
    /// File name the PDF was (or would have been) written to.
    pub file_name: String,
    /// The failure, if the item did not complete. `None` means the PDF is
    /// on disk.
    pub error: Option<ExportError>,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a whole batch export.
///
/// A report is returned even when some (or all) items failed: per-item
/// failures never fail the batch. Inspect [`ExportReport::failed`] to decide
/// how to present mixed outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// Items submitted — always the full batch size.
    pub total: usize,
    /// Items whose PDF reached disk.
    pub exported: usize,
    /// Items that failed.
    pub failed: usize,
    /// Wall-clock duration of the whole batch in milliseconds.
    pub duration_ms: u64,
    /// Per-item outcomes, in batch order.
    pub items: Vec<ItemOutcome>,
}

impl ExportReport {
    /// Assemble a report from per-item outcomes (already in batch order).
    pub fn from_items(items: Vec<ItemOutcome>, duration_ms: u64) -> Self {
        let total = items.len();
        let exported = items.iter().filter(|i| i.succeeded()).count();
        Self {
            total,
            exported,
            failed: total - exported,
            duration_ms,
            items,
        }
    }

    /// True when every item reached disk.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
