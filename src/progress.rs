//! Progress-callback trait for per-item export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! real-time events as the driver works through a batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a log file, or a GUI —
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it works correctly when the
//! staggered policy completes items out of order.

use std::sync::Arc;

/// Called by the export driver as it processes each batch item.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// Under [`crate::config::ExportPolicy::Staggered`], `on_item_complete` and
/// `on_item_error` may be called from concurrent tasks. Implementations
/// must protect shared mutable state with appropriate synchronisation
/// primitives (e.g. `Mutex`, `AtomicUsize`).
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before any item is submitted.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before an item is submitted to the rasterizer.
    ///
    /// # Arguments
    /// * `index` — 0-based batch index
    /// * `total` — number of items in this batch
    /// * `name`  — the recipient name
    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an item's PDF has been written to disk.
    fn on_item_complete(&self, index: usize, total: usize, file_name: &str) {
        let _ = (index, total, file_name);
    }

    /// Called when an item fails. The rest of the batch continues.
    fn on_item_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called once after every item has been attempted.
    fn on_batch_complete(&self, total: usize, exported: usize) {
        let _ = (total, exported);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;
