//! The export driver: certificates in, PDF files on disk out.
//!
//! ## Two entry points
//!
//! * [`ExportDriver::export_one`] — render, rasterize and save a single
//!   certificate. Failures are per-item [`ExportError`]s.
//! * [`ExportDriver::export_all`] — drive a whole batch through the
//!   configured [`ExportPolicy`], collecting per-item outcomes into an
//!   [`ExportReport`]. One item's failure never aborts its siblings; the
//!   report is how mixed outcomes surface.
//!
//! ## Submission-time capture
//!
//! `export_all` snapshots the batch's names by value before submitting
//! anything. A clear that lands while the batch is draining cannot change
//! the filename or content of an item that is already in flight.
//!
//! ## Re-entrancy
//!
//! A batch export flips an atomic busy flag for its whole duration; a second
//! `export_all` meanwhile gets [`CertError::ExportInProgress`]. The flag is
//! restored by a drop guard, so it comes back down on every exit path —
//! including a declined confirmation.

use crate::batch::{CertificateBatch, Name};
use crate::config::{ExportConfig, ExportPolicy};
use crate::error::{CertError, ExportError};
use crate::pipeline::rasterize::{
    rasterize_blocking, PdfOptions, PrintPdfRasterizer, Rasterizer,
};
use crate::pipeline::render::{render, RenderMode};
use crate::report::{ExportReport, ItemOutcome};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Every exported file starts with this prefix.
const FILE_PREFIX: &str = "certificado_";

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Derive the output file name for a recipient:
/// `certificado_<name with whitespace runs replaced by underscores>.pdf`.
pub fn pdf_file_name(name: &Name) -> String {
    let flat = WHITESPACE_RUNS.replace_all(name.as_str(), "_");
    format!("{FILE_PREFIX}{flat}.pdf")
}

/// Asks the user to confirm an action. Injected so the driver stays
/// presentation-agnostic and tests can script the answers.
pub trait ConfirmPrompt: Send + Sync {
    /// Return `true` to proceed, `false` to abort.
    fn confirm(&self, message: &str) -> bool;
}

/// A prompt that always says yes — for `--yes` runs and non-interactive use.
pub struct AlwaysConfirm;

impl ConfirmPrompt for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Drives certificate exports through a [`Rasterizer`].
pub struct ExportDriver {
    engine: Arc<dyn Rasterizer>,
    config: ExportConfig,
    busy: AtomicBool,
}

/// Restores the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ExportDriver {
    /// Build a driver around an explicit engine (tests inject fakes here).
    pub fn new(engine: Arc<dyn Rasterizer>, config: ExportConfig) -> Self {
        Self {
            engine,
            config,
            busy: AtomicBool::new(false),
        }
    }

    /// Build a driver around the bundled `printpdf` engine.
    pub fn with_default_engine(config: ExportConfig) -> Self {
        Self::new(Arc::new(PrintPdfRasterizer), config)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Whether a batch export is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Rough wall-clock estimate for a batch of `count` items, used in the
    /// confirmation prompt. Per item: the inter-item pause plus ~500 ms of
    /// engine time.
    pub fn estimate_secs(&self, count: usize) -> u64 {
        let per_item_ms = self.config.inter_item_delay_ms + 500;
        (count as u64 * per_item_ms).div_ceil(1000)
    }

    /// Render, rasterize and save one certificate.
    ///
    /// The name is taken by reference but everything the engine sees is
    /// owned by the submission; `index` is carried for logging symmetry with
    /// batch items.
    pub async fn export_one(&self, name: &Name, index: usize) -> Result<PathBuf, ExportError> {
        let file_name = pdf_file_name(name);
        debug!(index, name = %name, file = %file_name, "exporting certificate");

        let doc = render(name, RenderMode::Print);
        let mut opts = PdfOptions::print(file_name.as_str(), doc.pixel_size());
        opts.image_quality = self.config.image_quality;
        opts.raster_scale = self.config.raster_scale;

        let bytes = rasterize_blocking(Arc::clone(&self.engine), doc, opts)
            .await
            .map_err(|e| ExportError::RasterizeFailed {
                name: name.as_str().to_string(),
                detail: e.to_string(),
            })?;

        let path = self.config.out_dir.join(&file_name);
        self.save_atomic(name, &path, &bytes).await?;

        info!(name = %name, path = %path.display(), "certificate saved");
        Ok(path)
    }

    /// Export the whole batch by the configured policy.
    ///
    /// Above the confirmation threshold, `confirm` is asked once with the
    /// item count and a duration estimate; declining aborts with zero
    /// submissions. Returns the per-item report — item failures do not make
    /// the batch fail.
    pub async fn export_all(
        &self,
        batch: &CertificateBatch,
        confirm: &dyn ConfirmPrompt,
    ) -> Result<ExportReport, CertError> {
        if batch.is_empty() {
            return Err(CertError::EmptyBatch);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CertError::ExportInProgress);
        }
        let _guard = BusyGuard(&self.busy);

        let total = batch.len();
        if total > self.config.confirm_threshold {
            let message = format!(
                "You are about to export {total} certificates (roughly {}s). Continue?",
                self.estimate_secs(total)
            );
            if !confirm.confirm(&message) {
                info!(total, "batch export declined at confirmation");
                return Err(CertError::ConfirmDeclined);
            }
        }

        // Fail fast on an unusable output directory instead of producing
        // one identical item failure per name.
        tokio::fs::create_dir_all(&self.config.out_dir)
            .await
            .map_err(|source| CertError::OutputDirFailed {
                path: self.config.out_dir.clone(),
                source,
            })?;

        // Submission-time capture: the batch can be cleared from now on
        // without affecting anything below.
        let names = batch.snapshot();

        info!(total, policy = ?self.config.policy, "starting batch export");
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        let start = Instant::now();
        let items = match self.config.policy {
            ExportPolicy::Sequential => self.drive_sequential(&names).await,
            ExportPolicy::Staggered => self.drive_staggered(&names).await,
        };
        let report = ExportReport::from_items(items, start.elapsed().as_millis() as u64);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(report.total, report.exported);
        }
        info!(
            exported = report.exported,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "batch export finished"
        );

        Ok(report)
    }

    /// Sequential policy: await each item, pausing between items (not after
    /// the last). Completions occur in batch order.
    async fn drive_sequential(&self, names: &[Name]) -> Vec<ItemOutcome> {
        let total = names.len();
        let mut items = Vec::with_capacity(total);
        for (index, name) in names.iter().enumerate() {
            if index > 0 {
                sleep(self.config.inter_item_delay()).await;
            }
            items.push(self.run_item(name.clone(), index, total).await);
        }
        items
    }

    /// Staggered policy: all items submitted concurrently, item *i* delayed
    /// by *i* × the inter-item delay. Initiations stay ordered; completions
    /// may interleave.
    async fn drive_staggered(&self, names: &[Name]) -> Vec<ItemOutcome> {
        let total = names.len();
        let delay = self.config.inter_item_delay();

        let mut items: Vec<ItemOutcome> =
            stream::iter(names.iter().cloned().enumerate().map(|(index, name)| {
                async move {
                    if index > 0 {
                        sleep(delay * index as u32).await;
                    }
                    self.run_item(name, index, total).await
                }
            }))
            .buffer_unordered(total)
            .collect()
            .await;

        // Report rows in batch order regardless of completion order.
        items.sort_by_key(|item| item.index);
        items
    }

    /// One batch item: progress events around [`Self::export_one`], with the
    /// failure folded into the outcome instead of propagating.
    async fn run_item(&self, name: Name, index: usize, total: usize) -> ItemOutcome {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_item_start(index, total, name.as_str());
        }

        let file_name = pdf_file_name(&name);
        let error = match self.export_one(&name, index).await {
            Ok(_) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_item_complete(index, total, &file_name);
                }
                None
            }
            Err(e) => {
                warn!(index, name = %name, "export failed: {e}");
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_item_error(index, total, e.to_string());
                }
                Some(e)
            }
        };

        ItemOutcome {
            index,
            name: name.as_str().to_string(),
            file_name,
            error,
        }
    }

    /// Atomic write: temp file + rename, so a crash mid-write never leaves a
    /// half-written `.pdf` behind.
    async fn save_atomic(
        &self,
        name: &Name,
        path: &std::path::Path,
        bytes: &[u8],
    ) -> Result<(), ExportError> {
        let save_failed = |detail: String| ExportError::SaveFailed {
            name: name.as_str().to_string(),
            path: path.display().to_string(),
            detail,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| save_failed(e.to_string()))?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| save_failed(e.to_string()))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| save_failed(e.to_string()))?;

        Ok(())
    }
}
