//! Error types for the cert2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CertError`] — **Fatal**: the requested action cannot proceed at all
//!   (no valid names in the input, invalid configuration, a batch export
//!   already in flight). Returned as `Err(CertError)` from the top-level
//!   entry points.
//!
//! * [`ExportError`] — **Non-fatal**: a single certificate failed (the
//!   rasterizer rejected the document, the file could not be written) but the
//!   other certificates in the batch are fine. Stored inside
//!   [`crate::report::ItemOutcome`] so callers can inspect partial success
//!   rather than losing the whole batch to one bad item.
//!
//! The separation lets callers decide their own tolerance: surface the first
//! item failure, log and continue, or collect all failures for a post-run
//! summary. The batch as a whole is never marked failed by an item failure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cert2pdf library.
///
/// Item-level failures use [`ExportError`] and are stored in
/// [`crate::report::ItemOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum CertError {
    // ── Input validation ──────────────────────────────────────────────────
    /// The raw input was empty or all-whitespace.
    #[error("No names were entered.\nType or paste at least one name, one per line (commas also work).")]
    EmptyInput,

    /// The input contained text but no piece survived trimming.
    #[error("No valid names were found in the input.\nSeparate names with newlines, commas, semicolons or colons.")]
    NoValidNames,

    /// An export was requested on an empty batch.
    #[error("There are no certificates to export. Generate the batch first.")]
    EmptyBatch,

    // ── Batch export ──────────────────────────────────────────────────────
    /// A batch export is already running; re-entrant invocation is rejected.
    #[error("A batch export is already in progress. Wait for it to finish before starting another.")]
    ExportInProgress,

    /// The user declined the large-batch confirmation prompt.
    #[error("Batch export cancelled — no certificates were submitted.")]
    ConfirmDeclined,

    // ── I/O ───────────────────────────────────────────────────────────────
    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read the names file given on the command line.
    #[error("Failed to read names from '{path}': {source}\nCheck the path exists and is readable.")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single certificate in a batch.
///
/// Stored alongside [`crate::report::ItemOutcome`] when an item fails.
/// The overall export continues through the remaining items.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    /// The rasterize collaborator rejected the rendered document.
    #[error("'{name}': PDF rasterization failed: {detail}")]
    RasterizeFailed { name: String, detail: String },

    /// The PDF bytes were produced but could not be written to disk.
    #[error("'{name}': failed to write '{path}': {detail}")]
    SaveFailed {
        name: String,
        path: String,
        detail: String,
    },
}

impl ExportError {
    /// The recipient name of the certificate this failure belongs to.
    pub fn name(&self) -> &str {
        match self {
            ExportError::RasterizeFailed { name, .. } => name,
            ExportError::SaveFailed { name, .. } => name,
        }
    }
}

/// Failure reported by a [`crate::pipeline::rasterize::Rasterizer`].
///
/// The collaborator is opaque: whatever went wrong inside the engine is
/// carried as a single human-readable detail string, which the export driver
/// wraps into [`ExportError::RasterizeFailed`] with the item context.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RasterizeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_message_mentions_separators() {
        let msg = CertError::NoValidNames.to_string();
        assert!(msg.contains("commas"), "got: {msg}");
    }

    #[test]
    fn export_error_carries_name() {
        let e = ExportError::RasterizeFailed {
            name: "Maria Santos".into(),
            detail: "engine exploded".into(),
        };
        assert_eq!(e.name(), "Maria Santos");
        assert!(e.to_string().contains("Maria Santos"));
        assert!(e.to_string().contains("engine exploded"));
    }

    #[test]
    fn save_failed_display_includes_path() {
        let e = ExportError::SaveFailed {
            name: "João Silva".into(),
            path: "out/certificado_João_Silva.pdf".into(),
            detail: "permission denied".into(),
        };
        assert!(e.to_string().contains("out/certificado_João_Silva.pdf"));
    }

    #[test]
    fn export_error_serializes() {
        let e = ExportError::RasterizeFailed {
            name: "x".into(),
            detail: "y".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: ExportError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "x");
    }
}
