//! # cert2pdf
//!
//! Batch-generate course-completion certificates as landscape-A4 PDF files
//! from a free-form list of recipient names.
//!
//! ## Why this crate?
//!
//! Preparing certificates for a course or event is a copy-paste job that
//! explodes into an afternoon of manual exports the moment the attendee list
//! grows. This crate takes the list as people actually paste it — names
//! separated by any mixture of newlines, commas, semicolons or colons —
//! renders each one into a fixed certificate template, and drives the PDF
//! engine through the whole batch with paced submissions and per-item error
//! isolation: one bad name never sinks the rest of the run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! raw text
//!  │
//!  ├─ 1. Parse     split on [\n,;:] runs, trim, drop empties
//!  ├─ 2. Batch     ordered, index-addressable recipient list
//!  ├─ 3. Render    fixed template + one name → HTML document
//!  ├─ 4. Rasterize printpdf HTML layout (CPU-bound, spawn_blocking)
//!  └─ 5. Save      certificado_<Name>.pdf, A4 landscape, zero margins
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cert2pdf::{AlwaysConfirm, CertificateBatch, ExportConfig, ExportDriver, parse_names};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut batch = CertificateBatch::new();
//!     batch.replace(parse_names("João Silva\nMaria Santos\nPedro Oliveira"));
//!
//!     let config = ExportConfig::builder().out_dir("certificates").build()?;
//!     let driver = ExportDriver::with_default_engine(config);
//!
//!     let report = driver.export_all(&batch, &AlwaysConfirm).await?;
//!     eprintln!("{}/{} exported", report.exported, report.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cert2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! cert2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{CertificateBatch, Name};
pub use config::{ExportConfig, ExportConfigBuilder, ExportPolicy};
pub use error::{CertError, ExportError, RasterizeError};
pub use export::{pdf_file_name, AlwaysConfirm, ConfirmPrompt, ExportDriver};
pub use pipeline::parse::parse_names;
pub use pipeline::rasterize::{PdfOptions, PrintPdfRasterizer, Rasterizer};
pub use pipeline::render::{render, CertificateDocument, RenderMode};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{ExportReport, ItemOutcome};
pub use session::Session;
