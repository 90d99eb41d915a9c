//! PDF rasterization: hand a rendered certificate to the layout engine.
//!
//! ## The collaborator boundary
//!
//! The engine that turns a document into PDF bytes is deliberately opaque.
//! The pipeline supplies two things — the rendered HTML and a fixed
//! [`PdfOptions`] set (page geometry, margins, quality and scale hints) —
//! and gets back bytes or a [`RasterizeError`]. Nothing else crosses the
//! [`Rasterizer`] trait, which is also what lets tests substitute a
//! recording fake for the real engine.
//!
//! ## Why spawn_blocking?
//!
//! `printpdf`'s HTML layout pass is CPU-bound and synchronous. Driving it
//! through [`tokio::task::spawn_blocking`] moves the work onto the blocking
//! thread pool so the interactive session stays responsive while a batch
//! export grinds through its items.

use crate::error::RasterizeError;
use crate::pipeline::render::CertificateDocument;
use printpdf::{GeneratePdfOptions, ImageOptimizationOptions, PdfDocument, PdfSaveOptions};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

// A4 landscape, in millimetres.
const A4_LANDSCAPE_WIDTH_MM: f32 = 297.0;
const A4_LANDSCAPE_HEIGHT_MM: f32 = 210.0;

/// The fixed option set submitted with every document.
///
/// Mirrors the surface the engine understands: page unit/format/orientation
/// collapse to the millimetre dimensions, margins are explicit, and the
/// quality/scale/pixel fields are rasterization hints the engine applies
/// where it supports them.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Target file name (also used as the document title inside the PDF).
    pub file_name: String,
    /// Page width in mm. A4 landscape: 297.
    pub page_width_mm: f32,
    /// Page height in mm. A4 landscape: 210.
    pub page_height_mm: f32,
    /// Uniform page margin in mm. Certificates bleed to the edge: 0.
    pub margin_mm: f32,
    /// Encoding quality for embedded raster images, 0.0–1.0.
    pub image_quality: f32,
    /// Raster scale multiplier for print fidelity (≥ 1).
    pub raster_scale: f32,
    /// Fixed canvas in pixels — present for print-mode documents only.
    pub pixel_size: Option<(u32, u32)>,
}

impl PdfOptions {
    /// The print option set: A4 landscape, zero margins, the fixed quality
    /// and scale used for every certificate export.
    pub fn print(file_name: impl Into<String>, pixel_size: Option<(u32, u32)>) -> Self {
        Self {
            file_name: file_name.into(),
            page_width_mm: A4_LANDSCAPE_WIDTH_MM,
            page_height_mm: A4_LANDSCAPE_HEIGHT_MM,
            margin_mm: 0.0,
            image_quality: 0.98,
            raster_scale: 2.0,
            pixel_size,
        }
    }
}

/// The rasterize collaborator: rendered document + options → PDF bytes.
///
/// Implementations must be `Send + Sync`; the export driver calls them from
/// the blocking thread pool.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        doc: &CertificateDocument,
        opts: &PdfOptions,
    ) -> Result<Vec<u8>, RasterizeError>;
}

/// The bundled engine: `printpdf`'s HTML layout pass.
///
/// Stateless — one value can serve any number of concurrent rasterizations.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPdfRasterizer;

impl Rasterizer for PrintPdfRasterizer {
    fn rasterize(
        &self,
        doc: &CertificateDocument,
        opts: &PdfOptions,
    ) -> Result<Vec<u8>, RasterizeError> {
        let html = doc.html();

        let gen_opts = GeneratePdfOptions {
            page_width: Some(opts.page_width_mm),
            page_height: Some(opts.page_height_mm),
            image_optimization: Some(ImageOptimizationOptions {
                quality: Some(opts.image_quality),
                ..Default::default()
            }),
            ..Default::default()
        };

        // No external images or fonts: the template embeds neither.
        let mut warnings = Vec::new();
        let pdf = PdfDocument::from_html(
            &html,
            &BTreeMap::new(),
            &BTreeMap::new(),
            &gen_opts,
            &mut warnings,
        )
        .map_err(|e| RasterizeError(format!("HTML layout failed: {e}")))?;

        if !warnings.is_empty() {
            warn!(
                file = %opts.file_name,
                count = warnings.len(),
                "engine reported layout warnings: {warnings:?}"
            );
        }

        let mut save_warnings = Vec::new();
        let bytes = pdf.save(&PdfSaveOptions::default(), &mut save_warnings);
        debug!(
            file = %opts.file_name,
            size = bytes.len(),
            "rasterized certificate"
        );
        Ok(bytes)
    }
}

/// Run one rasterization on the blocking thread pool.
///
/// Takes the document and options by value: the submission owns its inputs,
/// so nothing the session does afterwards can reach into an in-flight item.
pub async fn rasterize_blocking(
    engine: Arc<dyn Rasterizer>,
    doc: CertificateDocument,
    opts: PdfOptions,
) -> Result<Vec<u8>, RasterizeError> {
    tokio::task::spawn_blocking(move || engine.rasterize(&doc, &opts))
        .await
        .map_err(|e| RasterizeError(format!("rasterize task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_options_pin_a4_landscape_zero_margin() {
        let opts = PdfOptions::print("certificado_Ana.pdf", Some((1123, 794)));
        assert_eq!(opts.page_width_mm, 297.0);
        assert_eq!(opts.page_height_mm, 210.0);
        assert_eq!(opts.margin_mm, 0.0);
        assert_eq!(opts.image_quality, 0.98);
        assert_eq!(opts.raster_scale, 2.0);
        assert_eq!(opts.pixel_size, Some((1123, 794)));
    }

    #[test]
    fn preview_documents_carry_no_pixel_hint() {
        let opts = PdfOptions::print("x.pdf", None);
        assert_eq!(opts.pixel_size, None);
    }
}
