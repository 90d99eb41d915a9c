//! Configuration types for batch certificate export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via
//! its [`ExportConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the session and the CLI, serialise it
//! for logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::CertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a batch export paces its items.
///
/// The pacing exists to avoid overwhelming the rasterization engine and the
/// filesystem with a burst of simultaneous documents; which variant to use
/// is an explicit, testable parameter rather than a timing side effect.
///
/// Both variants guarantee: every item is submitted exactly once, submission
/// order follows batch order, and one item's failure never prevents the
/// remaining submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportPolicy {
    /// Await each item before starting the next, sleeping the inter-item
    /// delay between items. Completions occur in batch order, and a failure
    /// is visible before the next item is submitted. (default)
    #[default]
    Sequential,
    /// Submit all items concurrently, delaying item *i* by *i* × the
    /// inter-item delay. Initiations stay ordered; completions may
    /// interleave, so failures surface only as the batch drains.
    Staggered,
}

/// Configuration for a batch certificate export.
///
/// Built via [`ExportConfig::builder()`] or using
/// [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use cert2pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .out_dir("certificates")
///     .inter_item_delay_ms(250)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Directory PDF files are written into. Created on first export.
    /// Default: the current directory.
    pub out_dir: PathBuf,

    /// Pacing policy for batch exports. Default: [`ExportPolicy::Sequential`].
    pub policy: ExportPolicy,

    /// Pause between batch items in milliseconds. Default: 1000.
    ///
    /// One second is enough for the engine and the filesystem to settle
    /// between documents without making a 20-name batch feel slow. Tests
    /// set this to zero.
    pub inter_item_delay_ms: u64,

    /// Batch size above which export-all asks for confirmation. Default: 5.
    ///
    /// Below the threshold a batch finishes in a few seconds and asking
    /// would be noise; above it the prompt states the count and a duration
    /// estimate so the user can bail out before a long run starts.
    pub confirm_threshold: usize,

    /// Image encoding quality hint passed to the engine, 0.0–1.0.
    /// Default: 0.98.
    pub image_quality: f32,

    /// Raster scale multiplier for print fidelity. Default: 2.0.
    ///
    /// 2× keeps text crisp when the PDF is printed; 1× is acceptable for
    /// screen-only distribution.
    pub raster_scale: f32,

    /// Observer for per-item progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            policy: ExportPolicy::default(),
            inter_item_delay_ms: 1000,
            confirm_threshold: 5,
            image_quality: 0.98,
            raster_scale: 2.0,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("out_dir", &self.out_dir)
            .field("policy", &self.policy)
            .field("inter_item_delay_ms", &self.inter_item_delay_ms)
            .field("confirm_threshold", &self.confirm_threshold)
            .field("image_quality", &self.image_quality)
            .field("raster_scale", &self.raster_scale)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured inter-item pause as a [`Duration`].
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn policy(mut self, policy: ExportPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn inter_item_delay_ms(mut self, ms: u64) -> Self {
        self.config.inter_item_delay_ms = ms;
        self
    }

    pub fn confirm_threshold(mut self, n: usize) -> Self {
        self.config.confirm_threshold = n.max(1);
        self
    }

    pub fn image_quality(mut self, q: f32) -> Self {
        self.config.image_quality = q.clamp(0.1, 1.0);
        self
    }

    pub fn raster_scale(mut self, s: f32) -> Self {
        self.config.raster_scale = s.max(1.0);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, CertError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.image_quality) {
            return Err(CertError::InvalidConfig(format!(
                "image quality must be 0.0–1.0, got {}",
                c.image_quality
            )));
        }
        if c.raster_scale < 1.0 {
            return Err(CertError::InvalidConfig(format!(
                "raster scale must be ≥ 1, got {}",
                c.raster_scale
            )));
        }
        if c.inter_item_delay_ms > 60_000 {
            return Err(CertError::InvalidConfig(format!(
                "inter-item delay must be ≤ 60000 ms, got {}",
                c.inter_item_delay_ms
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_export_surface() {
        let c = ExportConfig::default();
        assert_eq!(c.policy, ExportPolicy::Sequential);
        assert_eq!(c.inter_item_delay_ms, 1000);
        assert_eq!(c.confirm_threshold, 5);
        assert_eq!(c.image_quality, 0.98);
        assert_eq!(c.raster_scale, 2.0);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ExportConfig::builder()
            .image_quality(7.0)
            .raster_scale(0.25)
            .confirm_threshold(0)
            .build()
            .unwrap();
        assert_eq!(c.image_quality, 1.0);
        assert_eq!(c.raster_scale, 1.0);
        assert_eq!(c.confirm_threshold, 1);
    }

    #[test]
    fn build_rejects_absurd_delay() {
        let err = ExportConfig::builder()
            .inter_item_delay_ms(120_000)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("delay"));
    }

    #[test]
    fn debug_elides_the_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;

        let c = ExportConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ExportProgressCallback>"));
    }
}
