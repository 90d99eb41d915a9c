//! Pipeline stages for certificate generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the rasterization engine) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! parse ──▶ render ──▶ rasterize
//! (names)   (HTML tree)  (PDF bytes)
//! ```
//!
//! 1. [`parse`]     — split and clean the raw recipient text into names
//! 2. [`render`]    — populate the fixed certificate template for one name,
//!    in preview or print mode
//! 3. [`rasterize`] — lay the print document out as A4-landscape PDF bytes;
//!    runs in `spawn_blocking` because the engine is CPU-bound

pub mod parse;
pub mod render;
pub mod rasterize;
