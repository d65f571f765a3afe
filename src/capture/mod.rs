//! Element capture pipeline.
//!
//! This module turns a picked document node into an exported image:
//! - Style mutation, font settling, and rendering via the rasterizer seam
//! - Clone preparation so the render matches the live page
//! - Output dispatch to file and clipboard sinks
//! - Closed-category clipboard error classification and user feedback

pub mod clipboard;
pub mod clone;
pub mod dependencies;
pub mod dispatch;
pub mod feedback;
pub mod file;
pub mod orchestrator;
pub mod raster;
pub mod types;


pub use clipboard::{ClipboardAvailability, ClipboardCapabilities, MAX_CLIPBOARD_BYTES};
pub use dependencies::{CaptureDependencies, RasterImage, Rasterizer};
pub use dispatch::dispatch;
pub use orchestrator::{capture_element, CaptureOptions};
pub use types::{
    BackgroundMode, CaptureError, ClipboardErrorKind, ClipboardResult, OutputResult,
    OutputTargets, RenderFailureKind,
};
