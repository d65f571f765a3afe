//! Clipboard delivery workflow and the native clipboard sink.
//!
//! The delivery path is deliberately paranoid: every step is classified into
//! a closed error category and returned as data. Nothing in here propagates
//! an error to the caller; a clipboard failure must never break the save
//! path that runs alongside it.

use std::process::{Command, Stdio};

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::timeout;
use wl_clipboard_rs::copy::{MimeType, Options, ServeRequests, Source};

use super::dependencies::{ClipboardItem, ClipboardSink, RasterImage};
use super::orchestrator::CaptureOptions;
use super::types::{ClipboardErrorKind, ClipboardResult, ClipboardWriteError};

/// Largest PNG accepted for a clipboard write.
pub const MAX_CLIPBOARD_BYTES: u64 = 50 * 1024 * 1024;

/// Feature probes for the clipboard surface, evaluated in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardCapabilities {
    pub write_api: bool,
    pub image_item: bool,
    pub secure_context: bool,
    pub write_fn: bool,
}

impl ClipboardCapabilities {
    pub fn available() -> Self {
        Self {
            write_api: true,
            image_item: true,
            secure_context: true,
            write_fn: true,
        }
    }

    /// First failing probe, in the fixed order: API presence, image item
    /// support, secure context, write function. `None` means fully usable.
    pub fn missing_reason(&self) -> Option<&'static str> {
        if !self.write_api {
            Some("Clipboard API not available in this browser")
        } else if !self.image_item {
            Some("ClipboardItem not supported in this browser")
        } else if !self.secure_context {
            Some("Clipboard API requires a secure context (HTTPS)")
        } else if !self.write_fn {
            Some("Clipboard write functionality not available")
        } else {
            None
        }
    }
}

/// Availability report exposed to hosts (e.g. the `checkClipboardSupport`
/// request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardAvailability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn availability(caps: &ClipboardCapabilities) -> ClipboardAvailability {
    match caps.missing_reason() {
        None => ClipboardAvailability {
            available: true,
            reason: None,
        },
        Some(reason) => ClipboardAvailability {
            available: false,
            reason: Some(reason.to_string()),
        },
    }
}

/// Delivers a rendered capture to the clipboard.
///
/// Runs the full workflow: capability check, PNG conversion with timeout,
/// size validation, item creation, and the bounded write. Every failure is
/// folded into a [`ClipboardResult::Failed`] with a closed category.
pub async fn copy_image_to_clipboard(
    image: &dyn RasterImage,
    sink: &dyn ClipboardSink,
    options: &CaptureOptions,
) -> ClipboardResult {
    if let Some(reason) = sink.capabilities().missing_reason() {
        log::debug!("clipboard unavailable: {reason}");
        return ClipboardResult::Failed {
            kind: ClipboardErrorKind::ApiUnavailable,
            error: reason.to_string(),
        };
    }

    let png = match timeout(options.blob_timeout, image.to_png()).await {
        Err(_) => {
            return ClipboardResult::Failed {
                kind: ClipboardErrorKind::Timeout,
                error: "Clipboard operation timed out. The image may be too large.".to_string(),
            };
        }
        Ok(None) => {
            return ClipboardResult::Failed {
                kind: ClipboardErrorKind::CanvasConversion,
                error: "Failed to prepare image for clipboard. Try capturing a different area."
                    .to_string(),
            };
        }
        Ok(Some(png)) => png,
    };

    if png.len() as u64 > MAX_CLIPBOARD_BYTES {
        let megabytes = (png.len() as f64 / 1024.0 / 1024.0).round() as u64;
        return ClipboardResult::Failed {
            kind: ClipboardErrorKind::SizeLimit,
            error: format!(
                "Image too large for clipboard ({megabytes}MB). Try capturing a smaller area."
            ),
        };
    }

    let item = match sink.create_item(png) {
        Ok(item) => item,
        Err(err) => {
            log::warn!("clipboard item creation failed: {err}");
            return ClipboardResult::Failed {
                kind: ClipboardErrorKind::ClipboardItemCreation,
                error: "Failed to create clipboard item. Your browser may not support image \
                        clipboard operations."
                    .to_string(),
            };
        }
    };

    match timeout(options.write_timeout, sink.write(item)).await {
        Err(_) => ClipboardResult::Failed {
            kind: ClipboardErrorKind::Timeout,
            error: "Clipboard operation timed out. The image may be too large.".to_string(),
        },
        Ok(Err(err)) => classify_write_error(err),
        Ok(Ok(())) => {
            log::info!("screenshot copied to clipboard");
            ClipboardResult::Copied
        }
    }
}

/// Maps a platform fault onto the closed error categories, with the
/// user-facing message each category carries.
fn classify_write_error(err: ClipboardWriteError) -> ClipboardResult {
    let (kind, error) = match err {
        ClipboardWriteError::PermissionDenied => (
            ClipboardErrorKind::PermissionDenied,
            "Clipboard access denied. Please allow clipboard permissions in your browser settings."
                .to_string(),
        ),
        ClipboardWriteError::NotSupported => (
            ClipboardErrorKind::NotSupported,
            "Clipboard API not supported in this browser context.".to_string(),
        ),
        ClipboardWriteError::SecurityBlocked => (
            ClipboardErrorKind::SecurityError,
            "Clipboard access blocked by security policy. Try using HTTPS.".to_string(),
        ),
        ClipboardWriteError::NetworkFault => (
            ClipboardErrorKind::NetworkError,
            "Network error during clipboard operation. Please try again.".to_string(),
        ),
        ClipboardWriteError::QuotaExceeded => (
            ClipboardErrorKind::SizeLimit,
            "Clipboard storage quota exceeded. Try capturing a smaller image.".to_string(),
        ),
        ClipboardWriteError::InvalidState => (
            ClipboardErrorKind::InvalidState,
            "Clipboard is in an invalid state. Please try again.".to_string(),
        ),
        ClipboardWriteError::DataError => (
            ClipboardErrorKind::DataError,
            "Invalid image data for clipboard. Please try again.".to_string(),
        ),
        ClipboardWriteError::Other(message) => {
            if message.contains("timed out") {
                (
                    ClipboardErrorKind::Timeout,
                    "Clipboard operation timed out. The image may be too large.".to_string(),
                )
            } else if message.contains("canvas") || message.contains("blob") {
                (
                    ClipboardErrorKind::CanvasConversion,
                    "Failed to prepare image for clipboard. Try capturing a different area."
                        .to_string(),
                )
            } else if message.contains("quota") {
                (
                    ClipboardErrorKind::SizeLimit,
                    "Clipboard storage quota exceeded. Try capturing a smaller image.".to_string(),
                )
            } else {
                (
                    ClipboardErrorKind::Unexpected,
                    format!("Clipboard operation failed: {message}"),
                )
            }
        }
    };
    log::warn!("clipboard write failed ({kind}): {error}");
    ClipboardResult::Failed { kind, error }
}

/// Native clipboard sink backed by the Wayland clipboard.
pub struct SystemClipboard {
    wayland_available: bool,
    wl_copy_present: bool,
}

impl SystemClipboard {
    /// Probes the session environment once at construction.
    pub fn from_env() -> Self {
        let wayland_available = std::env::var_os("WAYLAND_DISPLAY").is_some();
        let wl_copy_present = Command::new("wl-copy")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();
        Self {
            wayland_available,
            wl_copy_present,
        }
    }
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        ClipboardCapabilities {
            write_api: self.wayland_available,
            image_item: true,
            // A local compositor session is as trusted as this gets.
            secure_context: true,
            write_fn: self.wayland_available || self.wl_copy_present,
        }
    }

    fn create_item(&self, png: Vec<u8>) -> Result<ClipboardItem, ClipboardWriteError> {
        if png.is_empty() {
            return Err(ClipboardWriteError::DataError);
        }
        Ok(ClipboardItem {
            mime: "image/png",
            bytes: png,
        })
    }

    async fn write(&self, item: ClipboardItem) -> Result<(), ClipboardWriteError> {
        let mime = item.mime.to_string();
        log::debug!(
            "Attempting to copy screenshot to clipboard ({} bytes)",
            item.bytes.len()
        );
        // The Wayland copy serves paste requests synchronously; keep it off
        // the async runtime threads.
        let result = tokio::task::spawn_blocking(move || {
            let mut opts = Options::new();
            // Serve one paste then exit so the data survives our process.
            opts.serve_requests(ServeRequests::Only(1));
            opts.copy(Source::Bytes(item.bytes.into()), MimeType::Specific(mime))
        })
        .await;

        match result {
            Ok(Ok(())) => {
                log::info!("Successfully copied to clipboard via wl-clipboard-rs");
                Ok(())
            }
            Ok(Err(err)) => Err(ClipboardWriteError::Other(format!(
                "wl-clipboard-rs error: {err}"
            ))),
            Err(join_err) => Err(ClipboardWriteError::Other(format!(
                "clipboard task failed: {join_err}"
            ))),
        }
    }
}
