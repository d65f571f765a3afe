//! Shared types for the capture pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Background fill painted behind transparent regions of the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    Black,
    White,
    Transparent,
}

impl BackgroundMode {
    /// CSS color handed to the rasterizer; `None` keeps transparency.
    pub fn css_color(self) -> Option<&'static str> {
        match self {
            BackgroundMode::Black => Some("#000000"),
            BackgroundMode::White => Some("#ffffff"),
            BackgroundMode::Transparent => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "black" => Some(BackgroundMode::Black),
            "white" => Some(BackgroundMode::White),
            "transparent" => Some(BackgroundMode::Transparent),
            _ => None,
        }
    }
}

/// Which sinks a capture should be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTargets {
    pub save_to_file: bool,
    pub copy_to_clipboard: bool,
}

impl OutputTargets {
    pub fn both() -> Self {
        Self {
            save_to_file: true,
            copy_to_clipboard: true,
        }
    }

    pub fn any(self) -> bool {
        self.save_to_file || self.copy_to_clipboard
    }
}

impl Default for OutputTargets {
    fn default() -> Self {
        Self::both()
    }
}

/// Closed set of clipboard failure categories surfaced to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardErrorKind {
    ApiUnavailable,
    PermissionDenied,
    NotSupported,
    SecurityError,
    SizeLimit,
    Timeout,
    CanvasConversion,
    ClipboardItemCreation,
    InvalidState,
    DataError,
    NetworkError,
    Unexpected,
}

impl std::fmt::Display for ClipboardErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClipboardErrorKind::ApiUnavailable => "api_unavailable",
            ClipboardErrorKind::PermissionDenied => "permission_denied",
            ClipboardErrorKind::NotSupported => "not_supported",
            ClipboardErrorKind::SecurityError => "security_error",
            ClipboardErrorKind::SizeLimit => "size_limit",
            ClipboardErrorKind::Timeout => "timeout",
            ClipboardErrorKind::CanvasConversion => "canvas_conversion",
            ClipboardErrorKind::ClipboardItemCreation => "clipboard_item_creation",
            ClipboardErrorKind::InvalidState => "invalid_state",
            ClipboardErrorKind::DataError => "data_error",
            ClipboardErrorKind::NetworkError => "network_error",
            ClipboardErrorKind::Unexpected => "unexpected",
        };
        f.write_str(s)
    }
}

/// Outcome of a clipboard delivery attempt. Failures are data, not errors;
/// the dispatcher never propagates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClipboardResult {
    Copied,
    Failed {
        kind: ClipboardErrorKind,
        error: String,
    },
}

impl ClipboardResult {
    pub fn is_copied(&self) -> bool {
        matches!(self, ClipboardResult::Copied)
    }
}

/// What the output dispatcher actually did with a rendered capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputResult {
    pub download_performed: bool,
    /// `None` when clipboard delivery was not requested.
    pub clipboard: Option<ClipboardResult>,
}

/// Categories of rendering failure, derived from the rasterizer's report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFailureKind {
    Rendering,
    Timeout,
    SecurityBlocked,
    Memory,
    Canvas,
    Unknown,
}

/// Failure report from the rasterizer seam.
///
/// Rasterizers that know their failure category tag it explicitly; untagged
/// reports are classified from the message text at this boundary only.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    pub kind: Option<RenderFailureKind>,
    pub message: String,
}

impl RenderError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    pub fn tagged(kind: RenderFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// Resolves the failure category, falling back to message sniffing for
    /// untagged reports.
    pub fn classify(&self) -> RenderFailureKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        let msg = self.message.to_lowercase();
        if msg.contains("timeout") || msg.contains("timed out") {
            RenderFailureKind::Timeout
        } else if msg.contains("network") || msg.contains("cors") {
            RenderFailureKind::SecurityBlocked
        } else if msg.contains("memory") || msg.contains("quota") {
            RenderFailureKind::Memory
        } else if msg.contains("render") {
            RenderFailureKind::Rendering
        } else if msg.contains("canvas") {
            RenderFailureKind::Canvas
        } else {
            RenderFailureKind::Unknown
        }
    }
}

/// Errors the capture orchestrator can surface to callers.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("rendering failed ({kind:?}): {message}")]
    Render {
        kind: RenderFailureKind,
        message: String,
    },
    #[error("capture target is no longer attached to the document")]
    DetachedTarget,
}

/// Platform-level clipboard fault reported by a [`ClipboardSink`].
///
/// [`ClipboardSink`]: crate::capture::dependencies::ClipboardSink
#[derive(Debug, Clone, Error)]
pub enum ClipboardWriteError {
    #[error("clipboard access denied")]
    PermissionDenied,
    #[error("clipboard operation not supported")]
    NotSupported,
    #[error("clipboard access blocked by security policy")]
    SecurityBlocked,
    #[error("network error during clipboard operation")]
    NetworkFault,
    #[error("clipboard storage quota exceeded")]
    QuotaExceeded,
    #[error("clipboard is in an invalid state")]
    InvalidState,
    #[error("invalid clipboard data")]
    DataError,
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_css_colors() {
        assert_eq!(BackgroundMode::Black.css_color(), Some("#000000"));
        assert_eq!(BackgroundMode::White.css_color(), Some("#ffffff"));
        assert_eq!(BackgroundMode::Transparent.css_color(), None);
    }

    #[test]
    fn background_parse_rejects_unknown() {
        assert_eq!(BackgroundMode::parse("white"), Some(BackgroundMode::White));
        assert_eq!(BackgroundMode::parse("plaid"), None);
    }

    #[test]
    fn untagged_render_errors_classify_from_message() {
        assert_eq!(
            RenderError::message("image load timed out").classify(),
            RenderFailureKind::Timeout
        );
        assert_eq!(
            RenderError::message("blocked by CORS policy").classify(),
            RenderFailureKind::SecurityBlocked
        );
        assert_eq!(
            RenderError::message("out of memory").classify(),
            RenderFailureKind::Memory
        );
        assert_eq!(
            RenderError::message("canvas export rejected").classify(),
            RenderFailureKind::Canvas
        );
        assert_eq!(
            RenderError::message("something odd").classify(),
            RenderFailureKind::Unknown
        );
    }

    #[test]
    fn tagged_render_errors_skip_sniffing() {
        let err = RenderError::tagged(RenderFailureKind::Memory, "canvas timed out");
        assert_eq!(err.classify(), RenderFailureKind::Memory);
    }

    #[test]
    fn error_kind_wire_names() {
        assert_eq!(
            ClipboardErrorKind::ClipboardItemCreation.to_string(),
            "clipboard_item_creation"
        );
        assert_eq!(
            ClipboardErrorKind::ApiUnavailable.to_string(),
            "api_unavailable"
        );
    }
}
