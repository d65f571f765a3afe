//! User-facing feedback strings for capture outcomes.

use serde::Serialize;

use super::clipboard::ClipboardCapabilities;
use super::types::{ClipboardErrorKind, ClipboardResult, OutputResult, OutputTargets, RenderFailureKind};

/// Severity of a feedback message, used by hosts to pick styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
    Success,
    Partial,
    Failure,
    Neutral,
}

/// Contextual message for a clipboard failure category.
pub fn clipboard_error_message(kind: ClipboardErrorKind) -> &'static str {
    match kind {
        ClipboardErrorKind::PermissionDenied => {
            "Clipboard copy failed: Permission denied. Please allow clipboard access in your browser settings."
        }
        ClipboardErrorKind::NotSupported | ClipboardErrorKind::ApiUnavailable => {
            "Clipboard copy not available in this browser. Screenshot was still downloaded."
        }
        ClipboardErrorKind::SecurityError => {
            "Clipboard copy blocked by browser security. Try using HTTPS or check site permissions."
        }
        ClipboardErrorKind::SizeLimit => {
            "Clipboard copy failed: Image too large. Try capturing a smaller area."
        }
        ClipboardErrorKind::Timeout => {
            "Clipboard copy timed out. The image may be too large or complex."
        }
        ClipboardErrorKind::NetworkError => {
            "Clipboard copy failed due to network error. Please try again."
        }
        ClipboardErrorKind::CanvasConversion => {
            "Clipboard copy failed: Unable to prepare image. Try capturing a different element."
        }
        ClipboardErrorKind::ClipboardItemCreation => {
            "Clipboard copy not supported: Your browser doesn't support image clipboard operations."
        }
        ClipboardErrorKind::InvalidState => {
            "Clipboard copy failed: Browser clipboard is busy. Please try again."
        }
        ClipboardErrorKind::DataError => {
            "Clipboard copy failed: Invalid image data. Please try capturing again."
        }
        ClipboardErrorKind::Unexpected => {
            "Clipboard copy failed due to unexpected error. Screenshot was still downloaded."
        }
    }
}

/// Feature-availability feedback shown before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportFeedback {
    pub supported: bool,
    pub message: &'static str,
}

/// Explains clipboard availability in user terms, always noting that file
/// saving keeps working without it.
pub fn support_feedback(caps: &ClipboardCapabilities) -> SupportFeedback {
    let Some(reason) = caps.missing_reason() else {
        return SupportFeedback {
            supported: true,
            message: "Clipboard copying is available and ready to use.",
        };
    };

    let message = if reason.contains("not available") || reason.contains("not supported") {
        "Your browser doesn't support clipboard copying. Screenshots will still be downloaded."
    } else if reason.contains("secure context") {
        "Clipboard copying requires HTTPS. Screenshots will still be downloaded."
    } else if reason.contains("write functionality") {
        "Clipboard writing is not available. Screenshots will still be downloaded."
    } else {
        "Clipboard copying is not available. Screenshots will still be downloaded."
    };
    SupportFeedback {
        supported: false,
        message,
    }
}

/// Status line shown while a capture is in flight.
pub fn working_message(clipboard_requested: bool, caps: &ClipboardCapabilities) -> &'static str {
    if !clipboard_requested {
        return "Capturing screenshot...";
    }
    if caps.missing_reason().is_none() {
        "Capturing screenshot and preparing for clipboard..."
    } else {
        "Capturing screenshot... (Clipboard not available)"
    }
}

/// User message for a failed render.
pub fn render_failure_message(kind: RenderFailureKind) -> &'static str {
    match kind {
        RenderFailureKind::Rendering => {
            "Screenshot rendering failed. Try selecting a different element or refresh the page."
        }
        RenderFailureKind::Timeout => {
            "Screenshot capture timed out. Try selecting a smaller area or simpler element."
        }
        RenderFailureKind::SecurityBlocked => {
            "Screenshot failed: Some content is blocked by security restrictions."
        }
        RenderFailureKind::Memory => {
            "Screenshot failed: Not enough memory. Try capturing a smaller area."
        }
        RenderFailureKind::Canvas => {
            "Screenshot failed: Unable to create image. Try a different element."
        }
        RenderFailureKind::Unknown => "Screenshot capture failed. Please try again.",
    }
}

/// Composes the end-of-capture message from what the dispatcher actually did.
pub fn compose_result_message(
    targets: OutputTargets,
    result: &OutputResult,
) -> (String, FeedbackTone) {
    match (targets.save_to_file, &result.clipboard) {
        (false, None) => (
            "Capture completed (no output method selected).".to_string(),
            FeedbackTone::Neutral,
        ),
        (true, None) => (
            "Screenshot downloaded successfully!".to_string(),
            FeedbackTone::Success,
        ),
        (true, Some(ClipboardResult::Copied)) => (
            "Screenshot downloaded and copied to clipboard!".to_string(),
            FeedbackTone::Success,
        ),
        (true, Some(ClipboardResult::Failed { kind, .. })) => (
            format!(
                "Screenshot downloaded successfully! {}",
                clipboard_error_message(*kind)
            ),
            FeedbackTone::Partial,
        ),
        (false, Some(ClipboardResult::Copied)) => (
            "Screenshot copied to clipboard!".to_string(),
            FeedbackTone::Success,
        ),
        (false, Some(ClipboardResult::Failed { kind, .. })) => (
            format!(
                "Screenshot capture failed. Clipboard copy could not be completed. {}",
                clipboard_error_message(*kind)
            ),
            FeedbackTone::Failure,
        ),
    }
}
