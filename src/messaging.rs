//! Host messaging: JSON requests, responses, and session notifications.
//!
//! Hosts drive the engine with action-tagged JSON messages and receive
//! action-tagged notifications back, so an embedding UI can stay a thin
//! translation layer.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::capture::clipboard::{self, ClipboardAvailability};
use crate::capture::feedback::{self, SupportFeedback};
use crate::capture::{BackgroundMode, OutputTargets};
use crate::dom::Document;
use crate::picker::SelectorSession;

fn default_true() -> bool {
    true
}

/// Incoming host request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Begin a picking session with the given output preferences.
    #[serde(rename_all = "camelCase")]
    StartSelector {
        #[serde(default)]
        background: BackgroundMode,
        #[serde(default = "default_true")]
        copy_to_clipboard: bool,
        #[serde(default = "default_true")]
        save_to_pc: bool,
    },
    /// Cancel any running session.
    StopSelector,
    /// Query whether a session is running.
    CheckState,
    /// Query clipboard availability plus user-facing feedback.
    CheckClipboardSupport,
    /// Keyboard-shortcut activation: starts a session with defaults, no-op
    /// when one is already running.
    ActivateFromShortcut,
}

impl Request {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Why a session ended, carried by [`Notification::SelectorStopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    #[serde(rename = "screenshot-taken")]
    ScreenshotTaken,
    #[serde(rename = "screenshot-failed")]
    ScreenshotFailed,
}

/// Outbound notification pushed to the host, tagged like requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    SelectorStopped { reason: StopReason },
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack {
        success: bool,
    },
    State {
        #[serde(rename = "isActive")]
        is_active: bool,
    },
    ClipboardSupport {
        availability: ClipboardAvailability,
        feedback: SupportFeedback,
    },
    Error {
        error: String,
    },
}

/// Parses and executes a raw JSON request against the session.
///
/// Malformed or unknown actions come back as [`Response::Error`] rather than
/// an `Err`; the messaging surface never propagates faults to the transport.
pub fn handle_raw_request(
    session: &mut SelectorSession,
    doc: &mut Document,
    raw: &str,
) -> Response {
    match Request::parse(raw) {
        Ok(request) => handle_request(session, doc, request),
        Err(err) => {
            let action = serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|v| v.get("action").cloned())
                .unwrap_or_else(|| json!(null));
            log::warn!("rejected request (action {action}): {err}");
            Response::Error {
                error: format!("Unknown action: {action}"),
            }
        }
    }
}

/// Executes a request against the session and document.
pub fn handle_request(
    session: &mut SelectorSession,
    doc: &mut Document,
    request: Request,
) -> Response {
    match request {
        Request::StartSelector {
            background,
            copy_to_clipboard,
            save_to_pc,
        } => {
            session.activate(
                doc,
                background,
                OutputTargets {
                    save_to_file: save_to_pc,
                    copy_to_clipboard,
                },
            );
            Response::Ack { success: true }
        }
        Request::StopSelector => {
            session.cleanup(doc);
            Response::Ack { success: true }
        }
        Request::CheckState => Response::State {
            is_active: session.is_active(),
        },
        Request::CheckClipboardSupport => {
            let caps = session.clipboard_capabilities();
            Response::ClipboardSupport {
                availability: clipboard::availability(&caps),
                feedback: feedback::support_feedback(&caps),
            }
        }
        Request::ActivateFromShortcut => {
            session.activate(doc, BackgroundMode::default(), OutputTargets::both());
            Response::Ack { success: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureDependencies, CaptureOptions};
    use std::sync::Arc;

    fn session() -> SelectorSession {
        SelectorSession::new(Arc::new(CaptureDependencies::default()), CaptureOptions::immediate())
    }

    #[test]
    fn start_selector_parses_with_defaults() {
        let request = Request::parse(r#"{"action":"startSelector"}"#).unwrap();
        assert_eq!(
            request,
            Request::StartSelector {
                background: BackgroundMode::Black,
                copy_to_clipboard: true,
                save_to_pc: true,
            }
        );
    }

    #[test]
    fn start_selector_honors_explicit_fields() {
        let request = Request::parse(
            r#"{"action":"startSelector","background":"transparent","copyToClipboard":false,"saveToPc":true}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::StartSelector {
                background: BackgroundMode::Transparent,
                copy_to_clipboard: false,
                save_to_pc: true,
            }
        );
    }

    #[test]
    fn camel_case_action_tags() {
        assert_eq!(
            Request::parse(r#"{"action":"checkClipboardSupport"}"#).unwrap(),
            Request::CheckClipboardSupport
        );
        assert_eq!(
            Request::parse(r#"{"action":"activateFromShortcut"}"#).unwrap(),
            Request::ActivateFromShortcut
        );
    }

    #[test]
    fn unknown_action_becomes_error_response() {
        let mut session = session();
        let mut doc = Document::new();
        let response = handle_raw_request(&mut session, &mut doc, r#"{"action":"selfDestruct"}"#);
        assert_eq!(
            response,
            Response::Error {
                error: "Unknown action: \"selfDestruct\"".to_string(),
            }
        );
    }

    #[test]
    fn start_and_stop_drive_session_state() {
        let mut session = session();
        let mut doc = Document::new();

        let response = handle_raw_request(&mut session, &mut doc, r#"{"action":"checkState"}"#);
        assert_eq!(response, Response::State { is_active: false });

        handle_raw_request(&mut session, &mut doc, r#"{"action":"startSelector"}"#);
        assert!(session.is_active());

        let response = handle_raw_request(&mut session, &mut doc, r#"{"action":"stopSelector"}"#);
        assert_eq!(response, Response::Ack { success: true });
        assert!(!session.is_active());
    }

    #[test]
    fn shortcut_activation_is_idempotent() {
        let mut session = session();
        let mut doc = Document::new();
        handle_raw_request(&mut session, &mut doc, r#"{"action":"activateFromShortcut"}"#);
        handle_raw_request(&mut session, &mut doc, r#"{"action":"activateFromShortcut"}"#);
        assert!(session.is_active());
    }

    #[test]
    fn stop_notification_wire_format() {
        let json = serde_json::to_string(&Notification::SelectorStopped {
            reason: StopReason::ScreenshotTaken,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"action":"selectorStopped","reason":"screenshot-taken"}"#
        );
    }
}
