//! Interactive element-picking session.
//!
//! One session owns the overlay UI, the current highlight, and the output
//! preferences the eventual capture will use. Hosts drive it with pointer
//! and key events; a click runs the full capture-and-dispatch flow and ends
//! the session after a feedback linger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::capture::{
    capture_element, dispatch,
    feedback::{self, FeedbackTone},
    CaptureDependencies, CaptureError, CaptureOptions, BackgroundMode, OutputResult,
    OutputTargets,
};
use crate::dom::{Document, NodeId};
use crate::messaging::{Notification, StopReason};
use crate::picker::overlay::{self, OverlayUi};

/// How long result feedback stays on screen before the session cleans up.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackLinger {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for FeedbackLinger {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(2),
            failure: Duration::from_secs(3),
        }
    }
}

impl FeedbackLinger {
    /// No linger at all, for tests.
    pub fn none() -> Self {
        Self {
            success: Duration::ZERO,
            failure: Duration::ZERO,
        }
    }
}

pub struct SelectorSession {
    active: bool,
    highlighted: Option<NodeId>,
    ui: Option<OverlayUi>,
    background: BackgroundMode,
    outputs: OutputTargets,
    deps: Arc<CaptureDependencies>,
    options: CaptureOptions,
    linger: FeedbackLinger,
    events: Option<mpsc::UnboundedSender<Notification>>,
}

impl SelectorSession {
    pub fn new(deps: Arc<CaptureDependencies>, options: CaptureOptions) -> Self {
        Self {
            active: false,
            highlighted: None,
            ui: None,
            background: BackgroundMode::default(),
            outputs: OutputTargets::both(),
            deps,
            options,
            linger: FeedbackLinger::default(),
            events: None,
        }
    }

    /// Notifications (session stopped, and why) go to this channel.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<Notification>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn with_linger(mut self, linger: FeedbackLinger) -> Self {
        self.linger = linger;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn clipboard_capabilities(&self) -> crate::capture::ClipboardCapabilities {
        self.deps.clipboard.capabilities()
    }

    /// Starts a picking session. Activating an already-active session is a
    /// no-op; the running session keeps its original settings.
    pub fn activate(&mut self, doc: &mut Document, background: BackgroundMode, outputs: OutputTargets) {
        if self.active {
            log::debug!("screenshot selector already active");
            return;
        }
        self.background = background;
        self.outputs = outputs;
        self.ui = Some(OverlayUi::install(doc));
        self.active = true;
        log::info!(
            "selector activated (background {background:?}, save {}, clipboard {})",
            outputs.save_to_file,
            outputs.copy_to_clipboard
        );
    }

    /// Pointer moved over `target`: transfer the highlight and re-annotate
    /// scrollable regions. Overlay nodes are ignored.
    pub fn pointer_over(&mut self, doc: &mut Document, target: NodeId) {
        if !self.active || overlay::is_within_overlay(doc, target) {
            return;
        }

        if let Some(previous) = self.highlighted.take() {
            overlay::unhighlight(doc, previous);
            overlay::remove_scrollable_indicators(doc);
        }

        overlay::highlight(doc, target);
        overlay::add_scrollable_indicators(doc, target);
        self.highlighted = Some(target);
    }

    /// Key event hook; Escape cancels the session.
    pub fn key_down(&mut self, doc: &mut Document, key: &str) {
        if key == "Escape" {
            self.cleanup(doc);
        }
    }

    /// Click on `target`: capture it, dispatch outputs, show feedback, and
    /// end the session. Clicks on the overlay are ignored. Returns what the
    /// dispatcher did, or `None` when nothing was captured.
    pub async fn click(&mut self, doc: &mut Document, target: NodeId) -> Option<OutputResult> {
        if !self.active || overlay::is_within_overlay(doc, target) {
            return None;
        }
        self.capture(doc, target).await
    }

    async fn capture(&mut self, doc: &mut Document, target: NodeId) -> Option<OutputResult> {
        let caps = self.deps.clipboard.capabilities();
        self.set_status(
            doc,
            feedback::working_message(self.outputs.copy_to_clipboard, &caps),
        );

        // Strip session chrome so it cannot leak into the capture. The click
        // target may differ from the last hovered node; both lose their
        // highlight here.
        if let Some(previous) = self.highlighted.take() {
            overlay::unhighlight(doc, previous);
        }
        overlay::unhighlight(doc, target);
        overlay::remove_scrollable_indicators(doc);

        match capture_element(doc, target, self.background, &self.deps, &self.options).await {
            Ok(image) => {
                let result = dispatch(image.as_ref(), self.outputs, &self.deps, &self.options).await;
                let (message, tone) = feedback::compose_result_message(self.outputs, &result);
                self.set_status(doc, &message);
                self.notify(StopReason::ScreenshotTaken);
                let linger = match tone {
                    FeedbackTone::Failure => self.linger.failure,
                    _ => self.linger.success,
                };
                self.linger_then_cleanup(doc, linger).await;
                Some(result)
            }
            Err(err) => {
                let kind = match err {
                    CaptureError::Render { kind, .. } => kind,
                    CaptureError::DetachedTarget => crate::capture::RenderFailureKind::Unknown,
                };
                self.set_status(doc, feedback::render_failure_message(kind));
                self.notify(StopReason::ScreenshotFailed);
                self.linger_then_cleanup(doc, self.linger.failure).await;
                None
            }
        }
    }

    fn set_status(&self, doc: &mut Document, message: &str) {
        if let Some(ui) = &self.ui {
            ui.set_status(doc, message);
        }
    }

    fn notify(&self, reason: StopReason) {
        if let Some(events) = &self.events {
            let _ = events.send(Notification::SelectorStopped { reason });
        }
    }

    async fn linger_then_cleanup(&mut self, doc: &mut Document, linger: Duration) {
        if !linger.is_zero() {
            tokio::time::sleep(linger).await;
        }
        self.cleanup(doc);
    }

    /// Tears down every session artifact. Safe to call repeatedly and on a
    /// session that never activated.
    pub fn cleanup(&mut self, doc: &mut Document) {
        if let Some(highlighted) = self.highlighted.take() {
            overlay::unhighlight(doc, highlighted);
        }
        overlay::remove_scrollable_indicators(doc);
        if let Some(ui) = self.ui.take() {
            ui.remove(doc);
        }
        self.active = false;
    }
}
