use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::capture::{
    clipboard::ClipboardCapabilities,
    dependencies::{
        CaptureDependencies, ClipboardItem, ClipboardSink, CloneHook, FileSaver, FontLoader,
        RasterImage, Rasterizer, RenderOptions,
    },
    raster::FlatRasterizer,
    types::{BackgroundMode, ClipboardResult, ClipboardWriteError, OutputTargets, RenderError},
    CaptureOptions,
};
use crate::dom::{Document, Geometry, NodeId};
use crate::messaging::{Notification, StopReason};
use crate::picker::{overlay, FeedbackLinger, SelectorSession, HIGHLIGHT_CLASS, INDICATOR_ATTR};

struct OkSink;

#[async_trait]
impl ClipboardSink for OkSink {
    fn capabilities(&self) -> ClipboardCapabilities {
        ClipboardCapabilities::available()
    }

    fn create_item(&self, png: Vec<u8>) -> Result<ClipboardItem, ClipboardWriteError> {
        Ok(ClipboardItem {
            mime: "image/png",
            bytes: png,
        })
    }

    async fn write(&self, _item: ClipboardItem) -> Result<(), ClipboardWriteError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct VecSaver {
    saved: Arc<Mutex<Vec<String>>>,
}

impl FileSaver for VecSaver {
    fn save(&self, _image_data: &[u8], filename: &str) -> std::io::Result<PathBuf> {
        self.saved.lock().unwrap().push(filename.to_string());
        Ok(PathBuf::from(filename))
    }
}

struct NoFonts;

#[async_trait]
impl FontLoader for NoFonts {
    async fn ready(&self) {}
    fn warm_glyph(&self, _family: &str) {}
}

struct ExplodingRasterizer;

#[async_trait]
impl Rasterizer for ExplodingRasterizer {
    async fn render(
        &self,
        _page: &Document,
        _target: NodeId,
        _options: &RenderOptions,
        _prepare: CloneHook<'_>,
    ) -> Result<Box<dyn RasterImage>, RenderError> {
        Err(RenderError::message("render pass exploded"))
    }
}

fn deps() -> (Arc<CaptureDependencies>, VecSaver) {
    let saver = VecSaver::default();
    let deps = CaptureDependencies {
        rasterizer: Arc::new(FlatRasterizer),
        clipboard: Arc::new(OkSink),
        saver: Arc::new(saver.clone()),
        fonts: Arc::new(NoFonts),
    };
    (Arc::new(deps), saver)
}

fn session(deps: Arc<CaptureDependencies>) -> SelectorSession {
    SelectorSession::new(deps, CaptureOptions::immediate()).with_linger(FeedbackLinger::none())
}

fn page() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let first = doc.create_element("div");
    doc.node_mut(first).geometry = Geometry {
        client_width: 100,
        client_height: 100,
        scroll_width: 100,
        scroll_height: 400,
        ..Geometry::default()
    };
    doc.append_child(doc.root(), first);
    let second = doc.create_element("p");
    doc.append_child(doc.root(), second);
    (doc, first, second)
}

#[test]
fn activation_is_idempotent() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, _, _) = page();

    session.activate(&mut doc, BackgroundMode::White, OutputTargets::both());
    assert!(session.is_active());
    let overlay_count = |doc: &Document| {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.node(n).id.as_deref() == Some(overlay::OVERLAY_ID))
            .count()
    };
    assert_eq!(overlay_count(&doc), 1);

    // Second activation changes nothing, including the requested settings.
    session.activate(
        &mut doc,
        BackgroundMode::Transparent,
        OutputTargets {
            save_to_file: false,
            copy_to_clipboard: false,
        },
    );
    assert!(session.is_active());
    assert_eq!(overlay_count(&doc), 1);
}

#[test]
fn hover_transfers_highlight_and_indicators() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, scrollable, plain) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.pointer_over(&mut doc, scrollable);
    assert!(doc.has_class(scrollable, HIGHLIGHT_CLASS));
    assert!(!doc.nodes_with_attribute(INDICATOR_ATTR).is_empty());

    session.pointer_over(&mut doc, plain);
    assert!(!doc.has_class(scrollable, HIGHLIGHT_CLASS));
    assert!(doc.has_class(plain, HIGHLIGHT_CLASS));
    // The plain element has no overflow, so the old indicators are gone and
    // no new ones appeared.
    assert!(doc.nodes_with_attribute(INDICATOR_ATTR).is_empty());
}

#[test]
fn hovering_the_overlay_is_ignored() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, scrollable, _) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.pointer_over(&mut doc, scrollable);
    let overlay_node = doc.find_by_id(overlay::OVERLAY_ID).unwrap();
    session.pointer_over(&mut doc, overlay_node);
    // Previous highlight survives an overlay hover.
    assert!(doc.has_class(scrollable, HIGHLIGHT_CLASS));
}

#[test]
fn escape_cancels_and_cleanup_is_idempotent() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, scrollable, _) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.pointer_over(&mut doc, scrollable);
    session.key_down(&mut doc, "Escape");

    assert!(!session.is_active());
    assert!(doc.find_by_id(overlay::OVERLAY_ID).is_none());
    assert!(!doc.has_class(scrollable, HIGHLIGHT_CLASS));
    assert!(doc.nodes_with_attribute(INDICATOR_ATTR).is_empty());

    // Cleaning up again (or a stray Escape) is harmless.
    session.cleanup(&mut doc);
    session.key_down(&mut doc, "Escape");
    assert!(!session.is_active());
}

#[test]
fn other_keys_do_not_cancel() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, _, _) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.key_down(&mut doc, "Enter");
    assert!(session.is_active());
}

#[tokio::test]
async fn click_captures_dispatches_and_stops() {
    let (deps, saver) = deps();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = session(deps).with_events(events_tx);
    let (mut doc, scrollable, _) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.pointer_over(&mut doc, scrollable);
    let result = session.click(&mut doc, scrollable).await.expect("capture result");

    assert!(result.download_performed);
    assert_eq!(result.clipboard, Some(ClipboardResult::Copied));
    assert_eq!(saver.saved.lock().unwrap().len(), 1);
    assert_eq!(
        events_rx.recv().await,
        Some(Notification::SelectorStopped {
            reason: StopReason::ScreenshotTaken,
        })
    );

    // Session tore itself down after the feedback linger.
    assert!(!session.is_active());
    assert!(doc.find_by_id(overlay::OVERLAY_ID).is_none());
    assert!(!doc.has_class(scrollable, HIGHLIGHT_CLASS));
}

#[tokio::test]
async fn click_away_from_hover_clears_both_highlights() {
    let (deps, _) = deps();
    let mut session = session(deps);
    let (mut doc, scrollable, plain) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    session.pointer_over(&mut doc, scrollable);
    assert!(doc.has_class(scrollable, HIGHLIGHT_CLASS));

    // Click lands on a node other than the last hovered one.
    session.click(&mut doc, plain).await.expect("capture result");

    assert!(!session.is_active());
    assert!(!doc.has_class(scrollable, HIGHLIGHT_CLASS));
    assert!(!doc.has_class(plain, HIGHLIGHT_CLASS));
    assert!(doc.nodes_with_attribute(INDICATOR_ATTR).is_empty());
}

#[tokio::test]
async fn render_failure_stops_with_failed_reason() {
    let (_, saver) = deps();
    let failing = CaptureDependencies {
        rasterizer: Arc::new(ExplodingRasterizer),
        clipboard: Arc::new(OkSink),
        saver: Arc::new(saver.clone()),
        fonts: Arc::new(NoFonts),
    };
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = session(Arc::new(failing)).with_events(events_tx);
    let (mut doc, scrollable, _) = page();

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    let result = session.click(&mut doc, scrollable).await;

    assert!(result.is_none());
    assert!(saver.saved.lock().unwrap().is_empty());
    assert_eq!(
        events_rx.recv().await,
        Some(Notification::SelectorStopped {
            reason: StopReason::ScreenshotFailed,
        })
    );
    assert!(!session.is_active());
    assert!(doc.find_by_id(overlay::OVERLAY_ID).is_none());
}

#[tokio::test]
async fn clicks_on_overlay_or_inactive_session_are_ignored() {
    let (deps, saver) = deps();
    let mut session = session(deps);
    let (mut doc, scrollable, _) = page();

    // Inactive session.
    assert!(session.click(&mut doc, scrollable).await.is_none());

    session.activate(&mut doc, BackgroundMode::Black, OutputTargets::both());
    let overlay_node = doc.find_by_id(overlay::OVERLAY_ID).unwrap();
    assert!(session.click(&mut doc, overlay_node).await.is_none());
    assert!(session.is_active());
    assert!(saver.saved.lock().unwrap().is_empty());
}
