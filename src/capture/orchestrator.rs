//! Capture orchestration: mutate, settle, render, restore.
//!
//! A capture temporarily rewrites the target's inline styles so clipped
//! content becomes visible, waits for fonts to settle, hands the document to
//! the rasterizer, and restores the exact prior inline styles whether or not
//! rendering succeeded.

use std::time::Duration;

use crate::capture::clone;
use crate::capture::dependencies::{CaptureDependencies, RasterImage, RenderOptions};
use crate::capture::types::{BackgroundMode, CaptureError};
use crate::dom::{Document, NodeId, StyleValue};

/// Icon font families that load glyphs lazily and need warming before a
/// render, matched by substring against computed `font-family` values.
const ICON_FONT_FAMILIES: &[&str] = &[
    "FontAwesome",
    "Font Awesome",
    "Font Awesome 5",
    "Font Awesome 6",
    "Material Icons",
    "Material Icons Outlined",
    "Material Icons Sharp",
    "Ionicons",
    "Feather",
    "Lucide",
    "Tabler Icons",
];

/// Inline style properties snapshotted before the capture mutates them.
const SNAPSHOT_PROPERTIES: &[&str] = &[
    "overflow",
    "overflow-y",
    "overflow-x",
    "height",
    "max-height",
    "position",
    "z-index",
];

/// Timing knobs for the capture pipeline. Tests shrink these to keep the
/// suite fast; production uses the defaults.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Extra settle time after fonts report ready.
    pub settle_delay: Duration,
    /// Bound on PNG conversion during clipboard delivery.
    pub blob_timeout: Duration,
    /// Bound on the platform clipboard write.
    pub write_timeout: Duration,
    /// How long the rasterizer may wait for external images.
    pub image_timeout: Duration,
    /// Render scale override; `None` uses the document's device pixel ratio.
    pub scale: Option<f32>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            blob_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(15),
            image_timeout: Duration::from_secs(15),
            scale: None,
        }
    }
}

impl CaptureOptions {
    /// Options with every delay and timeout collapsed, for tests.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            blob_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(15),
            image_timeout: Duration::from_secs(15),
            scale: None,
        }
    }
}

/// Snapshot of the target's inline styles taken before capture mutations.
#[derive(Debug)]
pub struct StyleSnapshot {
    target: NodeId,
    entries: Vec<(&'static str, Option<StyleValue>)>,
}

impl StyleSnapshot {
    pub fn take(doc: &Document, target: NodeId) -> Self {
        let entries = SNAPSHOT_PROPERTIES
            .iter()
            .map(|&prop| (prop, doc.inline_style(target, prop).cloned()))
            .collect();
        Self { target, entries }
    }

    /// Puts every snapshotted property back exactly, re-clearing properties
    /// that were absent before the capture.
    pub fn restore(self, doc: &mut Document) {
        for (prop, value) in self.entries {
            doc.set_or_clear_inline_style(self.target, prop, value);
        }
    }
}

/// Rewrites the target so its full scrollable content is visible: overflow
/// forced visible on all axes and height pinned to the scroll height.
fn expand_for_capture(doc: &mut Document, target: NodeId) {
    let scroll_height = doc.node(target).geometry.scroll_height;
    doc.set_inline_style(target, "overflow", StyleValue::new("visible"));
    doc.set_inline_style(target, "overflow-y", StyleValue::new("visible"));
    doc.set_inline_style(target, "overflow-x", StyleValue::new("visible"));
    doc.set_inline_style(target, "height", StyleValue::new(format!("{scroll_height}px")));
    doc.set_inline_style(target, "max-height", StyleValue::new("none"));
}

/// Waits for fonts to finish loading, warms icon fonts referenced anywhere
/// in the target subtree, then sleeps out the settle delay.
async fn settle_fonts(
    doc: &Document,
    target: NodeId,
    deps: &CaptureDependencies,
    options: &CaptureOptions,
) {
    deps.fonts.ready().await;

    for node in doc.descendants(target) {
        let Some(family) = doc.computed_style(node, "font-family") else {
            continue;
        };
        for icon_font in ICON_FONT_FAMILIES {
            if family.contains(icon_font) {
                deps.fonts.warm_glyph(icon_font);
            }
        }
    }

    if !options.settle_delay.is_zero() {
        tokio::time::sleep(options.settle_delay).await;
    }
}

/// Captures `target` as an image.
///
/// The target's inline styles are restored on both the success and failure
/// paths; a failed render never leaves the document mutated. Render failures
/// come back classified as [`CaptureError::Render`].
pub async fn capture_element(
    doc: &mut Document,
    target: NodeId,
    background: BackgroundMode,
    deps: &CaptureDependencies,
    options: &CaptureOptions,
) -> Result<Box<dyn RasterImage>, CaptureError> {
    if !doc.is_attached(target) {
        return Err(CaptureError::DetachedTarget);
    }

    let snapshot = StyleSnapshot::take(doc, target);
    expand_for_capture(doc, target);
    settle_fonts(doc, target, deps, options).await;

    let render_options = RenderOptions {
        use_cors: true,
        allow_taint: false,
        background: background.css_color(),
        scale: options.scale.unwrap_or_else(|| doc.device_pixel_ratio()),
        image_timeout: options.image_timeout,
    };

    let result = {
        let original: &Document = doc;
        let hook = |clone_doc: &mut Document, clone_target: NodeId| {
            clone::prepare_cloned_document(original, target, clone_doc, clone_target);
        };
        deps.rasterizer
            .render(original, target, &render_options, &hook)
            .await
    };

    snapshot.restore(doc);

    result.map_err(|err| {
        let kind = err.classify();
        log::error!("screenshot render failed ({kind:?}): {}", err.message);
        CaptureError::Render {
            kind,
            message: err.message,
        }
    })
}
