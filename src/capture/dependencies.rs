//! Trait seams for the capture pipeline's external collaborators.
//!
//! The orchestrator and dispatcher only ever talk to these traits; native
//! implementations live in sibling modules and tests substitute mocks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::capture::{
    clipboard::{self, ClipboardCapabilities},
    file,
    raster,
    types::{ClipboardWriteError, RenderError},
};
use crate::dom::{Document, NodeId};

/// Options forwarded to the rasterizer for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub use_cors: bool,
    pub allow_taint: bool,
    /// Background fill, or `None` to keep transparency.
    pub background: Option<&'static str>,
    /// Output scale factor, typically the device pixel ratio.
    pub scale: f32,
    /// How long the rasterizer may wait for external images.
    pub image_timeout: Duration,
}

/// Hook invoked on the rasterizer's cloned document before painting. The
/// arguments are the clone and the target's counterpart inside it.
pub type CloneHook<'a> = &'a (dyn Fn(&mut Document, NodeId) + Send + Sync);

/// Black-box renderer turning a document subtree into pixels.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Renders `target` within `page`. Implementations must clone the
    /// document, run `prepare` on the clone, and paint from the clone so the
    /// live tree is never disturbed.
    async fn render(
        &self,
        page: &Document,
        target: NodeId,
        options: &RenderOptions,
        prepare: CloneHook<'_>,
    ) -> Result<Box<dyn RasterImage>, RenderError>;
}

/// Rendered bitmap produced by a [`Rasterizer`].
#[async_trait]
pub trait RasterImage: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Encodes the image as PNG. `None` means the conversion failed, which
    /// the clipboard workflow reports as a conversion error rather than a
    /// panic or a propagated fault.
    async fn to_png(&self) -> Option<Vec<u8>>;
}

/// PNG payload staged for a clipboard write.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Platform clipboard behind the dispatcher's delivery workflow.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Reports which parts of the clipboard surface are usable. Checked
    /// before every delivery attempt; results are never cached.
    fn capabilities(&self) -> ClipboardCapabilities;

    /// Packages encoded PNG bytes into a writable item.
    fn create_item(&self, png: Vec<u8>) -> Result<ClipboardItem, ClipboardWriteError>;

    async fn write(&self, item: ClipboardItem) -> Result<(), ClipboardWriteError>;
}

/// Abstraction over saving an encoded capture to disk.
pub trait FileSaver: Send + Sync {
    fn save(&self, image_data: &[u8], filename: &str) -> std::io::Result<PathBuf>;
}

/// Font subsystem consulted during the pre-render settle phase.
#[async_trait]
pub trait FontLoader: Send + Sync {
    /// Resolves once declared fonts have finished loading. Implementations
    /// must not fail; an unavailable font API resolves immediately.
    async fn ready(&self);

    /// Forces a glyph from the named family to be rasterized at least once,
    /// warming lazily-loaded icon fonts.
    fn warm_glyph(&self, family: &str);
}

/// Bundle of dependencies used by the capture pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub saver: Arc<dyn FileSaver>,
    pub fonts: Arc<dyn FontLoader>,
}

impl Default for CaptureDependencies {
    fn default() -> Self {
        Self {
            rasterizer: Arc::new(raster::FlatRasterizer),
            clipboard: Arc::new(clipboard::SystemClipboard::from_env()),
            saver: Arc::new(file::DownloadsSaver::default()),
            fonts: Arc::new(SettledFonts),
        }
    }
}

/// Font loader for headless use: nothing loads lazily, so `ready` resolves
/// immediately and glyph warming is a no-op.
struct SettledFonts;

#[async_trait]
impl FontLoader for SettledFonts {
    async fn ready(&self) {}

    fn warm_glyph(&self, family: &str) {
        log::trace!("glyph warm requested for '{family}' (fonts already settled)");
    }
}
