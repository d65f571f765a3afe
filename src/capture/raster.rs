//! Built-in rasterizer and bitmap type.
//!
//! Real deployments plug a full renderer into the [`Rasterizer`] seam. The
//! built-in [`FlatRasterizer`] honors the rendering contract (clone, prepare
//! hook, background fill, scale) but paints only the background color over
//! the target's full scroll extent, which is enough for the CLI and for
//! exercising the pipeline end to end.

use async_trait::async_trait;
use base64::Engine as _;
use image::{ImageEncoder, Rgba, RgbaImage};

use crate::capture::dependencies::{CloneHook, RasterImage, Rasterizer, RenderOptions};
use crate::capture::types::RenderError;
use crate::dom::{Document, NodeId};

/// Bitmap backed by the `image` crate.
pub struct PixelImage {
    pixels: RgbaImage,
}

impl PixelImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}

#[async_trait]
impl RasterImage for PixelImage {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    async fn to_png(&self) -> Option<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder
            .write_image(
                self.pixels.as_raw(),
                self.pixels.width(),
                self.pixels.height(),
                image::ExtendedColorType::Rgba8,
            )
            .ok()?;
        Some(buf)
    }
}

/// Encodes an image as a `data:image/png;base64,` URI.
pub async fn to_data_uri(image: &dyn RasterImage) -> Option<String> {
    let png = image.to_png().await?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Some(format!("data:image/png;base64,{encoded}"))
}

fn parse_hex_color(color: &str) -> Rgba<u8> {
    let hex = color.trim_start_matches('#');
    let parse = |range| u8::from_str_radix(hex.get(range).unwrap_or("00"), 16).unwrap_or(0);
    Rgba([parse(0..2), parse(2..4), parse(4..6), 255])
}

/// Background-fill rasterizer used when no real renderer is plugged in.
pub struct FlatRasterizer;

#[async_trait]
impl Rasterizer for FlatRasterizer {
    async fn render(
        &self,
        page: &Document,
        target: NodeId,
        options: &RenderOptions,
        prepare: CloneHook<'_>,
    ) -> Result<Box<dyn RasterImage>, RenderError> {
        if !page.is_attached(target) {
            return Err(RenderError::message("render target is detached"));
        }

        let mut clone = page.clone();
        prepare(&mut clone, target);

        let geometry = clone.node(target).geometry;
        let width = geometry.scroll_width.max(geometry.client_width).max(1);
        let height = geometry.scroll_height.max(geometry.client_height).max(1);
        let scale = options.scale.max(0.1);
        let out_w = ((width as f32) * scale).round().max(1.0) as u32;
        let out_h = ((height as f32) * scale).round().max(1.0) as u32;

        let fill = match options.background {
            Some(color) => parse_hex_color(color),
            None => Rgba([0, 0, 0, 0]),
        };

        log::debug!("rasterizing {out_w}x{out_h} (scale {scale})");
        let pixels = RgbaImage::from_pixel(out_w, out_h, fill);
        Ok(Box::new(PixelImage::new(pixels)))
    }
}
