//! Output dispatch: routes a rendered capture to its requested sinks.

use crate::capture::clipboard;
use crate::capture::dependencies::{CaptureDependencies, RasterImage};
use crate::capture::file;
use crate::capture::orchestrator::CaptureOptions;
use crate::capture::types::{OutputResult, OutputTargets};

/// Delivers a rendered capture to the requested outputs.
///
/// The file save runs first and is fire-and-forget: a failing disk write is
/// logged, never raised. The clipboard attempt runs after it and reports its
/// outcome as data. With both targets disabled this is a no-op that still
/// returns a well-formed result.
pub async fn dispatch(
    image: &dyn RasterImage,
    targets: OutputTargets,
    deps: &CaptureDependencies,
    options: &CaptureOptions,
) -> OutputResult {
    let mut download_performed = false;

    if targets.save_to_file {
        match image.to_png().await {
            Some(png) => {
                let filename = file::default_filename();
                download_performed = true;
                if let Err(err) = deps.saver.save(&png, &filename) {
                    log::warn!("screenshot download could not be completed: {err}");
                }
            }
            None => {
                log::error!("screenshot download skipped: image could not be encoded");
            }
        }
    }

    let clipboard = if targets.copy_to_clipboard {
        Some(clipboard::copy_image_to_clipboard(image, deps.clipboard.as_ref(), options).await)
    } else {
        None
    };

    OutputResult {
        download_performed,
        clipboard,
    }
}
