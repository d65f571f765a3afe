//! File saving functionality for captured screenshots.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use super::dependencies::FileSaver;

/// Generate a screenshot filename for the given instant.
///
/// The name embeds a second-resolution UTC timestamp with colons replaced so
/// it is valid on every filesystem, e.g. `screenshot-2024-03-05T10-30-00.png`.
pub fn screenshot_filename(instant: DateTime<Utc>) -> String {
    format!("screenshot-{}.png", instant.format("%Y-%m-%dT%H-%M-%S"))
}

/// Filename for a capture taken right now.
pub fn default_filename() -> String {
    screenshot_filename(Utc::now())
}

/// Ensure the save directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> std::io::Result<()> {
    if !directory.exists() {
        log::info!("Creating screenshot directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(())
}

/// Saves captures into the user's downloads folder (or a configured override).
pub struct DownloadsSaver {
    pub directory: PathBuf,
}

impl DownloadsSaver {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

impl Default for DownloadsSaver {
    fn default() -> Self {
        Self {
            directory: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl FileSaver for DownloadsSaver {
    fn save(&self, image_data: &[u8], filename: &str) -> std::io::Result<PathBuf> {
        ensure_directory_exists(&self.directory)?;
        let path = self.directory.join(filename);
        fs::write(&path, image_data)?;
        log::info!("Screenshot saved to: {}", path.display());
        Ok(path)
    }
}
