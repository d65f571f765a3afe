//! Persistent user preferences.
//!
//! Stored as TOML under the user config directory. Every field has a
//! default, so a missing file or a partial file both load cleanly, and
//! writes persist the full current state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::capture::{BackgroundMode, OutputTargets};

fn default_true() -> bool {
    true
}

/// User preferences governing new capture sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub background_preference: BackgroundMode,
    #[serde(default = "default_true")]
    pub copy_to_clipboard: bool,
    #[serde(default = "default_true")]
    pub save_to_pc: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            background_preference: BackgroundMode::Black,
            copy_to_clipboard: true,
            save_to_pc: true,
        }
    }
}

impl Preferences {
    /// At least one output method must stay enabled for a capture to have
    /// an effect; hosts surface a validation error when this is false.
    pub fn has_output_method(&self) -> bool {
        self.copy_to_clipboard || self.save_to_pc
    }

    pub fn output_targets(&self) -> OutputTargets {
        OutputTargets {
            save_to_file: self.save_to_pc,
            copy_to_clipboard: self.copy_to_clipboard,
        }
    }
}

/// Default config file location (`~/.config/elemshot/config.toml`).
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("elemshot").join("config.toml"))
}

/// Loads preferences from the default location, falling back to defaults
/// when no file exists yet.
pub fn load() -> Result<Preferences> {
    let Some(path) = config_path() else {
        log::debug!("no config directory available, using default preferences");
        return Ok(Preferences::default());
    };
    if !path.exists() {
        log::debug!("no config file at {}, using default preferences", path.display());
        return Ok(Preferences::default());
    }
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let preferences: Preferences = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(preferences)
}

/// Writes preferences to the default location, creating the directory if
/// needed.
pub fn store(preferences: &Preferences) -> Result<()> {
    let path = config_path().context("No config directory available")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(preferences).context("Failed to serialize preferences")?;
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    log::info!("preferences saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let preferences: Preferences = toml::from_str("").unwrap();
        assert_eq!(preferences, Preferences::default());
        assert_eq!(preferences.background_preference, BackgroundMode::Black);
        assert!(preferences.copy_to_clipboard);
        assert!(preferences.save_to_pc);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let preferences: Preferences =
            toml::from_str("background_preference = \"white\"\nsave_to_pc = false\n").unwrap();
        assert_eq!(preferences.background_preference, BackgroundMode::White);
        assert!(!preferences.save_to_pc);
        assert!(preferences.copy_to_clipboard);
    }

    #[test]
    fn roundtrip_preserves_values() {
        let preferences = Preferences {
            background_preference: BackgroundMode::Transparent,
            copy_to_clipboard: false,
            save_to_pc: true,
        };
        let toml = toml::to_string_pretty(&preferences).unwrap();
        let parsed: Preferences = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, preferences);
    }

    #[test]
    fn output_method_validation() {
        let mut preferences = Preferences::default();
        assert!(preferences.has_output_method());
        preferences.copy_to_clipboard = false;
        preferences.save_to_pc = false;
        assert!(!preferences.has_output_method());
        assert!(!preferences.output_targets().any());
    }
}
