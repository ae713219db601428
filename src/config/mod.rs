mod document;
mod editor;
mod settings;

pub use document::{Document, convert_value, render, type_name};
pub use editor::ConfigEditor;
pub use settings::Settings;

use std::path::PathBuf;

/// Get the config directory path.
/// Uses ~/.config/rill/ on all platforms for consistency
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config").join("rill"))
}

/// Get the default config file path
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.json"))
}

/// Where captured script files live
pub fn scripts_dir() -> Option<PathBuf> {
    config_dir().map(|p| p.join("scripts"))
}
