//! Configuration and asset paths
//!
//! Linux: `~/.config/scenario-harness/`
//! macOS: `~/Library/Application Support/scenario-harness/`
//! Windows: `%APPDATA%\scenario-harness\`

use std::path::{Component, Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "scenario-harness";

/// Default scenario assets root, relative to the working directory
pub const DEFAULT_ASSETS_ROOT: &str = "tests/assets";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Whether `name` is a single plain path segment (no separators, no `..`)
pub fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
