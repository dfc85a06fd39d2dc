//! Path helpers shared by the config and settings layers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Render a path for log output with the home directory shown as `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir()
            .context("Could not determine home directory")?
            .join(rest)),
        None if path == "~" => dirs::home_dir().context("Could not determine home directory"),
        None => Ok(PathBuf::from(path)),
    }
}
