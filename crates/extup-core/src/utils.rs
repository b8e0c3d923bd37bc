//! Shared utility functions for extup crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over `dirs::home_dir()` so that
/// sandboxed sessions and tests can redirect it.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    let home = match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => std::path::PathBuf::from(home),
        _ => dirs::home_dir().ok_or(Error::HomeDirUnavailable)?,
    };

    Utf8PathBuf::from_path_buf(home).map_err(|p| Error::non_utf8_path(p.display().to_string()))
}

/// Root directory for extup state (`$EXTUP_HOME` or `~/.extup`)
pub fn get_extup_home() -> Result<Utf8PathBuf> {
    if let Ok(dir) = std::env::var("EXTUP_HOME") {
        if !dir.is_empty() {
            return Ok(Utf8PathBuf::from(dir));
        }
    }

    Ok(get_home_dir()?.join(".extup"))
}
