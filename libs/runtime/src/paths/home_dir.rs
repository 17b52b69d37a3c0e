//! Home directory resolution for the server.
//!
//! The home directory anchors every relative path the process touches:
//! SQLite database files and log files.

use std::io;
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// - `None` (or an empty string) selects the platform default:
///   `$HOME/<default_subdir>` on Unix/macOS, `%APPDATA%/<default_subdir>` on Windows.
/// - A leading `~` is expanded to the user's home directory.
/// - Relative paths are resolved against the current working directory.
///
/// When `create` is true the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> io::Result<PathBuf> {
    let path = match configured {
        Some(raw) if !raw.trim().is_empty() => expand_tilde(raw.trim())?,
        _ => platform_base_dir()?.join(default_subdir),
    };

    let path = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path
    };

    if create {
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
}

fn platform_base_dir() -> io::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .or_else(dirs::config_dir);
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir);

    base.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory"))
}

fn expand_tilde(raw: &str) -> io::Result<PathBuf> {
    if raw == "~" {
        return platform_base_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base_dir()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}
