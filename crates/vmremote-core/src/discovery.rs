//! Locating the remote library on the host
//!
//! Lookup order: configured directory, `VMREMOTE_LIBRARY_DIR`, then the
//! directory of the Voicemeeter uninstaller recorded in the registry.

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use std::path::{Path, PathBuf};

/// Uninstall key written by the Voicemeeter installer
pub const UNINSTALL_KEY: &str =
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\VB:Voicemeeter {17359A74-1236-5467}";

/// File name of the remote library for this target
pub const fn library_file_name() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "VoicemeeterRemote64.dll"
    } else {
        "VoicemeeterRemote.dll"
    }
}

/// Full path of the remote library
pub fn library_path(config: &RemoteConfig) -> Result<PathBuf> {
    let dir = match config.library_dir_override() {
        Some(dir) => dir,
        None => installation_dir()?,
    };
    let path = dir.join(library_file_name());
    tracing::debug!(path = %path.display(), "Resolved remote library path");
    Ok(path)
}

/// Directory part of an `UninstallString` value
///
/// The value may be quoted and may use either separator.
pub fn directory_of_uninstaller(uninstall: &str) -> Option<PathBuf> {
    let trimmed = uninstall.trim().trim_matches('"');
    let cut = trimmed.rfind(['\\', '/'])?;
    let dir = &trimmed[..cut];
    if dir.is_empty() {
        None
    } else {
        Some(Path::new(dir).to_path_buf())
    }
}

#[cfg(windows)]
fn installation_dir() -> Result<PathBuf> {
    use winreg::enums::HKEY_LOCAL_MACHINE;
    use winreg::RegKey;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = hklm
        .open_subkey(UNINSTALL_KEY)
        .map_err(|e| RemoteError::LibraryNotFound(format!("registry key missing: {e}")))?;
    let uninstall: String = key
        .get_value("UninstallString")
        .map_err(|e| RemoteError::LibraryNotFound(format!("UninstallString missing: {e}")))?;

    directory_of_uninstaller(&uninstall)
        .ok_or_else(|| RemoteError::LibraryNotFound(format!("bad UninstallString: {uninstall}")))
}

#[cfg(not(windows))]
fn installation_dir() -> Result<PathBuf> {
    Err(RemoteError::LibraryNotFound(format!(
        "no Voicemeeter installation on this platform, set {}",
        crate::config::LIBRARY_DIR_ENV
    )))
}
