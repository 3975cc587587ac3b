// qrstudio platform abstraction
// Provides platform-specific config and data directories for Windows, macOS, and Linux.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "QRSTUDIO_DATA_DIR";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/qrstudio` (or `$XDG_CONFIG_HOME/qrstudio`)
/// - **macOS**: `~/Library/Application Support/QRStudio`
/// - **Windows**: `%APPDATA%/QRStudio`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `~/.local/share/qrstudio` (or `$XDG_DATA_HOME/qrstudio`)
/// - **macOS**: `~/Library/Application Support/QRStudio`
/// - **Windows**: `%APPDATA%/QRStudio`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// `$QRSTUDIO_DATA_DIR` when set, otherwise [`get_data_dir`].
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => get_data_dir(),
    }
}
