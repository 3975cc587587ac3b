// qrstudio platform paths for Linux
// Config: ~/.config/qrstudio
// Data:   ~/.local/share/qrstudio

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/qrstudio`, falling back to `~/.config/qrstudio`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("qrstudio"),
        _ => home_dir().join(".config").join("qrstudio"),
    }
}

/// `$XDG_DATA_HOME/qrstudio`, falling back to `~/.local/share/qrstudio`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("qrstudio"),
        _ => home_dir().join(".local").join("share").join("qrstudio"),
    }
}
