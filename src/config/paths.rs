//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\knowledge-capture\
//!   macOS:   ~/Library/Application Support/knowledge-capture/
//!   Linux:   ~/.config/knowledge-capture/
//!
//! Data dir (session store, uploaded recordings):
//!   Windows: %LOCALAPPDATA%\knowledge-capture\
//!   macOS:   ~/Library/Application Support/knowledge-capture/
//!   Linux:   ~/.local/share/knowledge-capture/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory holding the session store.
    pub data_dir: PathBuf,
    /// Directory where saved recordings are kept.
    pub uploads_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "knowledge-capture";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let uploads_dir = data_dir.join("uploads");

        Self {
            config_dir,
            settings_file,
            data_dir,
            uploads_dir,
        }
    }

    /// Full path of the session store file named `file_name` inside the data
    /// directory.
    pub fn session_file(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.data_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths.uploads_dir.ends_with("uploads"));
    }

    #[test]
    fn session_file_lives_in_data_dir() {
        let paths = AppPaths::new();
        let file = paths.session_file("knowledge.json");
        assert_eq!(file.parent(), Some(paths.data_dir.as_path()));
    }
}
