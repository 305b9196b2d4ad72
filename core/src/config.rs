//! Client configuration.
//!
//! Configuration is stored at `~/.simple-translate/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

const DEFAULT_BACKEND_COMMAND: &str = "simple-translate-backend";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Program spawned as the translation backend.
    #[serde(default = "default_backend_command")]
    pub backend_command: String,

    /// Extra arguments for the backend program.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_args: Vec<String>,

    /// Log dropped events of superseded sessions at warn level.
    #[serde(default)]
    pub log_stale_events: bool,
}

fn default_backend_command() -> String {
    DEFAULT_BACKEND_COMMAND.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_command: default_backend_command(),
            backend_args: Vec::new(),
            log_stale_events: false,
        }
    }
}

impl ClientConfig {
    /// Get the configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".simple-translate").join("config.toml"))
    }

    /// Load configuration from the default path, or return default if not found.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`. Missing or unreadable files yield the
    /// default.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ClientConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse client config: {e}, using default");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read client config: {e}, using default");
                Self::default()
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine config file path",
            ));
        };
        self.save_to(&path)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        fs::write(path, &content)?;

        // Owner read/write only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(path, permissions);
        }

        Ok(())
    }
}
