//! Remote configuration
//!
//! Stored as JSON at `<data_dir>/vmremote/config.json`. Every field has a
//! serde default so older or partial files keep loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the remote library directory
pub const LIBRARY_DIR_ENV: &str = "VMREMOTE_LIBRARY_DIR";

fn default_poll_interval_ms() -> u64 {
    crate::DEFAULT_POLL_INTERVAL_MS
}

fn default_settle_delay_ms() -> u64 {
    crate::DEFAULT_SETTLE_DELAY_MS
}

/// How long a setter waits after issuing a script
///
/// The engine applies scripts asynchronously and never acknowledges them.
/// A read issued before the window elapses may still see the old value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Sleep for a fixed window after every write
    Fixed(Duration),
    /// Return as soon as the script is issued
    Immediate,
}

impl SettleStrategy {
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Immediate
        } else {
            Self::Fixed(Duration::from_millis(ms))
        }
    }

    pub fn delay(self) -> Duration {
        match self {
            Self::Fixed(d) => d,
            Self::Immediate => Duration::ZERO,
        }
    }

    /// Block the calling thread for the window
    pub fn wait(self) {
        if let Self::Fixed(d) = self {
            std::thread::sleep(d);
        }
    }
}

impl Default for SettleStrategy {
    fn default() -> Self {
        Self::from_millis(crate::DEFAULT_SETTLE_DELAY_MS)
    }
}

/// Remote configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Directory holding the remote DLL (None = discover)
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
    /// Change poll period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Settle window after each write in milliseconds (0 = don't wait)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Enumerate devices right after a successful login
    #[serde(default)]
    pub refresh_devices_on_connect: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            refresh_devices_on_connect: false,
        }
    }
}

impl RemoteConfig {
    /// Config file path: `<data_dir>/vmremote/config.json`
    pub fn path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vmremote")
            .join("config.json")
    }

    /// Load config from the default path, falling back to defaults on any error
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded config from disk");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle(&self) -> SettleStrategy {
        SettleStrategy::from_millis(self.settle_delay_ms)
    }

    /// Configured library directory, else the environment override
    pub fn library_dir_override(&self) -> Option<PathBuf> {
        self.library_dir.clone().or_else(|| {
            std::env::var_os(LIBRARY_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.library_dir, None);
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.settle_delay_ms, 200);
        assert!(!config.refresh_devices_on_connect);
        assert_eq!(
            config.settle(),
            SettleStrategy::Fixed(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{"settle_delay_ms": 0}"#;
        let config: RemoteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.settle(), SettleStrategy::Immediate);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: RemoteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RemoteConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = RemoteConfig {
            library_dir: Some(PathBuf::from("C:/Program Files (x86)/VB/Voicemeeter")),
            poll_interval_ms: 25,
            settle_delay_ms: 50,
            refresh_devices_on_connect: true,
        };
        config.save(&path).unwrap();

        let loaded = RemoteConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(RemoteConfig::load_from(&path), RemoteConfig::default());
    }

    #[test]
    fn test_zero_poll_interval_clamped() {
        let config = RemoteConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
