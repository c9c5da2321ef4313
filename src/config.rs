use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) settings ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PolicySettings {
    /// Policy file path, relative to the repository root.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default)]
    pub level: String,
    /// Status log file; `~` is expanded. Empty disables it.
    #[serde(default)]
    pub status_log: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    #[serde(default)]
    policy: PolicyOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct PolicyOverlay {
    path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    status_log: Option<String>,
}

impl Settings {
    /// Load the default embedded settings.
    pub fn default_settings() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load settings with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/mission-control/config.toml (if exists)
    ///
    /// Scalars present in the overlay override the defaults. A broken overlay
    /// is reported and ignored.
    pub fn load() -> Self {
        let mut settings = Self::default_settings();
        let Some(home) = std::env::var_os("HOME") else {
            return settings;
        };
        let path = Path::new(&home).join(".config/mission-control/config.toml");
        if let Err(e) = settings.merge_file(&path) {
            eprintln!("mission-control: {e}");
        }
        settings
    }

    /// Merge an overlay file on top of these settings. A missing file is not an error.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Ok(());
        };
        self.merge_str(&content)
            .map_err(|e| Error::Settings(format!("{}: {e}", path.display())))
    }

    /// Merge an overlay given as TOML text.
    pub fn merge_str(&mut self, toml_str: &str) -> Result<()> {
        let overlay: SettingsOverlay =
            toml::from_str(toml_str).map_err(|e| Error::Settings(e.to_string()))?;
        self.apply_overlay(overlay);
        Ok(())
    }

    fn apply_overlay(&mut self, overlay: SettingsOverlay) {
        if let Some(v) = overlay.policy.path {
            self.policy.path = v;
        }
        if let Some(v) = overlay.logging.level {
            self.logging.level = v;
        }
        if let Some(v) = overlay.logging.status_log {
            self.logging.status_log = v;
        }
    }

    /// Parsed log level. Unknown names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        self.logging.level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Expanded status log path, or `None` when disabled.
    pub fn status_log_path(&self) -> Option<PathBuf> {
        let raw = self.logging.status_log.trim();
        if raw.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }
}
