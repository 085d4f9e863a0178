//! Editor configuration (RON).
//!
//! ```ron
//! (
//!     host: "meeting",
//!     autosave_delay_ms: 1500,
//!     commands: rich,
//! )
//! ```
//!
//! Every field is optional. A missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::palette::CommandSet;

/// The editor surfaces that embed a kiroku session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    Goal,
    Meeting,
    Project,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Goal => "goal",
            HostKind::Meeting => "meeting",
            HostKind::Project => "project",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Label carried in log lines.
    pub host: String,
    pub autosave_delay_ms: u64,
    pub commands: CommandSet,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            host: "kiroku".to_string(),
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY.as_millis() as u64,
            commands: CommandSet::Basic,
        }
    }
}

impl EditorConfig {
    /// Preset for one of the built-in hosts.
    pub fn for_host(host: HostKind) -> Self {
        let commands = match host {
            HostKind::Goal => CommandSet::Basic,
            HostKind::Meeting | HostKind::Project => CommandSet::Rich,
        };
        Self {
            host: host.as_str().to_string(),
            commands,
            ..Self::default()
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// `$XDG_CONFIG_HOME/kiroku/editor.ron` (or the platform equivalent).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("kiroku").join("editor.ron"))
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_ron(&text)?;
                tracing::debug!("loaded editor config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no editor config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
