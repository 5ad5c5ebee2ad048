use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use redraft_store::DraftConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "redraft.toml";

/// Settings read from `redraft.toml`. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory holding preserved drafts.
    pub draft_dir: PathBuf,
    /// Drafts older than this are not restored.
    pub draft_max_age_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            draft_dir: PathBuf::from(".redraft/drafts"),
            draft_max_age_secs: DraftConfig::default().max_age.as_secs(),
        }
    }
}

impl CliConfig {
    /// Load `path`, or `./redraft.toml` if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn draft_config(&self) -> DraftConfig {
        DraftConfig {
            max_age: Duration::from_secs(self.draft_max_age_secs),
        }
    }
}
