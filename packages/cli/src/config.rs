use formedit_editor::{ExecutionMode, InterpreterOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "formedit.config.json";

/// Formedit configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Failure policy for batches (`lenient` or `strict`)
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Fixed identifier seed, for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,

    /// Write indented JSON
    #[serde(default = "default_pretty_output")]
    pub pretty_output: bool,
}

fn default_pretty_output() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME)
    }

    pub fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            mode: self.mode,
            id_seed: self.id_seed.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Lenient,
            id_seed: None,
            pretty_output: default_pretty_output(),
        }
    }
}
