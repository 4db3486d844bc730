use crate::error::{CompanionError, Result};
use crate::model::default_reflection_prompts;
use crate::persistence::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
pub const GUEST_USER_ID: &str = "demo-user";

/// Application configuration, stored in `<data dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanionConfig {
    /// Identity used for data created while not signed in.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Prompts offered in the weekly reflection when the settings don't define any.
    #[serde(default = "default_prompts")]
    pub reflection_prompts: Vec<String>,

    /// Key the local adapter stores the state under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_user_id() -> String {
    GUEST_USER_ID.to_string()
}

fn default_prompts() -> Vec<String> {
    default_reflection_prompts()
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            reflection_prompts: default_prompts(),
            storage_key: default_storage_key(),
        }
    }
}

impl CompanionConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CompanionError::Io)?;
        let config: CompanionConfig =
            serde_json::from_str(&content).map_err(CompanionError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CompanionError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CompanionError::Serialization)?;
        fs::write(config_path, content).map_err(CompanionError::Io)?;
        Ok(())
    }

    pub fn is_guest(&self) -> bool {
        self.user_id == GUEST_USER_ID
    }
}
