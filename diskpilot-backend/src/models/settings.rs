//! User settings data types

use serde::{Deserialize, Serialize};

/// User-tunable settings, persisted as a flat JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub use_ai: bool,
    /// "openai" or "anthropic"
    pub ai_provider: String,
    pub api_key: String,
    pub dry_run: bool,
    pub use_recycle_bin: bool,
    pub create_backups: bool,
    pub primary_target_drive: String,
    pub secondary_target_drive: String,
    pub backup_location: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            use_ai: false,
            ai_provider: "openai".to_string(),
            api_key: String::new(),
            dry_run: false,
            use_recycle_bin: true,
            create_backups: true,
            primary_target_drive: "D:".to_string(),
            secondary_target_drive: "F:".to_string(),
            backup_location: "D:\\Backups\\".to_string(),
        }
    }
}

/// Partial settings update; only provided fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub use_ai: Option<bool>,
    pub ai_provider: Option<String>,
    pub api_key: Option<String>,
    pub dry_run: Option<bool>,
    pub use_recycle_bin: Option<bool>,
    pub create_backups: Option<bool>,
    pub primary_target_drive: Option<String>,
    pub secondary_target_drive: Option<String>,
    pub backup_location: Option<String>,
}

impl UserSettings {
    /// Apply a partial update in place
    pub fn apply(&mut self, update: UpdateSettingsRequest) {
        if let Some(v) = update.use_ai {
            self.use_ai = v;
        }
        if let Some(v) = update.ai_provider {
            self.ai_provider = v;
        }
        if let Some(v) = update.api_key {
            self.api_key = v;
        }
        if let Some(v) = update.dry_run {
            self.dry_run = v;
        }
        if let Some(v) = update.use_recycle_bin {
            self.use_recycle_bin = v;
        }
        if let Some(v) = update.create_backups {
            self.create_backups = v;
        }
        if let Some(v) = update.primary_target_drive {
            self.primary_target_drive = v;
        }
        if let Some(v) = update.secondary_target_drive {
            self.secondary_target_drive = v;
        }
        if let Some(v) = update.backup_location {
            self.backup_location = v;
        }
    }
}
