//! User settings persistence
//!
//! Settings live in a single flat JSON file under the data directory.
//! Reads fall back to defaults when the file is missing or unreadable so
//! a corrupt settings file never takes the service down.

use std::fs;
use std::path::PathBuf;

use crate::models::{UpdateSettingsRequest, UserSettings};

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &std::path::Path) -> Self {
        Self {
            path: data_dir.join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults when absent
    pub fn load(&self) -> UserSettings {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[SETTINGS] Failed to parse {}: {}", self.path.display(), e);
                UserSettings::default()
            }),
            Err(_) => UserSettings::default(),
        }
    }

    /// Persist the full settings record
    pub fn save(&self, settings: &UserSettings) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let payload = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&self.path, payload)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    /// Apply a partial update and persist the result
    pub fn update(&self, request: UpdateSettingsRequest) -> Result<UserSettings, String> {
        let mut current = self.load();
        current.apply(request);
        self.save(&current)?;
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let settings = store.load();
        assert!(!settings.use_ai);
        assert_eq!(settings.ai_provider, "openai");
    }

    #[test]
    fn test_update_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        let updated = store
            .update(UpdateSettingsRequest {
                dry_run: Some(true),
                primary_target_drive: Some("E:".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(updated.dry_run);

        let reloaded = store.load();
        assert!(reloaded.dry_run);
        assert_eq!(reloaded.primary_target_drive, "E:");
        // untouched field survives the round trip
        assert!(reloaded.use_recycle_bin);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        let store = SettingsStore::new(dir.path());
        let settings = store.load();
        assert_eq!(settings.ai_provider, "openai");
    }
}
