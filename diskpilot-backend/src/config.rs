use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root for persisted state: settings.json, rollback/, recycle/
    pub data_dir: PathBuf,
    /// Mount points probed for drive usage
    pub scan_mounts: Vec<PathBuf>,
    pub allowed_origin: String,
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub default_target_drive: String,
    pub backup_location: String,
    /// Per-step simulated delay for dry runs, milliseconds
    pub dry_run_step_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string())),
            scan_mounts: env::var("SCAN_MOUNTS")
                .unwrap_or_else(|_| "/".to_string())
                .split(',')
                .map(|s| PathBuf::from(s.trim()))
                .collect(),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:1420".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            default_target_drive: env::var("DEFAULT_TARGET_DRIVE")
                .unwrap_or_else(|_| "D:".to_string()),
            backup_location: env::var("BACKUP_LOCATION")
                .unwrap_or_else(|_| "D:\\Backups".to_string()),
            dry_run_step_delay_ms: env::var("DRY_RUN_STEP_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("DRY_RUN_STEP_DELAY_MS must be a valid number"),
        }
    }
}
