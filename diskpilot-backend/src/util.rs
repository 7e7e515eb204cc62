//! Formatting and input-validation helpers

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

/// Format a byte count as a human-readable size
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value)
}

/// Recursive size of a path; unreadable entries count as zero
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

static DRIVE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]:?$").expect("valid regex"));

/// Validate a Windows drive letter ("C" or "C:")
pub fn validate_drive_letter(letter: &str) -> bool {
    DRIVE_LETTER.is_match(letter)
}

/// Reject paths containing parent-directory traversal
pub fn validate_path(path_str: &str) -> bool {
    let path = Path::new(path_str);
    !path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}

/// Check an API key has the provider's expected shape
pub fn validate_api_key(key: &str, provider: &str) -> bool {
    match provider {
        "openai" => key.starts_with("sk-") && key.len() > 20,
        "anthropic" => key.starts_with("sk-ant-") && key.len() > 20,
        _ => false,
    }
}
