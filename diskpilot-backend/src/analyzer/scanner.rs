//! Drive probing and space-consumer discovery
//!
//! Drive capacity comes from statvfs on the configured mount points.
//! Consumer discovery walks a fixed set of well-known heavy directories
//! under the user's home and reports the ten largest.

use std::path::{Path, PathBuf};

use crate::models::{ConsumerType, Drive, DriveStatus, SpaceConsumer};
use crate::util::directory_size;

/// WSL package directories below this size are not worth relocating
const WSL_MIN_BYTES: u64 = 1_000_000_000;

pub struct DriveScanner {
    mounts: Vec<PathBuf>,
    home: PathBuf,
}

impl DriveScanner {
    pub fn new(mounts: Vec<PathBuf>) -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/"));
        Self { mounts, home }
    }

    /// Scanner rooted at an explicit home directory
    #[cfg(test)]
    pub fn with_home(mounts: Vec<PathBuf>, home: PathBuf) -> Self {
        Self { mounts, home }
    }

    /// Probe usage for every configured mount point
    pub fn probe_drives(&self) -> Result<Vec<Drive>, String> {
        let mut drives = Vec::new();
        for mount in &self.mounts {
            match probe_mount(mount) {
                Ok(drive) => drives.push(drive),
                Err(e) => log::warn!("[SCANNER] Skipping {}: {}", mount.display(), e),
            }
        }
        if drives.is_empty() {
            return Err("No probeable mount points".to_string());
        }
        Ok(drives)
    }

    /// Find the largest well-known space consumers, biggest first, top 10
    pub fn identify_space_consumers(&self) -> Vec<SpaceConsumer> {
        let mut consumers = Vec::new();

        for (name, relative) in [
            ("Docker Desktop", "AppData/Local/Docker Desktop"),
            ("Docker", ".docker"),
        ] {
            self.push_if_sized(&mut consumers, name, &self.home.join(relative), ConsumerType::Docker, 1);
        }

        // WSL distributions live as per-distro package directories
        let wsl_base = self.home.join("AppData/Local/Packages");
        if let Ok(entries) = std::fs::read_dir(&wsl_base) {
            for entry in entries.flatten() {
                let file_name = entry.file_name().to_string_lossy().to_string();
                if file_name.contains("CanonicalGroupLimited") || file_name.contains("Ubuntu") {
                    let mut short = file_name.clone();
                    short.truncate(30);
                    self.push_if_sized(
                        &mut consumers,
                        &format!("WSL - {}", short),
                        &entry.path(),
                        ConsumerType::Wsl,
                        WSL_MIN_BYTES,
                    );
                }
            }
        }

        self.push_if_sized(
            &mut consumers,
            "Downloads",
            &self.home.join("Downloads"),
            ConsumerType::Downloads,
            1,
        );

        for temp in [std::env::temp_dir(), self.home.join("AppData/Local/Temp")] {
            let name = format!(
                "Temp - {}",
                temp.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
            );
            self.push_if_sized(&mut consumers, &name, &temp, ConsumerType::Temp, 1);
        }

        for (name, relative) in [
            ("Chrome Cache", "AppData/Local/Google/Chrome/User Data/Default/Cache"),
            ("Edge Cache", "AppData/Local/Microsoft/Edge/User Data/Default/Cache"),
            ("User Cache", ".cache"),
        ] {
            self.push_if_sized(&mut consumers, name, &self.home.join(relative), ConsumerType::Cache, 1);
        }

        consumers.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        consumers.truncate(10);
        consumers
    }

    fn push_if_sized(
        &self,
        consumers: &mut Vec<SpaceConsumer>,
        name: &str,
        path: &Path,
        consumer_type: ConsumerType,
        min_bytes: u64,
    ) {
        if !path.exists() {
            return;
        }
        let size = directory_size(path);
        if size >= min_bytes {
            consumers.push(SpaceConsumer {
                name: name.to_string(),
                path: path.display().to_string(),
                size_bytes: size,
                consumer_type,
                last_modified: None,
            });
        }
    }
}

#[cfg(unix)]
fn probe_mount(mount: &Path) -> Result<Drive, String> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(mount.as_os_str().as_bytes())
        .map_err(|e| format!("Invalid mount path {}: {}", mount.display(), e))?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(format!(
            "statvfs({}) failed: {}",
            mount.display(),
            std::io::Error::last_os_error()
        ));
    }

    let block = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block;
    let free = stat.f_bavail as u64 * block;
    let used = total.saturating_sub(stat.f_bfree as u64 * block);
    let percent_used = if total > 0 {
        (used as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(Drive {
        letter: mount.display().to_string(),
        total_bytes: total,
        used_bytes: used,
        free_bytes: free,
        percent_used,
        status: DriveStatus::from_percent_used(percent_used),
        filesystem: fs_type_for(mount),
    })
}

#[cfg(not(unix))]
fn probe_mount(mount: &Path) -> Result<Drive, String> {
    Err(format!(
        "Drive probing is not supported on this platform ({})",
        mount.display()
    ))
}

/// Filesystem type from /proc/mounts where available
#[cfg(target_os = "linux")]
fn fs_type_for(mount: &Path) -> String {
    let target = mount.display().to_string();
    if let Ok(mounts) = std::fs::read_to_string("/proc/mounts") {
        for line in mounts.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() >= 3 && fields[1] == target {
                return fields[2].to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(not(target_os = "linux"))]
fn fs_type_for(_mount: &Path) -> String {
    "unknown".to_string()
}
