//! Filesystem and OS operations behind the action dispatch
//!
//! Each function performs one action kind's real side effect. Inverses
//! for the reversible kinds live here too so the rollback replay and the
//! forward path stay next to each other.

use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::rollback::RollbackOperation;
use crate::util::directory_size;

/// Move a path to a new location, falling back to copy+delete when a
/// plain rename fails (e.g. across devices).
fn move_path(source: &Path, target: &Path) -> Result<(), String> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }

    if fs::rename(source, target).is_ok() {
        return Ok(());
    }

    if source.is_dir() {
        copy_dir_recursive(source, target)?;
        fs::remove_dir_all(source)
            .map_err(|e| format!("Failed to remove {}: {}", source.display(), e))?;
    } else {
        fs::copy(source, target)
            .map_err(|e| format!("Failed to copy {}: {}", source.display(), e))?;
        fs::remove_file(source)
            .map_err(|e| format!("Failed to remove {}: {}", source.display(), e))?;
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), String> {
    fs::create_dir_all(dst).map_err(|e| format!("Failed to create {}: {}", dst.display(), e))?;
    for entry in
        fs::read_dir(src).map_err(|e| format!("Failed to read {}: {}", src.display(), e))?
    {
        let entry = entry.map_err(|e| format!("Failed to read entry in {}: {}", src.display(), e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .map_err(|e| format!("Failed to copy {}: {}", src_path.display(), e))?;
        }
    }
    Ok(())
}

fn symlink_to(source: &Path, target: &Path) -> Result<(), String> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, source)
            .map_err(|e| format!("Failed to symlink {}: {}", source.display(), e))
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(target, source)
            .map_err(|e| format!("Failed to symlink {}: {}", source.display(), e))
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (source, target);
        Err("Symlinks are not supported on this platform".to_string())
    }
}

fn remove_if_symlink(path: &Path) -> Result<(), String> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(path)
            .map_err(|e| format!("Failed to remove symlink {}: {}", path.display(), e)),
        _ => Ok(()),
    }
}

/// MOVE: relocate a directory to another drive and leave a symlink at
/// the old location so dependent programs keep working.
pub fn move_directory(source: &Path, target: &Path) -> Result<RollbackOperation, String> {
    if !source.exists() {
        return Err(format!("Source not found: {}", source.display()));
    }

    move_path(source, target)?;
    if let Err(e) = symlink_to(source, target) {
        log::warn!("[OPS] {}", e);
    }

    Ok(RollbackOperation::Move {
        source: source.display().to_string(),
        target: target.display().to_string(),
    })
}

/// CLEANUP: delete the contents of a cache or temp directory, keeping
/// the directory itself. Entries that refuse to go are skipped.
/// Returns the number of bytes freed.
pub fn clear_directory(path: &Path) -> Result<u64, String> {
    if !path.exists() {
        return Err(format!("Source not found: {}", path.display()));
    }

    let mut freed = 0u64;
    let entries =
        fs::read_dir(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    for entry in entries.flatten() {
        let entry_path = entry.path();
        let size = directory_size(&entry_path);
        let removed = if entry_path.is_dir() {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };
        match removed {
            Ok(()) => freed += size,
            Err(e) => log::warn!("[OPS] Skipping {}: {}", entry_path.display(), e),
        }
    }
    Ok(freed)
}

/// PRUNE: run the action's shell command and fail on a non-zero exit
pub async fn run_command(command: &str) -> Result<(), String> {
    #[cfg(unix)]
    let output = Command::new("sh").arg("-c").arg(command).output().await;
    #[cfg(not(unix))]
    let output = Command::new("cmd").arg("/C").arg(command).output().await;

    let output = output.map_err(|e| format!("Failed to run '{}': {}", command, e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Command '{}' exited with {}: {}",
            command,
            output.status,
            stderr.trim()
        ));
    }
    Ok(())
}

/// DELETE_TO_RECYCLE: move a path into the per-execution recycle area
/// instead of deleting it, so rollback can restore it.
pub fn delete_to_recycle(source: &Path, recycle_dir: &Path) -> Result<RollbackOperation, String> {
    if !source.exists() {
        return Err(format!("Source not found: {}", source.display()));
    }

    let name = source
        .file_name()
        .ok_or_else(|| format!("Path has no file name: {}", source.display()))?;
    let recycle_path = recycle_dir.join(name);
    move_path(source, &recycle_path)?;

    Ok(RollbackOperation::DeleteToRecycle {
        original_path: source.display().to_string(),
        recycle_path: recycle_path.display().to_string(),
    })
}

/// EXPORT_IMPORT_WSL: relocate a WSL distribution by exporting it to a
/// backup tar, unregistering it, and importing it at the target location.
pub async fn relocate_wsl(
    distro: &str,
    source: &Path,
    target: &Path,
    backup_dir: &Path,
) -> Result<RollbackOperation, String> {
    fs::create_dir_all(backup_dir)
        .map_err(|e| format!("Failed to create {}: {}", backup_dir.display(), e))?;
    fs::create_dir_all(target)
        .map_err(|e| format!("Failed to create {}: {}", target.display(), e))?;
    let backup_tar = backup_dir.join(format!("{}.tar", distro));

    run_command(&format!("wsl --export {} \"{}\"", distro, backup_tar.display())).await?;
    run_command(&format!("wsl --unregister {}", distro)).await?;
    run_command(&format!(
        "wsl --import {} \"{}\" \"{}\"",
        distro,
        target.display(),
        backup_tar.display()
    ))
    .await?;

    Ok(RollbackOperation::ExportImportWsl {
        distro: distro.to_string(),
        backup_tar: backup_tar.display().to_string(),
        source: source.display().to_string(),
        target: target.display().to_string(),
    })
}

/// Invert one journaled operation. Used by the rollback replay.
pub fn invert_operation(operation: &RollbackOperation) -> Result<(), String> {
    match operation {
        RollbackOperation::Move { source, target } => {
            let source = Path::new(source);
            let target = Path::new(target);
            remove_if_symlink(source)?;
            if !target.exists() {
                return Err(format!("Moved data missing: {}", target.display()));
            }
            move_path(target, source)
        }
        RollbackOperation::DeleteToRecycle {
            original_path,
            recycle_path,
        } => {
            let recycle = Path::new(recycle_path);
            if !recycle.exists() {
                return Err(format!("Recycled data missing: {}", recycle.display()));
            }
            move_path(recycle, Path::new(original_path))
        }
        RollbackOperation::ExportImportWsl {
            distro,
            backup_tar,
            target,
            ..
        } => {
            // Re-import from the backup tar; sync because the rollback
            // replay runs off the async path.
            let script = format!(
                "wsl --unregister {} && wsl --import {} \"{}\" \"{}\"",
                distro, distro, target, backup_tar
            );
            #[cfg(unix)]
            let status = std::process::Command::new("sh").arg("-c").arg(&script).status();
            #[cfg(not(unix))]
            let status = std::process::Command::new("cmd").arg("/C").arg(&script).status();

            match status {
                Ok(s) if s.success() => Ok(()),
                Ok(s) => Err(format!("WSL re-import for {} exited with {}", distro, s)),
                Err(e) => Err(format!("Failed to re-import WSL {}: {}", distro, e)),
            }
        }
    }
}

/// Recycle area for one execution
pub fn recycle_dir(data_dir: &Path, execution_id: &str) -> PathBuf {
    data_dir.join("recycle").join(execution_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_move_directory_relocates_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("docker");
        let target = dir.path().join("moved").join("docker");
        write_file(&source.join("data.bin"), "payload");

        let op = move_directory(&source, &target).unwrap();
        assert!(target.join("data.bin").exists());
        match &op {
            RollbackOperation::Move { source, .. } => assert!(source.ends_with("docker")),
            _ => panic!("expected Move operation"),
        }

        #[cfg(unix)]
        assert!(fs::symlink_metadata(&source).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_move_missing_source_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_directory(&dir.path().join("absent"), &dir.path().join("out")).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_invert_move_restores_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("downloads");
        let target = dir.path().join("d").join("downloads");
        write_file(&source.join("file.iso"), "iso");

        let op = move_directory(&source, &target).unwrap();
        invert_operation(&op).unwrap();

        assert!(source.join("file.iso").exists());
        assert!(!target.exists());
        #[cfg(unix)]
        assert!(!fs::symlink_metadata(&source).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_clear_directory_empties_but_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        write_file(&cache.join("a.tmp"), "aaaa");
        write_file(&cache.join("sub").join("b.tmp"), "bbbbbbbb");

        let freed = clear_directory(&cache).unwrap();
        assert_eq!(freed, 12);
        assert!(cache.exists());
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn test_delete_to_recycle_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let victim = dir.path().join("old-downloads");
        write_file(&victim.join("keep.txt"), "data");
        let recycle = recycle_dir(dir.path(), "exec-1");

        let op = delete_to_recycle(&victim, &recycle).unwrap();
        assert!(!victim.exists());
        assert!(recycle.join("old-downloads").join("keep.txt").exists());

        invert_operation(&op).unwrap();
        assert!(victim.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_run_command_reports_failure() {
        assert!(run_command("exit 0").await.is_ok());
        let err = run_command("exit 3").await.unwrap_err();
        assert!(err.contains("exited with"));
    }
}
