//! # File I/O Module
//!
//! Project and parameter file handling:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: an OS lock plus a visible `.lock` sidecar
//! - **Version validation**: refuse project files from a newer schema
//! - **Plain JSON inputs**: standalone parameter and settings files
//!
//! ## File Format
//!
//! Projects are `.bridge` files containing JSON. Lock files sit next to them as
//! `.bridge.lock` and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bridge_core::file_io::{modify_project, save_project};
//! use bridge_core::parameters::BridgeParameters;
//! use bridge_core::project::BridgeProject;
//! use std::path::Path;
//!
//! let path = Path::new("crossing.bridge");
//! save_project(&BridgeProject::new("Engineer", "25-001", "Client"), path)?;
//!
//! // Lock, load, change, save, unlock
//! modify_project(path, "engineer@company.com", |project| {
//!     project.add_design("Option A", BridgeParameters::default())
//! })?;
//! # Ok::<(), bridge_core::errors::BridgeError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{BridgeError, BridgeResult};
use crate::parameters::BridgeParameters;
use crate::project::{BridgeProject, SCHEMA_VERSION};
use crate::settings::DrawingSettings;

/// Project file extension
pub const PROJECT_EXTENSION: &str = "bridge";

// Locks older than this are taken over regardless of owner
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.bridge.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// "user (machine)"
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a project file, released on drop.
///
/// Holds an fs2 OS lock on the sidecar for process safety and writes
/// [`LockInfo`] into it so other users can see who has the file.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a project file.
    ///
    /// Fails with `FileLocked` when a live lock is held elsewhere. Stale locks
    /// (dead process on this machine, or older than a day) are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> BridgeResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = live_lock(&lock_path) {
            return Err(BridgeError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            BridgeError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(BridgeError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(io_error("write lock", &lock_path))?;

        debug!(path = %path.display(), user = %info.user_id, "Acquired project lock");

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone
    pub fn check(path: &Path) -> Option<LockInfo> {
        live_lock(&lock_path_for(path))
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!(path = %self.lock_path.display(), error = %e, "Could not remove lock file");
        }
    }
}

/// `crossing.bridge` -> `crossing.bridge.lock`
fn lock_path_for(project_path: &Path) -> PathBuf {
    let mut lock_path = project_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Lock info from a sidecar that is present and not stale
fn live_lock(lock_path: &Path) -> Option<LockInfo> {
    if !lock_path.exists() {
        return None;
    }
    let info: LockInfo = read_json(lock_path, "read lock").ok()?;
    if is_lock_stale(&info) {
        debug!(path = %lock_path.display(), holder = %info.holder(), "Ignoring stale lock");
        None
    } else {
        Some(info)
    }
}

/// A lock is stale when its process is gone from this machine or it is too old
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().is_some_and(|ours| ours == info.machine) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
        #[cfg(windows)]
        {
            use std::process::Command;
            let output = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output();
            if let Ok(output) = output {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if !stdout.contains(&info.pid.to_string()) {
                    return true;
                }
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn io_error<'a>(operation: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> BridgeError + 'a {
    move |e| BridgeError::file_error(operation, path.display().to_string(), e.to_string())
}

fn read_to_string(path: &Path, operation: &str) -> BridgeResult<String> {
    let mut file = File::open(path).map_err(io_error(operation, path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(io_error(operation, path))?;
    Ok(contents)
}

fn read_json<T: DeserializeOwned>(path: &Path, operation: &str) -> BridgeResult<T> {
    let contents = read_to_string(path, operation)?;
    serde_json::from_str(&contents).map_err(|e| {
        BridgeError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })
}

/// Save a project with atomic write semantics.
///
/// Serializes to JSON, writes `<path>.tmp`, fsyncs it, then renames it over
/// `path`. An interrupted save leaves the previous file intact.
pub fn save_project(project: &BridgeProject, path: &Path) -> BridgeResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(BridgeError::serialization)?;
    let tmp_path = path.with_extension(format!("{PROJECT_EXTENSION}.tmp"));

    let mut tmp_file = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(io_error("write temp file", &tmp_path))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BridgeError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), designs = project.design_count(), "Saved project");
    Ok(())
}

/// Load a project, checking its schema version.
pub fn load_project(path: &Path) -> BridgeResult<BridgeProject> {
    let project: BridgeProject = read_json(path, "open")?;
    validate_version(&project.meta.version)?;
    debug!(path = %path.display(), designs = project.design_count(), "Loaded project");
    Ok(project)
}

/// Load a project along with whoever currently holds its lock.
pub fn load_project_with_lock_check(
    path: &Path,
) -> BridgeResult<(BridgeProject, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

/// Lock a project, load it, apply `change`, save it and release the lock.
///
/// Nothing is written when `change` fails.
pub fn modify_project<T>(
    path: &Path,
    user_id: impl Into<String>,
    change: impl FnOnce(&mut BridgeProject) -> BridgeResult<T>,
) -> BridgeResult<T> {
    let _lock = FileLock::acquire(path, user_id)?;
    let mut project = load_project(path)?;
    let result = change(&mut project)?;
    save_project(&project, path)?;
    Ok(result)
}

/// Read a standalone `BridgeParameters` JSON file
pub fn load_parameters(path: &Path) -> BridgeResult<BridgeParameters> {
    read_json(path, "read parameters")
}

/// Read a standalone `DrawingSettings` JSON file (missing fields keep defaults)
pub fn load_settings(path: &Path) -> BridgeResult<DrawingSettings> {
    read_json(path, "read settings")
}

/// Accept files from the same major version; within 0.x, not from a newer minor.
fn validate_version(file_version: &str) -> BridgeResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file = parse(file_version);
    let current = parse(SCHEMA_VERSION);

    let mismatch = || BridgeError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    if file.is_empty() || current.is_empty() || file[0] != current[0] {
        return Err(mismatch());
    }
    if current[0] == 0 && file.len() > 1 && current.len() > 1 && file[1] > current[1] {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        let pid = std::process::id();
        temp_dir().join(format!("girderline_test_{name}_{pid}.{PROJECT_EXTENSION}"))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/path/to/crossing.bridge"));
        assert_eq!(lock_path, Path::new("/path/to/crossing.bridge.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(info.pid > 0);
        assert!(info.holder().starts_with("test@example.com ("));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip");
        let mut project = BridgeProject::new("Test Engineer", "TEST-001", "Test Client");
        project
            .add_design(
                "Widened",
                BridgeParameters {
                    carriageway_width_mm: 12_000.0,
                    ..Default::default()
                },
            )
            .unwrap();
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.engineer, "Test Engineer");
        let (_, design) = loaded.find_design("Widened").unwrap();
        assert_eq!(design.parameters.carriageway_width_mm, 12_000.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_path("atomic");
        let tmp_path = path.with_extension("bridge.tmp");

        save_project(&BridgeProject::new("Test", "TEST", "Client"), &path).unwrap();
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert_eq!(lock.project_path(), path.as_path());
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_reports_lock_holder() {
        let path = temp_path("holder");
        save_project(&BridgeProject::new("Test", "TEST", "Client"), &path).unwrap();

        let (_, holder) = load_project_with_lock_check(&path).unwrap();
        assert!(holder.is_none());

        let lock = FileLock::acquire(&path, "checker@example.com").unwrap();
        let (project, holder) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(project.meta.job_id, "TEST");
        assert_eq!(holder.unwrap().user_id, "checker@example.com");

        drop(lock);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_modify_project_adds_design() {
        let path = temp_path("modify");
        save_project(&BridgeProject::new("Test", "TEST", "Client"), &path).unwrap();

        let add = |p: &mut BridgeProject| p.add_design("Option A", BridgeParameters::default());
        let id = modify_project(&path, "tester", add).unwrap();
        let loaded = load_project(&path).unwrap();
        assert!(loaded.get_design(&id).is_some());
        assert!(!lock_path_for(&path).exists());

        // A failing change leaves the file untouched
        let err = modify_project(&path, "tester", add);
        assert!(err.is_err());
        assert_eq!(load_project(&path).unwrap().design_count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_parameters_and_settings() {
        let params_path = temp_dir().join(format!("girderline_params_{}.json", std::process::id()));
        let json = serde_json::to_string(&BridgeParameters::default()).unwrap();
        fs::write(&params_path, json).unwrap();
        assert_eq!(load_parameters(&params_path).unwrap(), BridgeParameters::default());

        let settings_path =
            temp_dir().join(format!("girderline_settings_{}.json", std::process::id()));
        fs::write(&settings_path, r#"{ "show_labels": false }"#).unwrap();
        assert!(!load_settings(&settings_path).unwrap().show_labels);

        fs::write(&settings_path, "not json").unwrap();
        let err = load_settings(&settings_path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        let _ = fs::remove_file(&params_path);
        let _ = fs::remove_file(&settings_path);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = load_project(Path::new("/definitely/not/here.bridge")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
