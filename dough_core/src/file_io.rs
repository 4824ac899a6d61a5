//! # Formula Book Files
//!
//! Persistence for [`RecipeBook`] with:
//! - **Atomic saves**: write `<book>.tmp`, fsync, rename over the book
//! - **Locking**: an OS-level lock plus a `<book>.lock` sidecar naming the holder
//! - **Version checks**: the book's schema version must be readable by this build
//!
//! ## Example
//!
//! ```rust,no_run
//! use dough_core::file_io::{load_book_or_default, save_book, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("dough_book.json");
//! let _lock = FileLock::acquire(path, "baker")?;
//!
//! let mut book = load_book_or_default(path)?;
//! book.clear_all();
//! save_book(&book, path)?;
//! # Ok::<(), dough_core::errors::DoughError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{DoughError, DoughResult};
use crate::library::{RecipeBook, SCHEMA_VERSION};

/// Locks older than this are taken over
pub const STALE_LOCK_HOURS: i64 = 24;

/// Contents of the `.lock` sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    /// Host the lock was taken on; the pid is only meaningful there
    #[serde(default)]
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the lock has outlived [`STALE_LOCK_HOURS`], or was taken on
    /// this machine by a process that no longer exists.
    pub fn is_stale(&self) -> bool {
        if (Utc::now() - self.locked_at).num_hours() >= STALE_LOCK_HOURS {
            return true;
        }
        #[cfg(target_os = "linux")]
        {
            let same_machine = hostname().is_some_and(|host| host == self.machine);
            if same_machine && !Path::new(&format!("/proc/{}", self.pid)).exists() {
                return true;
            }
        }
        false
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

/// Exclusive lock on a formula book, released on drop.
#[derive(Debug)]
pub struct FileLock {
    book_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Lock `path` for `user_id`.
    ///
    /// Fails with [`DoughError::FileLocked`] if a live lock is held elsewhere.
    /// A stale sidecar is replaced.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> DoughResult<Self> {
        let lock_path = sidecar(path, ".lock");

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(DoughError::file_locked(
                    path.display().to_string(),
                    format!("{} ({}, pid {})", existing.user_id, existing.machine, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(holder = %existing.user_id, "taking over stale lock");
        }

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| DoughError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        handle
            .try_lock_exclusive()
            .map_err(|_| DoughError::file_locked(path.display().to_string(), "another process", "unknown"))?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(DoughError::serialization)?;
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.sync_all())
            .map_err(|e| DoughError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "acquired book lock");
        Ok(FileLock {
            book_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&sidecar(path, ".lock")).filter(|info| !info.is_stale())
    }

    pub fn book_path(&self) -> &Path {
        &self.book_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `path` with `suffix` appended to its file name (`book.json` -> `book.json.lock`).
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Write the book as pretty JSON, atomically.
pub fn save_book(book: &RecipeBook, path: &Path) -> DoughResult<()> {
    let json = serde_json::to_string_pretty(book).map_err(DoughError::serialization)?;
    let tmp_path = sidecar(path, ".tmp");

    let mut tmp = File::create(&tmp_path)
        .map_err(|e| DoughError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.sync_all())
        .map_err(|e| DoughError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DoughError::file_error("rename", path.display().to_string(), e.to_string())
    })?;

    info!(
        path = %path.display(),
        recipes = book.recipes.len(),
        blends = book.blends.len(),
        "saved formula book"
    );
    Ok(())
}

/// Read a book and check its schema version.
pub fn load_book(path: &Path) -> DoughResult<RecipeBook> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DoughError::file_error("read", path.display().to_string(), e.to_string()))?;

    let book: RecipeBook = serde_json::from_str(&contents)
        .map_err(|e| DoughError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&book.meta.version)?;

    info!(
        path = %path.display(),
        recipes = book.recipes.len(),
        blends = book.blends.len(),
        "loaded formula book"
    );
    Ok(book)
}

/// Like [`load_book`], but a missing file yields an empty book.
pub fn load_book_or_default(path: &Path) -> DoughResult<RecipeBook> {
    if !path.exists() {
        debug!(path = %path.display(), "no formula book yet, starting empty");
        return Ok(RecipeBook::new());
    }
    load_book(path)
}

/// Major versions must match; within 0.x a newer minor is also rejected.
fn validate_version(file_version: &str) -> DoughResult<()> {
    let mismatch = || DoughError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file = Version::parse(file_version).map_err(|_| mismatch())?;
    let current = Version::parse(SCHEMA_VERSION).map_err(|_| mismatch())?;

    if file.major != current.major {
        return Err(mismatch());
    }
    if current.major == 0 && file.minor > current.minor {
        return Err(mismatch());
    }
    Ok(())
}
