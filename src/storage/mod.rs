//! Filesystem primitives shared by the stores.
//!
//! This module contains the low-level operations every store relies on:
//! creating store directories with owner-only permissions, replacing a file
//! atomically, and holding an advisory lock across a load-modify-save cycle.

use crate::constants;
use crate::errors::{AppError, AppResult, LockError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Ensures a store directory exists, creating it if necessary.
///
/// Newly created directories get `0o700` permissions on Unix. Existing
/// directories are left untouched.
///
/// # Errors
///
/// Returns:
/// - `AppError::Config` if the provided path is not an absolute path
/// - `AppError::Io` if the directory creation fails due to permission issues,
///   invalid paths, or other filesystem errors
pub fn ensure_dir_exists(dir: &Path) -> AppResult<()> {
    if !dir.is_absolute() {
        return Err(AppError::Config(format!(
            "Store directory path must be absolute: {}",
            dir.display()
        )));
    }

    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::io_context("Failed to create store directory", e))?;

        #[cfg(unix)]
        {
            let permissions = fs::Permissions::from_mode(constants::DEFAULT_DIR_PERMISSIONS);
            fs::set_permissions(dir, permissions).map_err(|e| {
                AppError::io_context("Failed to set secure permissions on store directory", e)
            })?;
            debug!("Set 0o700 permissions on {}", dir.display());
        }
    }
    Ok(())
}

/// Restricts a freshly written file to its owner (`0o600`) on Unix.
pub(crate) fn restrict_file_permissions(file: &File) -> AppResult<()> {
    #[cfg(unix)]
    {
        let mut permissions = file.metadata()?.permissions();
        permissions.set_mode(constants::DEFAULT_FILE_PERMISSIONS);
        file.set_permissions(permissions).map_err(|e| {
            AppError::io_context("Failed to set secure permissions on store file", e)
        })?;
    }
    #[cfg(not(unix))]
    let _ = file;
    Ok(())
}

/// Replaces `path` with `contents` atomically.
///
/// The bytes are written to a temporary file in the same directory, flushed to
/// disk, and renamed over the target. A crash at any point leaves either the
/// old file or the new one, never a truncated mix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> AppResult<()> {
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(AppError::Config(format!(
                "Path has no parent directory: {}",
                path.display()
            )))
        }
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::io_context("Failed to create temporary file", e))?;
    tmp.write_all(contents)
        .map_err(|e| AppError::io_context("Failed to write temporary file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::io_context("Failed to flush temporary file", e))?;
    restrict_file_permissions(tmp.as_file())?;

    tmp.persist(path).map_err(|e| {
        AppError::io_context(format!("Failed to replace {}", path.display()), e.error)
    })?;
    debug!("Atomically replaced {}", path.display());
    Ok(())
}

/// An exclusive advisory lock on a sidecar lock file.
///
/// The lock is held until the value is dropped. Locks are taken on a
/// dedicated file rather than the data file itself, because atomic
/// replacement swaps the data file's inode.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Blocks until the exclusive lock on `path` is acquired, creating the
    /// lock file if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Lock` if the lock file cannot be opened or locked,
    /// and `AppError::Io` if its parent directory cannot be created.
    pub fn acquire(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir_exists(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.to_path_buf(),
                source,
            })?;

        file.lock_exclusive()
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Acquired lock {}", path.display());
        Ok(StoreLock {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The lock file this guard holds.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            debug!("Failed to release lock {}: {}", self.path.display(), e);
        } else {
            debug!("Released lock {}", self.path.display());
        }
    }
}
