//! Backup archives of the data directory.
//!
//! A backup is a gzip-compressed tar archive holding the entry files, the
//! attachment tree and the planner document, stored under paths relative to
//! the data directory (`entries/...`, `media/<entry_id>/...`, `planner.json`).
//! The BLAKE3 checksum of the archive bytes is returned so the copy can be
//! verified later.

use crate::config::Config;
use crate::constants::{
    ENTRIES_LOCK_FILE_NAME, ENTRIES_SUBDIR, MEDIA_SUBDIR, PLANNER_FILE_NAME,
    PLANNER_LOCK_FILE_NAME,
};
use crate::errors::{AppError, AppResult};
use crate::storage;
use blake3::Hasher;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Report of a completed backup.
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    /// Entry files archived.
    pub entries: usize,
    /// Attachment files archived.
    pub attachments: usize,
    /// Whether the planner document existed and was archived.
    pub planner_included: bool,
    /// Size of the archive in bytes.
    pub archive_size: u64,
    /// BLAKE3 checksum of the archive, hex encoded.
    pub checksum: String,
    /// Time taken.
    pub duration: Duration,
}

/// Contents of an existing archive.
#[derive(Debug, Clone, Serialize)]
pub struct BackupManifest {
    /// Archived entry files, relative to the data directory.
    pub entries: Vec<PathBuf>,
    /// Archived attachments, relative to the data directory.
    pub attachments: Vec<PathBuf>,
    /// Whether the archive holds a planner document.
    pub planner_included: bool,
    /// BLAKE3 checksum of the archive, hex encoded.
    pub checksum: String,
}

/// Archives the data directory described by `config` into `output_path`.
///
/// Missing subdirectories are skipped, so a fresh store produces a valid empty
/// archive. Lock files are never archived. An existing file at `output_path`
/// is replaced atomically.
///
/// # Errors
///
/// - `AppError::Validation` if `output_path` lies inside the entries or media
///   directory
/// - `AppError::Io` if a file cannot be read or the archive cannot be written
pub fn create_backup(config: &Config, output_path: &Path) -> AppResult<BackupReport> {
    let start_time = Instant::now();
    info!("Creating backup at {}", output_path.display());

    for store_dir in [config.entries_dir(), config.media_dir()] {
        if output_path.starts_with(&store_dir) {
            return Err(AppError::Validation(format!(
                "Backup destination {} must not be inside {}",
                output_path.display(),
                store_dir.display()
            )));
        }
    }

    let entry_files = collect_files(&config.entries_dir())?;
    let media_files = collect_files(&config.media_dir())?;
    let planner_path = config.planner_path();
    let planner_included = planner_path.is_file();

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar = tar::Builder::new(encoder);

    for path in entry_files.iter().chain(media_files.iter()) {
        append(&mut tar, config.data_dir(), path)?;
    }
    if planner_included {
        append(&mut tar, config.data_dir(), &planner_path)?;
    }

    let encoder = tar
        .into_inner()
        .map_err(|e| AppError::io_context("Failed to finalize tar archive", e))?;
    let archive = encoder
        .finish()
        .map_err(|e| AppError::io_context("Failed to finish gzip compression", e))?;
    debug!("Archive size (compressed): {} bytes", archive.len());

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io_context("Failed to create backup directory", e))?;
    }
    storage::write_atomic(output_path, &archive)?;

    let checksum = checksum_of(&archive);
    let duration = start_time.elapsed();
    info!(
        "Backup completed: {} entries, {} attachments, {} bytes in {:?}",
        entry_files.len(),
        media_files.len(),
        archive.len(),
        duration
    );

    Ok(BackupReport {
        entries: entry_files.len(),
        attachments: media_files.len(),
        planner_included,
        archive_size: archive.len() as u64,
        checksum,
        duration,
    })
}

/// Reads an archive written by [`create_backup`] and lists what it holds.
///
/// # Errors
///
/// - `AppError::NotFound` if the archive does not exist
/// - `AppError::Io` if it is not a readable tar.gz archive
pub fn verify_backup(archive_path: &Path) -> AppResult<BackupManifest> {
    let bytes = fs::read(archive_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound(format!(
            "backup archive {} does not exist",
            archive_path.display()
        )),
        _ => AppError::io_context("Failed to read backup archive", e),
    })?;

    let mut manifest = BackupManifest {
        entries: Vec::new(),
        attachments: Vec::new(),
        planner_included: false,
        checksum: checksum_of(&bytes),
    };

    let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
    let members = archive
        .entries()
        .map_err(|e| AppError::io_context("Failed to read backup archive", e))?;
    for member in members {
        let member = member.map_err(|e| AppError::io_context("Corrupt backup archive", e))?;
        let path = member
            .path()
            .map_err(|e| AppError::io_context("Corrupt backup archive", e))?
            .into_owned();

        if path.starts_with(ENTRIES_SUBDIR) {
            manifest.entries.push(path);
        } else if path.starts_with(MEDIA_SUBDIR) {
            manifest.attachments.push(path);
        } else if path == Path::new(PLANNER_FILE_NAME) {
            manifest.planner_included = true;
        } else {
            debug!("Ignoring unexpected archive member {}", path.display());
        }
    }

    manifest.entries.sort();
    manifest.attachments.sort();
    Ok(manifest)
}

/// Regular files under `dir`, sorted, excluding lock files.
fn collect_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for dir_entry in WalkDir::new(dir).follow_links(false) {
        let dir_entry = dir_entry.map_err(|e| {
            AppError::io_context(
                format!("Failed to walk {}", dir.display()),
                io::Error::from(e),
            )
        })?;
        let name = dir_entry.file_name().to_string_lossy();
        if dir_entry.file_type().is_file()
            && name != ENTRIES_LOCK_FILE_NAME
            && name != PLANNER_LOCK_FILE_NAME
        {
            files.push(dir_entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn append<W: io::Write>(tar: &mut tar::Builder<W>, root: &Path, path: &Path) -> AppResult<()> {
    let relative = path.strip_prefix(root).map_err(|_| {
        AppError::Config(format!(
            "{} is outside the data directory {}",
            path.display(),
            root.display()
        ))
    })?;
    debug!("Adding to archive: {}", relative.display());
    let mut file = File::open(path)
        .map_err(|e| AppError::io_context(format!("Failed to open {}", path.display()), e))?;
    tar.append_file(relative, &mut file).map_err(|e| {
        AppError::io_context(format!("Failed to add {} to archive", relative.display()), e)
    })
}

fn checksum_of(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}
