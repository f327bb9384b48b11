//! Journal entries stored as one markdown file each.
//!
//! An entry lives at `<entries_dir>/<id>_<sanitized title>.md`, where the id is
//! a 14-digit timestamp from [`crate::identifier`] and the sanitized title is
//! the title with runs of whitespace collapsed to single underscores. Entries
//! are addressed by id or by any unambiguous id prefix.
//!
//! Create, update and delete run under an advisory lock on the entries
//! directory so a second process cannot interleave with them. Updates replace
//! the file atomically.

use crate::config::Config;
use crate::constants::{
    ENTRIES_LOCK_FILE_NAME, ENTRY_CREATED_FORMAT, ENTRY_CREATED_LABEL, ENTRY_FILENAME_SEPARATOR,
    ENTRY_FILE_EXTENSION, ENTRY_PLACEHOLDER_LINE, UNTITLED_ENTRY_TITLE,
};
use crate::errors::{AppError, AppResult};
use crate::identifier;
use crate::storage::{self, StoreLock};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};


/// Metadata describing one entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMeta {
    /// 14-digit creation timestamp, immutable.
    pub id: String,
    /// Human title, taken from the `# ` header line when present.
    pub title: String,
    /// Name of the backing file inside the entries directory.
    pub filename: String,
}

/// Owns the entry files of one entries directory.
#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    /// Creates a store over `dir`. The directory is created lazily on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        EntryStore { dir: dir.into() }
    }

    /// Creates a store over the configured entries directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.entries_dir())
    }

    /// The entries directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> AppResult<StoreLock> {
        StoreLock::acquire(&self.dir.join(ENTRIES_LOCK_FILE_NAME))
    }

    /// Creates a new entry from the template and returns its metadata.
    ///
    /// The id is the current second, advanced past any id already in the
    /// store so two entries never share one.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if `title` is empty, only whitespace, or spans
    ///   several lines; no file is created
    /// - `AppError::Io` / `AppError::Lock` on filesystem failures
    pub fn create(&self, title: &str) -> AppResult<EntryMeta> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Entry title cannot be empty".to_string(),
            ));
        }
        if title.contains(['\n', '\r']) {
            return Err(AppError::Validation(
                "Entry title must be a single line".to_string(),
            ));
        }

        storage::ensure_dir_exists(&self.dir)?;
        let _lock = self.lock()?;

        let existing = self.scan()?;
        let now = Local::now();
        let id = identifier::next_free(now, existing.iter().map(|(id, _)| id.as_str()));
        let filename = entry_filename(&id, title);
        let path = self.dir.join(&filename);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    AppError::Conflict(format!("entry file {} already exists", filename))
                }
                _ => AppError::io_context("Failed to create entry", e),
            })?;
        storage::restrict_file_permissions(&file)?;
        file.write_all(render_template(title, &now).as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| AppError::io_context("Failed to write entry", e))?;

        info!("Created entry {}", id);
        Ok(EntryMeta {
            id,
            title: title.to_string(),
            filename,
        })
    }

    /// Lists every entry, newest first.
    ///
    /// A missing entries directory is an empty store, not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory exists but cannot be scanned.
    pub fn list(&self) -> AppResult<Vec<EntryMeta>> {
        let mut entries: Vec<EntryMeta> = self
            .scan()?
            .into_iter()
            .map(|(id, path)| describe(id, &path))
            .collect();
        entries.sort_by(|a, b| b.filename.cmp(&a.filename));
        debug!("Listed {} entries", entries.len());
        Ok(entries)
    }

    /// Resolves an id or id prefix to the entry's backing file.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if nothing matches
    /// - `AppError::Ambiguous` if several ids match, or several files share the id
    pub fn path_of(&self, id_or_prefix: &str) -> AppResult<PathBuf> {
        let scanned = self.scan()?;
        let id = identifier::resolve(id_or_prefix, scanned.iter().map(|(id, _)| id))?;

        let mut paths: Vec<PathBuf> = scanned
            .into_iter()
            .filter(|(candidate, _)| *candidate == id)
            .map(|(_, path)| path)
            .collect();

        if paths.len() > 1 {
            paths.sort();
            return Err(AppError::Ambiguous {
                prefix: id_or_prefix.trim().to_string(),
                candidates: paths.iter().filter_map(|p| file_name(p)).collect(),
            });
        }
        paths
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("no entry matches id '{}'", id)))
    }

    /// Returns the raw content of an entry.
    pub fn read(&self, id_or_prefix: &str) -> AppResult<String> {
        let path = self.path_of(id_or_prefix)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::NotFound(format!("entry '{}' was removed", id_or_prefix.trim()))
            }
            _ => AppError::io_context("Failed to read entry", e),
        })
    }

    /// Replaces an entry's content. No merge, no versioning.
    pub fn update(&self, id_or_prefix: &str, content: &str) -> AppResult<EntryMeta> {
        let _lock = self.lock()?;
        let path = self.path_of(id_or_prefix)?;
        storage::write_atomic(&path, content.as_bytes())?;

        let meta = describe(id_of(&path).unwrap_or_default(), &path);
        info!("Updated entry {}", meta.id);
        Ok(meta)
    }

    /// Permanently removes an entry.
    pub fn delete(&self, id_or_prefix: &str) -> AppResult<EntryMeta> {
        let _lock = self.lock()?;
        let path = self.path_of(id_or_prefix)?;
        let meta = describe(id_of(&path).unwrap_or_default(), &path);

        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::NotFound(format!("entry '{}' was already removed", meta.id))
            }
            _ => AppError::io_context("Failed to delete entry", e),
        })?;

        info!("Deleted entry {}", meta.id);
        Ok(meta)
    }

    /// Returns `(id, path)` for every well-formed entry file.
    fn scan(&self) -> AppResult<Vec<(String, PathBuf)>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::io_context("Failed to scan entries directory", e)),
        };

        let mut found = Vec::new();
        for dir_entry in read_dir {
            let dir_entry =
                dir_entry.map_err(|e| AppError::io_context("Failed to scan entries directory", e))?;
            let path = dir_entry.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_FILE_EXTENSION)
            {
                continue;
            }
            match id_of(&path) {
                Some(id) => found.push((id, path)),
                None => debug!("Skipping non-entry file {}", path.display()),
            }
        }
        Ok(found)
    }
}

/// Builds `<id>_<sanitized title>.md`.
///
/// Whitespace runs become single underscores; path separators become `-` so a
/// title can never name a file outside the entries directory.
///
/// ```
/// use offjournal::entry::entry_filename;
///
/// assert_eq!(
///     entry_filename("20250715100000", "  My   first\tentry "),
///     "20250715100000_My_first_entry.md"
/// );
/// assert_eq!(entry_filename("20250715100000", "a/b"), "20250715100000_a-b.md");
/// ```
pub fn entry_filename(id: &str, title: &str) -> String {
    let sanitized = title
        .split_whitespace()
        .map(|word| word.replace(['/', '\\'], "-"))
        .collect::<Vec<_>>()
        .join("_");
    format!(
        "{}{}{}.{}",
        id, ENTRY_FILENAME_SEPARATOR, sanitized, ENTRY_FILE_EXTENSION
    )
}

/// Renders the initial body of a new entry.
pub(crate) fn render_template(title: &str, created: &DateTime<Local>) -> String {
    format!(
        "# {}\n\n{} {}\n\n{}\n",
        title,
        ENTRY_CREATED_LABEL,
        created.format(ENTRY_CREATED_FORMAT),
        ENTRY_PLACEHOLDER_LINE
    )
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Extracts the id part of an entry filename, if it is a valid id.
fn id_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let id = stem.split(ENTRY_FILENAME_SEPARATOR).next()?;
    identifier::is_valid_id(id).then(|| id.to_string())
}

/// Decodes the title carried in the filename.
fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.split_once(ENTRY_FILENAME_SEPARATOR))
        .map(|(_, title)| title.replace(ENTRY_FILENAME_SEPARATOR, " "))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_ENTRY_TITLE.to_string())
}

/// Reads the title from the first line when it is a `# ` header.
fn title_from_header(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line).ok()?;
    let title = first_line.strip_prefix("# ")?.trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn describe(id: String, path: &Path) -> EntryMeta {
    EntryMeta {
        id,
        title: title_from_header(path).unwrap_or_else(|| title_from_filename(path)),
        filename: file_name(path).unwrap_or_default(),
    }
}
