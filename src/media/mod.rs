//! Attachments stored under a directory per entry id.
//!
//! An attachment is a byte-identical copy at `<media_dir>/<entry_id>/<filename>`.
//! The entry id is an opaque key: it is never checked against the entry store,
//! so attachments may exist for ids without an entry and survive its deletion.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::storage;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Owns the attachment directories under one media root.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        MediaStore { dir: dir.into() }
    }

    /// Creates a store over the configured media directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.media_dir())
    }

    /// The media root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an attachment has (or would have) in the store.
    pub fn path_of(&self, entry_id: &str, filename: &str) -> AppResult<PathBuf> {
        let entry_dir = self.entry_dir(entry_id)?;
        let filename = single_component(filename, "Attachment name")?;
        Ok(entry_dir.join(filename))
    }

    /// Copies `source` into the entry's attachment directory and returns the
    /// stored filename.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if `entry_id` is blank or not a single path
    ///   component, or `source` does not exist or is not a regular file
    /// - `AppError::Conflict` if the entry already has an attachment with that
    ///   name; the existing file is left unchanged
    /// - `AppError::Io` if copying fails
    pub fn add(&self, entry_id: &str, source: &Path) -> AppResult<String> {
        let entry_dir = self.entry_dir(entry_id)?;

        let metadata = fs::metadata(source).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::Validation(format!("media file {} does not exist", source.display()))
            }
            _ => AppError::io_context("Failed to inspect media file", e),
        })?;
        if !metadata.is_file() {
            return Err(AppError::Validation(format!(
                "{} is not a regular file",
                source.display()
            )));
        }
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "{} has no usable file name",
                    source.display()
                ))
            })?
            .to_string();

        storage::ensure_dir_exists(&entry_dir)?;
        let destination = entry_dir.join(&filename);

        // create_new makes the existence check and the claim one step.
        let mut target = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => AppError::Conflict(format!(
                    "attachment '{}' already exists for entry '{}'",
                    filename,
                    entry_id.trim()
                )),
                _ => AppError::io_context("Failed to create attachment", e),
            })?;

        let copied = File::open(source)
            .and_then(|mut reader| io::copy(&mut reader, &mut target))
            .and_then(|bytes| target.sync_all().map(|_| bytes));
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(target);
                let _ = fs::remove_file(&destination);
                return Err(AppError::io_context("Failed to copy media file", e));
            }
        };
        storage::restrict_file_permissions(&target)?;

        info!(
            "Attached {} ({} bytes) to entry {}",
            filename,
            bytes,
            entry_id.trim()
        );
        Ok(filename)
    }

    /// Lists the attachment filenames of an entry, sorted.
    ///
    /// An entry without an attachment directory has no attachments; that is
    /// not an error.
    pub fn list(&self, entry_id: &str) -> AppResult<Vec<String>> {
        let entry_dir = self.entry_dir(entry_id)?;
        let read_dir = match fs::read_dir(&entry_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::io_context("Failed to list attachments", e)),
        };

        let mut names = Vec::new();
        for dir_entry in read_dir {
            let dir_entry =
                dir_entry.map_err(|e| AppError::io_context("Failed to list attachments", e))?;
            if dir_entry.path().is_file() {
                if let Some(name) = dir_entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        debug!("Entry {} has {} attachments", entry_id.trim(), names.len());
        Ok(names)
    }

    /// Removes one attachment.
    pub fn remove(&self, entry_id: &str, filename: &str) -> AppResult<()> {
        let path = self.path_of(entry_id, filename)?;
        if !path.is_file() {
            return Err(AppError::NotFound(format!(
                "attachment '{}' for entry '{}'",
                filename.trim(),
                entry_id.trim()
            )));
        }
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(format!(
                "attachment '{}' for entry '{}'",
                filename.trim(),
                entry_id.trim()
            )),
            _ => AppError::io_context("Failed to remove attachment", e),
        })?;

        info!("Removed attachment {} from entry {}", filename.trim(), entry_id.trim());
        Ok(())
    }

    fn entry_dir(&self, entry_id: &str) -> AppResult<PathBuf> {
        let entry_id = single_component(entry_id, "Entry id")?;
        Ok(self.dir.join(entry_id))
    }
}

/// Accepts a non-blank name that is exactly one normal path component.
fn single_component<'a>(name: &'a str, what: &str) -> AppResult<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", what)));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(AppError::Validation(format!(
            "{} '{}' must be a plain name without path separators",
            what, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, MediaStore) {
        let temp = tempdir().expect("Failed to create temporary directory");
        let store = MediaStore::new(temp.path().join("media"));
        (temp, store)
    }

    fn source_file(temp: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let dir = temp.path().join("incoming");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_add_copies_bytes_verbatim() {
        let (temp, store) = setup();
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let source = source_file(&temp, "foto.jpg", &bytes);

        let name = store.add("20250715100000", &source).unwrap();

        assert_eq!(name, "foto.jpg");
        let stored = fs::read(store.path_of("20250715100000", "foto.jpg").unwrap()).unwrap();
        assert_eq!(stored, bytes);
        assert!(source.exists());
    }

    #[test]
    fn test_duplicate_name_is_a_conflict() {
        let (temp, store) = setup();
        let first = source_file(&temp, "audio.ogg", b"original");
        store.add("20250715100000", &first).unwrap();

        let other_dir = temp.path().join("other");
        fs::create_dir_all(&other_dir).unwrap();
        let second = other_dir.join("audio.ogg");
        fs::write(&second, b"replacement").unwrap();

        let err = store.add("20250715100000", &second).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(store.list("20250715100000").unwrap(), vec!["audio.ogg"]);
        let stored = fs::read(store.path_of("20250715100000", "audio.ogg").unwrap()).unwrap();
        assert_eq!(stored, b"original");
    }

    #[test]
    fn test_same_name_under_different_entries() {
        let (temp, store) = setup();
        let source = source_file(&temp, "nota.txt", b"x");
        store.add("20250715100000", &source).unwrap();
        store.add("20250716100000", &source).unwrap();
        assert_eq!(store.list("20250716100000").unwrap(), vec!["nota.txt"]);
    }

    #[test]
    fn test_add_validation() {
        let (temp, store) = setup();
        let source = source_file(&temp, "foto.jpg", b"x");

        assert_eq!(store.add("  ", &source).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(
            store.add("../escape", &source).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            store
                .add("20250715100000", &temp.path().join("missing.png"))
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            store.add("20250715100000", temp.path()).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let (_temp, store) = setup();
        assert!(store.list("20250715100000").unwrap().is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let (temp, store) = setup();
        for name in ["c.png", "a.png", "b.png"] {
            store.add("e1", &source_file(&temp, name, b"x")).unwrap();
        }
        assert_eq!(store.list("e1").unwrap(), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_remove() {
        let (temp, store) = setup();
        store.add("e1", &source_file(&temp, "a.png", b"x")).unwrap();

        store.remove("e1", "a.png").unwrap();
        assert!(store.list("e1").unwrap().is_empty());

        assert_eq!(store.remove("e1", "a.png").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(store.remove("e2", "a.png").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            store.remove("e1", "../a.png").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
