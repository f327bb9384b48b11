//! Dated planner events persisted as a single JSON document.
//!
//! The document is a JSON array of `{id, date, title}` objects, always
//! rewritten sorted by `(date, id)` with two-space indentation. Ids are
//! allocated as `max(existing) + 1` and never handed out again after a
//! delete, as long as a higher id survives.
//!
//! Every mutation is a load-modify-save cycle held under an exclusive lock on
//! a sidecar lock file, and every save is an atomic replace.

use crate::config::Config;
use crate::constants::{DATE_FORMAT_ISO, PLANNER_LOCK_FILE_NAME};
use crate::errors::{AppError, AppResult};
use crate::storage::{self, StoreLock};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One planner event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique within the document.
    pub id: u64,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Trimmed, non-blank title.
    pub title: String,
}

/// Owns the planner document.
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl EventStore {
    /// Creates a store over the document at `path`. The lock file lives next to it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_file_name(PLANNER_LOCK_FILE_NAME);
        EventStore { path, lock_path }
    }

    /// Creates a store over the configured planner document.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.planner_path())
    }

    /// The planner document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every event, sorted by `(date, id)`.
    ///
    /// # Errors
    ///
    /// - `AppError::CorruptStore` if the document exists but is not a valid event array
    /// - `AppError::Io` if the document exists but cannot be read
    pub fn load(&self) -> AppResult<Vec<Event>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No planner document yet at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(AppError::io_context("Failed to read planner", e)),
        };

        let mut events: Vec<Event> =
            serde_json::from_str(&raw).map_err(|source| AppError::CorruptStore {
                path: self.path.clone(),
                source,
            })?;
        sort_events(&mut events);
        Ok(events)
    }

    /// Sorts and writes the whole document atomically.
    pub fn save(&self, events: &[Event]) -> AppResult<()> {
        let mut sorted = events.to_vec();
        sort_events(&mut sorted);

        if let Some(parent) = self.path.parent() {
            storage::ensure_dir_exists(parent)?;
        }
        let json = serde_json::to_string_pretty(&sorted).map_err(io::Error::from)?;
        storage::write_atomic(&self.path, json.as_bytes())?;

        debug!("Saved {} planner events", sorted.len());
        Ok(())
    }

    /// Alias of [`EventStore::load`] for presentation code.
    pub fn list(&self) -> AppResult<Vec<Event>> {
        self.load()
    }

    /// Returns one event by id.
    pub fn get(&self, id: u64) -> AppResult<Event> {
        self.load()?
            .into_iter()
            .find(|event| event.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Adds an event and returns it with its new id.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if `date` is not a `YYYY-MM-DD` calendar date
    ///   or `title` is blank
    /// - `AppError::CorruptStore` if the existing document cannot be parsed;
    ///   it is left untouched
    pub fn add(&self, date: &str, title: &str) -> AppResult<Event> {
        let date = parse_date(date)?;
        let title = validate_title(title)?;

        let _lock = self.lock()?;
        let mut events = self.load()?;
        let event = Event {
            id: next_id(&events)?,
            date,
            title,
        };
        events.push(event.clone());
        self.save(&events)?;

        info!("Added planner event {}", event.id);
        Ok(event)
    }

    /// Changes the date and/or title of an event. Each supplied field is
    /// validated with the same rules as [`EventStore::add`].
    pub fn update(&self, id: u64, date: Option<&str>, title: Option<&str>) -> AppResult<Event> {
        let date = date.map(parse_date).transpose()?;
        let title = title.map(validate_title).transpose()?;

        let _lock = self.lock()?;
        let mut events = self.load()?;
        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| not_found(id))?;

        if let Some(date) = date {
            event.date = date;
        }
        if let Some(title) = title {
            event.title = title;
        }
        let updated = event.clone();
        self.save(&events)?;

        info!("Updated planner event {}", id);
        Ok(updated)
    }

    /// Removes an event.
    pub fn delete(&self, id: u64) -> AppResult<Event> {
        let _lock = self.lock()?;
        let mut events = self.load()?;
        let position = events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = events.remove(position);
        self.save(&events)?;

        info!("Deleted planner event {}", id);
        Ok(removed)
    }

    fn lock(&self) -> AppResult<StoreLock> {
        StoreLock::acquire(&self.lock_path)
    }
}

fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}

fn next_id(events: &[Event]) -> AppResult<u64> {
    events
        .iter()
        .map(|event| event.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("planner event ids are exhausted".to_string()))
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("planner event {}", id))
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ```
/// use offjournal::planner::parse_date;
///
/// assert!(parse_date("2025-12-25").is_ok());
/// assert!(parse_date("2025-02-30").is_err());
/// assert!(parse_date("25/12/2025").is_err());
/// ```
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT_ISO).map_err(|_| {
        AppError::Validation(format!(
            "Invalid date '{}'. Use YYYY-MM-DD",
            date.trim()
        ))
    })
}

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation(
            "Event title cannot be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tempfile::tempdir;

    fn store_in(temp: &tempfile::TempDir) -> EventStore {
        EventStore::new(temp.path().join("planner.json"))
    }

    #[test]
    fn test_load_missing_document_is_empty() {
        let temp = tempdir().unwrap();
        assert!(store_in(&temp).load().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        assert_eq!(store.add("2025-12-25", "Natal").unwrap().id, 1);
        assert_eq!(store.add("2025-12-31", "Réveillon").unwrap().id, 2);
        store.delete(1).unwrap();
        assert_eq!(store.add("2026-02-14", "Carnaval").unwrap().id, 3);
    }

    #[test]
    fn test_load_orders_by_date_then_id() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        store.add("2026-01-01", "Ano Novo").unwrap();
        store.add("2025-10-31", "Halloween").unwrap();
        store.add("2025-10-31", "Festa").unwrap();

        let titles: Vec<String> = store.load().unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Halloween", "Festa", "Ano Novo"]);
    }

    #[test]
    fn test_document_format_is_sorted_pretty_json() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        store.add("2026-01-01", "Ano Novo").unwrap();
        store.add("2025-10-31", "Halloween").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let expected = "[\n  {\n    \"id\": 2,\n    \"date\": \"2025-10-31\",\n    \"title\": \"Halloween\"\n  },\n  {\n    \"id\": 1,\n    \"date\": \"2026-01-01\",\n    \"title\": \"Ano Novo\"\n  }\n]";
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_add_validates_date_and_title() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        for bad_date in ["2025-13-01", "2025-02-30", "tomorrow", ""] {
            assert_eq!(
                store.add(bad_date, "Evento").unwrap_err().kind(),
                ErrorKind::Validation
            );
        }
        assert_eq!(
            store.add("2025-12-25", "   ").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_trims_title() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let event = store.add("2025-12-25", "  Natal  ").unwrap();
        assert_eq!(event.title, "Natal");
        assert_eq!(store.get(event.id).unwrap(), event);
    }

    #[test]
    fn test_update_fields_independently() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let event = store.add("2025-12-25", "Natal").unwrap();

        let moved = store.update(event.id, Some("2025-12-24"), None).unwrap();
        assert_eq!(moved.date, NaiveDate::from_ymd_opt(2025, 12, 24).unwrap());
        assert_eq!(moved.title, "Natal");

        let renamed = store.update(event.id, None, Some(" Ceia ")).unwrap();
        assert_eq!(renamed.date, moved.date);
        assert_eq!(renamed.title, "Ceia");

        assert_eq!(store.get(event.id).unwrap(), renamed);
    }

    #[test]
    fn test_update_errors() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let event = store.add("2025-12-25", "Natal").unwrap();

        assert_eq!(
            store.update(42, Some("2025-01-01"), None).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            store.update(event.id, Some("2025-00-01"), None).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            store.update(event.id, None, Some("  ")).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(store.get(event.id).unwrap(), event);
    }

    #[test]
    fn test_delete_missing_event() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.delete(7).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_corrupt_document_is_reported_and_preserved() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::CorruptStore);
        assert_eq!(
            store.add("2025-12-25", "Natal").unwrap_err().kind(),
            ErrorKind::CorruptStore
        );
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_add_after_largest_id_fails_without_writing() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let document = format!(
            r#"[{{"id": {}, "date": "2025-01-01", "title": "Último"}}]"#,
            u64::MAX
        );
        fs::write(store.path(), &document).unwrap();

        let err = store.add("2025-02-02", "Mais um").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), document);
    }

    #[test]
    fn test_unsorted_document_is_loaded_sorted() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        fs::write(
            store.path(),
            r#"[{"id": 5, "date": "2025-05-01", "title": "B"},
                {"id": 9, "date": "2025-01-01", "title": "A"}]"#,
        )
        .unwrap();

        let ids: Vec<u64> = store.load().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![9, 5]);
        assert_eq!(store.add("2025-03-01", "C").unwrap().id, 10);
    }
}
