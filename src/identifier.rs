//! Chronologically sortable entry identifiers and prefix resolution.
//!
//! An entry id is the local wall-clock time at second precision formatted as
//! 14 zero-padded digits (`YYYYMMDDHHMMSS`). Because the width is fixed,
//! lexicographic order equals chronological order.

use crate::constants::{ENTRY_ID_FORMAT, ENTRY_ID_LEN};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use std::collections::BTreeSet;

/// Returns an id for the current local time.
///
/// Non-decreasing across calls on a monotonic clock, but not unique: two
/// calls within the same second return the same id. Use [`next_free`] when
/// the id must not collide with existing ones.
pub fn generate() -> String {
    format_id(&Local::now())
}

/// Formats a timestamp as an id.
///
/// ```
/// use chrono::{Local, TimeZone};
/// use offjournal::identifier::format_id;
///
/// let at = Local.with_ymd_and_hms(2025, 7, 15, 10, 0, 0).unwrap();
/// assert_eq!(format_id(&at), "20250715100000");
/// ```
pub fn format_id<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(ENTRY_ID_FORMAT).to_string()
}

/// Returns true if `candidate` is exactly 14 ASCII digits naming a real
/// date and time.
pub fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == ENTRY_ID_LEN
        && candidate.bytes().all(|b| b.is_ascii_digit())
        && NaiveDateTime::parse_from_str(candidate, ENTRY_ID_FORMAT).is_ok()
}

/// Returns the id for `now`, advanced one second at a time past any id
/// already in `taken`.
///
/// The result is never smaller than the id for `now`, so ordering stays
/// chronological while same-second creations get distinct ids.
pub fn next_free<'a, I>(now: DateTime<Local>, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: BTreeSet<&str> = taken.into_iter().collect();
    let mut at = now;
    let mut id = format_id(&at);
    while taken.contains(id.as_str()) {
        match TimeDelta::try_seconds(1).and_then(|step| at.checked_add_signed(step)) {
            Some(next) => at = next,
            None => break,
        }
        id = format_id(&at);
    }
    id
}

/// Resolves a user-supplied prefix to exactly one id.
///
/// Candidates are deduplicated and sorted before matching, so the outcome
/// does not depend on directory iteration order.
///
/// # Errors
///
/// - `AppError::NotFound` if the prefix is blank or matches nothing
/// - `AppError::Ambiguous` if more than one id starts with the prefix; the
///   error carries every match in ascending order
///
/// # Examples
///
/// ```
/// use offjournal::identifier::resolve;
/// use offjournal::errors::ErrorKind;
///
/// let ids = ["20250715100000", "20250716090000"];
/// assert_eq!(resolve("202507151", ids).unwrap(), "20250715100000");
/// assert_eq!(resolve("2025", ids).unwrap_err().kind(), ErrorKind::Ambiguous);
/// assert_eq!(resolve("2024", ids).unwrap_err().kind(), ErrorKind::NotFound);
/// ```
pub fn resolve<I, S>(prefix: &str, candidates: I) -> AppResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(AppError::NotFound("an empty id matches no entry".to_string()));
    }

    let matches: BTreeSet<String> = candidates
        .into_iter()
        .filter(|c| c.as_ref().starts_with(prefix))
        .map(|c| c.as_ref().to_string())
        .collect();

    let mut matches = matches.into_iter();
    match (matches.next(), matches.next()) {
        (None, _) => Err(AppError::NotFound(format!(
            "no entry matches id '{}'",
            prefix
        ))),
        (Some(only), None) => Ok(only),
        (Some(first), Some(second)) => {
            let mut candidates = vec![first, second];
            candidates.extend(matches);
            Err(AppError::Ambiguous {
                prefix: prefix.to_string(),
                candidates,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_generate_is_fourteen_digits() {
        let id = generate();
        assert_eq!(id.len(), 14);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
        assert!(is_valid_id(&id));
    }

    #[test]
    fn test_generate_is_non_decreasing() {
        let first = generate();
        let second = generate();
        assert!(second >= first);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("20250715100000"));
        assert!(!is_valid_id("2025071510000"));
        assert!(!is_valid_id("2025071510000a"));
        assert!(!is_valid_id("20251315100000")); // month 13
        assert!(!is_valid_id(""));
    }

    #[test]
    fn test_next_free_skips_taken_seconds() {
        let now = at(2025, 7, 15, 10, 0, 0);
        assert_eq!(next_free(now, std::iter::empty()), "20250715100000");

        let taken = ["20250715100000", "20250715100001"];
        assert_eq!(next_free(now, taken), "20250715100002");
    }

    #[test]
    fn test_next_free_rolls_over_minute() {
        let now = at(2025, 7, 15, 10, 0, 59);
        assert_eq!(next_free(now, ["20250715100059"]), "20250715100100");
    }

    #[test]
    fn test_resolve_unique_prefix_and_full_id() {
        let ids = vec!["20250715100000".to_string(), "20250716090000".to_string()];
        assert_eq!(resolve("20250716", &ids).unwrap(), "20250716090000");
        assert_eq!(resolve("20250715100000", &ids).unwrap(), "20250715100000");
    }

    #[test]
    fn test_resolve_ambiguous_lists_sorted_candidates() {
        // Deliberately unsorted, with a duplicate
        let ids = ["20250716090000", "20250715100000", "20250716090000"];
        match resolve("202507", ids) {
            Err(AppError::Ambiguous { prefix, candidates }) => {
                assert_eq!(prefix, "202507");
                assert_eq!(candidates, vec!["20250715100000", "20250716090000"]);
            }
            other => panic!("Expected Ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_duplicate_candidates_are_not_ambiguous() {
        let ids = ["20250715100000", "20250715100000"];
        assert_eq!(resolve("2025", ids).unwrap(), "20250715100000");
    }

    #[test]
    fn test_resolve_not_found_and_blank() {
        let ids = ["20250715100000"];
        assert_eq!(resolve("2024", ids).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(resolve("", ids).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(resolve("   ", ids).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
