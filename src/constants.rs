//! Constants used throughout the application.
//!
//! This module contains all constants used in offjournal, organized into
//! logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "offjournal";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Your offline journal and planner in the terminal";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the offjournal data directory.
pub const ENV_VAR_OFFJOURNAL_DIR: &str = "OFFJOURNAL_DIR";
/// Environment variable selecting the mood vocabulary language.
pub const ENV_VAR_OFFJOURNAL_LANG: &str = "OFFJOURNAL_LANG";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default data directory name within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".offjournal";
/// Sub-directory of the data directory holding entry files.
pub const ENTRIES_SUBDIR: &str = "entries";
/// Sub-directory of the data directory holding per-entry attachments.
pub const MEDIA_SUBDIR: &str = "media";
/// File name of the planner document.
pub const PLANNER_FILE_NAME: &str = "planner.json";
/// File name of the advisory lock guarding the planner document.
pub const PLANNER_LOCK_FILE_NAME: &str = "planner.lock";
/// File name of the advisory lock guarding the entries directory.
pub const ENTRIES_LOCK_FILE_NAME: &str = ".entries.lock";

// Validation
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// File extension for journal entries.
pub const ENTRY_FILE_EXTENSION: &str = "md";
/// Separator between the id and the sanitized title in entry filenames.
pub const ENTRY_FILENAME_SEPARATOR: char = '_';
/// Title reported for entry files whose name carries no title part.
pub const UNTITLED_ENTRY_TITLE: &str = "Sem Título";
/// Extension appended to encrypted files.
pub const ENCRYPTED_FILE_EXTENSION: &str = "age";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Date/Time Logic
/// Format of entry identifiers (14 digits, second precision).
pub const ENTRY_ID_FORMAT: &str = "%Y%m%d%H%M%S";
/// Number of characters in an entry identifier.
pub const ENTRY_ID_LEN: usize = 14;
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Timestamp format used in the entry template's creation line.
pub const ENTRY_CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Label preceding the creation timestamp in a new entry.
pub const ENTRY_CREATED_LABEL: &str = "Data:";
/// Placeholder body line of a new entry.
pub const ENTRY_PLACEHOLDER_LINE: &str = "Escreva seus pensamentos aqui...";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "offjournal";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
