/*!
# offjournal

offjournal is an offline journal for the terminal. Everything it knows lives in
one data directory on the local filesystem: markdown entries, a planner of
dated events, file attachments per entry. On top of those stores it offers a
keyword-based mood estimate, file encryption with age, exports and backups.

## Architecture

- `config`: Data directory and language, loaded from the environment
- `entry`: Entry files addressed by timestamp id or id prefix
- `planner`: Dated events persisted as one JSON document
- `media`: Attachments copied under a directory per entry
- `mood`: Distinct-keyword sentiment of an entry
- `crypto`: The `FileCipher` capability and its age implementation
- `export`: Entry export and tar.gz backups
- `storage`: Atomic replacement, advisory locks and permissions
- `identifier`: Timestamp ids and prefix resolution
- `cli`: Command-line definitions and dispatch
- `errors`: `AppError`, its kinds, and `AppResult`

## Usage Example

```rust,no_run
use offjournal::{Config, EntryStore, EventStore};

fn main() -> offjournal::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let entries = EntryStore::from_config(&config);
    let meta = entries.create("Meu primeiro dia")?;
    println!("{}", entries.read(&meta.id)?);

    let planner = EventStore::from_config(&config);
    planner.add("2025-12-25", "Natal")?;
    Ok(())
}
```
*/

/// Command-line interface definitions and dispatch
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// File encryption capability
pub mod crypto;
/// Journal entry store
pub mod entry;
/// Error types and utilities for error handling
pub mod errors;
/// Entry export and backups
pub mod export;
/// Entry id generation and prefix resolution
pub mod identifier;
/// Attachment store
pub mod media;
/// Mood analysis
pub mod mood;
/// Planner event store
pub mod planner;
/// Filesystem primitives shared by the stores
pub mod storage;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use entry::{EntryMeta, EntryStore};
pub use errors::{AppError, AppResult, ErrorKind};
pub use media::MediaStore;
pub use mood::{Mood, MoodAnalyzer, MoodScore};
pub use planner::{Event, EventStore};
