//! File encryption for entries and exports.
//!
//! Encryption is a capability injected behind the [`FileCipher`] trait. The
//! shipped implementation, [`AgeCipher`], uses the age format with x25519
//! keys: `encrypt` writes `<path>.age` next to the source and `decrypt` writes
//! the `.age` file back to the path without that extension. Existing outputs
//! are replaced atomically; sources are never removed.
//!
//! # Example
//!
//! ```no_run
//! use offjournal::crypto::{AgeCipher, FileCipher};
//! use std::path::Path;
//!
//! let cipher = AgeCipher::new();
//! let outcome = cipher.encrypt(
//!     Path::new("/home/me/.offjournal/entries/20250715100000_Dia.md"),
//!     "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p",
//! )?;
//! println!("{}", outcome.message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod age;

use crate::constants::ENCRYPTED_FILE_EXTENSION;
use crate::errors::{AppError, AppResult, CryptoError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use self::age::AgeCipher;

/// Result of a successful encrypt or decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CipherOutcome {
    /// File that was written.
    pub output_path: PathBuf,
    /// Human-readable summary.
    pub message: String,
}

/// Encrypts and decrypts whole files.
pub trait FileCipher {
    /// Encrypts `path` for `recipient`, writing `<path>.age`.
    fn encrypt(&self, path: &Path, recipient: &str) -> AppResult<CipherOutcome>;

    /// Decrypts a `.age` file with `identity`, writing the path without the
    /// extension.
    fn decrypt(&self, path: &Path, identity: &str) -> AppResult<CipherOutcome>;
}

/// `notes.md` becomes `notes.md.age`.
pub fn encrypted_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ENCRYPTED_FILE_EXTENSION);
    PathBuf::from(name)
}

/// `notes.md.age` becomes `notes.md`.
///
/// # Errors
///
/// `CryptoError::InvalidPath` if `path` does not end in `.age` or has nothing
/// before the extension.
pub fn decrypted_path(path: &Path) -> AppResult<PathBuf> {
    let has_extension =
        path.extension().and_then(|ext| ext.to_str()) == Some(ENCRYPTED_FILE_EXTENSION);
    let stem_is_usable = path
        .file_stem()
        .map(|stem| !stem.is_empty())
        .unwrap_or(false);
    if !has_extension || !stem_is_usable {
        return Err(CryptoError::InvalidPath(format!(
            "{} does not have the .{} extension",
            path.display(),
            ENCRYPTED_FILE_EXTENSION
        ))
        .into());
    }
    Ok(path.with_extension(""))
}

/// Fails with `NotFound` unless `path` is an existing regular file.
pub(crate) fn require_input(path: &Path) -> AppResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "file {} does not exist",
            path.display()
        )))
    }
}
