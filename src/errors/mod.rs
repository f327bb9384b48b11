//! Error handling utilities for the offjournal application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Every store operation returns an `AppResult`. Low-level I/O failures are
//! wrapped at the store boundary, and callers branch on [`AppError::kind`]
//! rather than on raw `std::io::Error`s.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur when locking a store file.
///
/// # Examples
///
/// ```
/// use offjournal::errors::LockError;
/// use std::path::PathBuf;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::PermissionDenied, "permission denied");
/// let error = LockError::AcquisitionFailed {
///     path: PathBuf::from("/path/to/planner.lock"),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("Failed to acquire lock"));
/// assert!(format!("{}", error).contains("permission denied"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path to the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// # Examples
///
/// ```
/// use offjournal::errors::CryptoError;
///
/// let error = CryptoError::InvalidRecipient("not-a-key".to_string());
/// assert!(format!("{}", error).contains("not-a-key"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The recipient string is not a valid age public key.
    #[error("Invalid recipient '{0}'. Expected an age public key starting with 'age1'.")]
    InvalidRecipient(String),

    /// The identity could not be parsed, inline or from an identity file.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Encrypted data uses an unsupported encryption format (e.g. passphrase files).
    #[error("Unsupported encryption format")]
    UnsupportedFormat,

    /// Invalid file path provided for an encryption operation.
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    /// age refused to start the encrypted stream.
    #[error("Encryption setup failed: {0}")]
    EncryptorSetupFailed(#[source] age::EncryptError),

    /// Error while writing the encrypted stream.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(#[source] io::Error),

    /// The encrypted payload failed authentication while streaming.
    #[error("Encrypted payload is corrupt or was tampered with: {0}")]
    PayloadCorrupted(#[source] io::Error),

    /// Error during decryption operation.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(#[source] age::DecryptError),
}

/// Stable classification of an [`AppError`].
///
/// The message carried by an error is meant for humans and may change; the
/// kind is what callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is blank or malformed.
    Validation,
    /// An id, prefix, or file does not resolve.
    NotFound,
    /// A prefix resolves to more than one id.
    Ambiguous,
    /// The target already exists (duplicate attachment name).
    Conflict,
    /// Filesystem, permission, locking, or serialization failure.
    IoFailure,
    /// A store document exists but cannot be parsed.
    CorruptStore,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Encryption or decryption failed.
    Crypto,
}

impl ErrorKind {
    /// Short machine-friendly name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::Conflict => "conflict",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::CorruptStore => "corrupt_store",
            ErrorKind::Config => "config",
            ErrorKind::Crypto => "crypto",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents all possible errors that can occur in the offjournal application.
///
/// Note: This type does not implement `Clone` to avoid losing error context when
/// cloning `std::io::Error` values.
///
/// # Examples
///
/// Creating a validation error:
/// ```
/// use offjournal::errors::{AppError, ErrorKind};
///
/// let error = AppError::Validation("Title cannot be empty".to_string());
/// assert_eq!(format!("{}", error), "Invalid input: Title cannot be empty");
/// assert_eq!(error.kind(), ErrorKind::Validation);
/// ```
///
/// Converting from an IO error:
/// ```
/// use offjournal::errors::{AppError, ErrorKind};
/// use std::io;
///
/// let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
/// assert_eq!(app_error.kind(), ErrorKind::IoFailure);
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field is blank or malformed.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A prefix matched more than one record.
    #[error("Prefix '{prefix}' is ambiguous; it matches: {}", .candidates.join(", "))]
    Ambiguous {
        /// The prefix supplied by the caller
        prefix: String,
        /// Every matching id, sorted ascending
        candidates: Vec<String>,
    },

    /// The target already exists and is never overwritten implicitly.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A store document is present but unparsable.
    #[error("Store file {path} is corrupt: {source}. Fix or move the file aside; it has not been modified.")]
    CorruptStore {
        /// The corrupt document
        path: PathBuf,
        /// The parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Errors related to file locking.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

impl AppError {
    /// Returns the stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::Config,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Ambiguous { .. } => ErrorKind::Ambiguous,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Io(_) | AppError::Lock(_) => ErrorKind::IoFailure,
            AppError::CorruptStore { .. } => ErrorKind::CorruptStore,
            AppError::Crypto(_) => ErrorKind::Crypto,
        }
    }

    /// Wraps an I/O error with a description of the operation that failed,
    /// keeping the original `io::ErrorKind`.
    pub(crate) fn io_context(context: impl fmt::Display, err: io::Error) -> Self {
        AppError::Io(io::Error::new(err.kind(), format!("{}: {}", context, err)))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use offjournal::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::NotFound("entry 2025".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
