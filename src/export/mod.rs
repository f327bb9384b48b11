//! Exporting entries and backing up the data directory.
//!
//! `export_entry` writes one entry to a destination chosen by the user, either
//! verbatim (`txt`, `md`) or wrapped in a small JSON document. The [`backup`]
//! module archives the whole data directory.

pub mod backup;

pub use backup::{create_backup, verify_backup, BackupManifest, BackupReport};

use crate::errors::{AppError, AppResult};
use crate::storage;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Output format of an exported entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Plain text, content copied verbatim.
    #[default]
    Txt,
    /// Markdown, content copied verbatim.
    Md,
    /// JSON object holding the source name and the content.
    Json,
}

impl ExportFormat {
    /// Picks the format from the destination's extension, falling back to
    /// [`ExportFormat::Txt`].
    ///
    /// ```
    /// use offjournal::export::ExportFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ExportFormat::from_destination(Path::new("out.JSON")), ExportFormat::Json);
    /// assert_eq!(ExportFormat::from_destination(Path::new("out")), ExportFormat::Txt);
    /// ```
    pub fn from_destination(destination: &Path) -> Self {
        destination
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }

    /// Lowercase name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::Validation(format!(
                "Unsupported export format '{}'. Use txt, md or json.",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    /// File that was written.
    pub output_path: PathBuf,
    /// Format that was used.
    #[serde(serialize_with = "serialize_format")]
    pub format: ExportFormat,
    /// Human-readable summary.
    pub message: String,
}

fn serialize_format<S: serde::Serializer>(format: &ExportFormat, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(format.as_str())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    source_filename: &'a str,
    export_format: &'a str,
    content: &'a str,
}

/// Exports the file at `source` to `destination`.
///
/// When `format` is `None` it is derived from the destination's extension.
/// An existing destination is replaced.
///
/// # Errors
///
/// - `AppError::NotFound` if `source` does not exist
/// - `AppError::Validation` if `destination` has no file name
/// - `AppError::Io` if reading or writing fails
pub fn export_entry(
    source: &Path,
    destination: &Path,
    format: Option<ExportFormat>,
) -> AppResult<ExportOutcome> {
    let format = format.unwrap_or_else(|| ExportFormat::from_destination(destination));
    if destination.file_name().is_none() {
        return Err(AppError::Validation(format!(
            "Export destination {} is not a file path",
            destination.display()
        )));
    }

    let content = fs::read_to_string(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            AppError::NotFound(format!("source file {} does not exist", source.display()))
        }
        _ => AppError::io_context("Failed to read export source", e),
    })?;

    let rendered = match format {
        ExportFormat::Txt | ExportFormat::Md => content,
        ExportFormat::Json => {
            let source_filename = source
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let document = JsonExport {
                source_filename,
                export_format: ExportFormat::Json.as_str(),
                content: &content,
            };
            serde_json::to_string_pretty(&document).map_err(|e| {
                AppError::io_context("Failed to serialize export", io::Error::from(e))
            })?
        }
    };

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io_context("Failed to create export directory", e))?;
    }
    storage::write_atomic(destination, rendered.as_bytes())?;

    info!("Exported {} as {}", source.display(), format);
    Ok(ExportOutcome {
        output_path: destination.to_path_buf(),
        format,
        message: format!("Exportado com sucesso para: {}", destination.display()),
    })
}
