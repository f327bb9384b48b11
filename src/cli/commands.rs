//! Executes parsed subcommands against the stores.
//!
//! Output goes to the writer passed in, and `update` reads new content from
//! the reader when no `--file` is given, so the whole flow runs without a
//! terminal.

use super::{Command, MediaCommand, PlannerCommand};
use crate::config::Config;
use crate::crypto::{AgeCipher, FileCipher};
use crate::entry::EntryStore;
use crate::errors::{AppError, AppResult};
use crate::export::{self, ExportFormat};
use crate::media::MediaStore;
use crate::mood::{Lexicon, Mood, MoodAnalyzer};
use crate::planner::EventStore;
use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Runs one subcommand.
///
/// # Errors
///
/// Propagates the store error of the operation, or `AppError::Io` if the
/// output cannot be written.
pub fn execute<R: Read, W: Write>(
    command: Command,
    config: &Config,
    input: &mut R,
    out: &mut W,
) -> AppResult<()> {
    debug!("Executing {:?}", command);
    let entries = EntryStore::from_config(config);

    match command {
        Command::New { title } => {
            let meta = entries.create(&title)?;
            writeln!(
                out,
                "Sucesso: Entrada '{}' criada com ID {} ({})",
                meta.title, meta.id, meta.filename
            )?;
        }
        Command::Read { id } => {
            let content = entries.read(&id)?;
            write!(out, "{}", content)?;
            if !content.ends_with('\n') {
                writeln!(out)?;
            }
        }
        Command::List { json } => {
            let listed = entries.list()?;
            if json {
                let rendered = serde_json::to_string_pretty(&listed)
                    .map_err(|e| AppError::io_context("Failed to render JSON", e.into()))?;
                writeln!(out, "{}", rendered)?;
            } else if listed.is_empty() {
                writeln!(out, "Nenhuma entrada no diário encontrada.")?;
            } else {
                writeln!(out, "--- Entradas do Diário ---")?;
                for meta in listed {
                    writeln!(out, "  ID: {} | Título: {}", meta.id, meta.title)?;
                }
            }
        }
        Command::Update { id, file } => {
            let content = match file {
                Some(path) => fs::read_to_string(&path).map_err(|e| {
                    AppError::io_context(format!("Failed to read {}", path.display()), e)
                })?,
                None => {
                    let mut buffer = String::new();
                    input
                        .read_to_string(&mut buffer)
                        .map_err(|e| AppError::io_context("Failed to read standard input", e))?;
                    buffer
                }
            };
            let meta = entries.update(&id, &content)?;
            writeln!(out, "Sucesso: Entrada {} atualizada.", meta.id)?;
        }
        Command::Delete { id } => {
            let meta = entries.delete(&id)?;
            writeln!(out, "Sucesso: Entrada {} ({}) apagada.", meta.id, meta.filename)?;
        }
        Command::Planner { command } => planner(command, &EventStore::from_config(config), out)?,
        Command::Media { command } => media(command, &MediaStore::from_config(config), out)?,
        Command::Mood { id } => {
            let analyzer = MoodAnalyzer::new(entries, Lexicon::for_language(config.language));
            let score = analyzer.analyze(&id)?;
            writeln!(
                out,
                "Entrada {}: {} (positivas: {}, negativas: {})",
                score.entry_id,
                mood_label(score.mood),
                score.positive_score,
                score.negative_score
            )?;
        }
        Command::Encrypt { path, recipient } => {
            let outcome = AgeCipher::new().encrypt(&absolute(&path)?, &recipient)?;
            writeln!(out, "Sucesso: {}", outcome.message)?;
        }
        Command::Decrypt { path, identity } => {
            let outcome = AgeCipher::new().decrypt(&absolute(&path)?, &identity)?;
            writeln!(out, "Sucesso: {}", outcome.message)?;
        }
        Command::Export {
            id,
            destination,
            format,
        } => {
            let format = format.as_deref().map(str::parse::<ExportFormat>).transpose()?;
            let source = entries.path_of(&id)?;
            let outcome = export::export_entry(&source, &absolute(&destination)?, format)?;
            writeln!(out, "Sucesso: {}", outcome.message)?;
        }
        Command::Backup { destination } => {
            let report = export::create_backup(config, &absolute(&destination)?)?;
            writeln!(
                out,
                "Sucesso: Backup criado com {} entradas, {} anexos{} ({} bytes)",
                report.entries,
                report.attachments,
                if report.planner_included {
                    " e o planejador"
                } else {
                    ""
                },
                report.archive_size
            )?;
            writeln!(out, "BLAKE3: {}", report.checksum)?;
        }
        Command::VerifyBackup { archive } => {
            let manifest = export::verify_backup(&absolute(&archive)?)?;
            for path in manifest.entries.iter().chain(manifest.attachments.iter()) {
                writeln!(out, "  {}", path.display())?;
            }
            writeln!(
                out,
                "{} entradas, {} anexos, planejador: {}",
                manifest.entries.len(),
                manifest.attachments.len(),
                if manifest.planner_included { "sim" } else { "não" }
            )?;
            writeln!(out, "BLAKE3: {}", manifest.checksum)?;
        }
    }
    Ok(())
}

fn planner<W: Write>(command: PlannerCommand, events: &EventStore, out: &mut W) -> AppResult<()> {
    match command {
        PlannerCommand::List => {
            let listed = events.list()?;
            if listed.is_empty() {
                writeln!(out, "Nenhum evento no planejador.")?;
            } else {
                writeln!(out, "--- Eventos do Planejador ---")?;
                for event in listed {
                    writeln!(
                        out,
                        "  ID: {:<3} | Data: {} | Título: {}",
                        event.id, event.date, event.title
                    )?;
                }
            }
        }
        PlannerCommand::Add { date, title } => {
            let event = events.add(&date, &title)?;
            writeln!(
                out,
                "Sucesso: Evento '{}' adicionado com ID {}.",
                event.title, event.id
            )?;
        }
        PlannerCommand::Update { id, date, title } => {
            let event = events.update(id, date.as_deref(), title.as_deref())?;
            writeln!(
                out,
                "Sucesso: Evento {} atualizado: {} | {}",
                event.id, event.date, event.title
            )?;
        }
        PlannerCommand::Del { id } => {
            let event = events.delete(id)?;
            writeln!(out, "Sucesso: Evento '{}' (ID {}) removido.", event.title, event.id)?;
        }
    }
    Ok(())
}

fn media<W: Write>(command: MediaCommand, store: &MediaStore, out: &mut W) -> AppResult<()> {
    match command {
        MediaCommand::Add { entry_id, file } => {
            let name = store.add(&entry_id, &file)?;
            writeln!(out, "Sucesso: '{}' anexado à entrada {}.", name, entry_id)?;
        }
        MediaCommand::List { entry_id } => {
            let names = store.list(&entry_id)?;
            if names.is_empty() {
                writeln!(out, "Nenhum anexo para a entrada {}.", entry_id)?;
            }
            for name in names {
                writeln!(out, "{}", name)?;
            }
        }
        MediaCommand::Rm { entry_id, filename } => {
            store.remove(&entry_id, &filename)?;
            writeln!(out, "Sucesso: '{}' removido da entrada {}.", filename, entry_id)?;
        }
    }
    Ok(())
}

fn mood_label(mood: Mood) -> &'static str {
    match mood {
        Mood::Positive => "Positivo",
        Mood::Negative => "Negativo",
        Mood::Neutral => "Neutro",
    }
}

/// Resolves `path` against the working directory.
fn absolute(path: &Path) -> AppResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd =
        env::current_dir().map_err(|e| AppError::io_context("Failed to read working directory", e))?;
    Ok(cwd.join(path))
}
