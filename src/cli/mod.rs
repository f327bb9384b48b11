//! Command-line interface definitions.
//!
//! Subcommands keep the Portuguese names of the original tool as aliases, so
//! both `offjournal new "Dia"` and `offjournal nova "Dia"` work.

pub mod commands;

use crate::constants::{APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// An offline journal with a planner, attachments and mood analysis
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(
        long,
        global = true,
        default_value = LOG_FORMAT_TEXT,
        value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON]
    )]
    pub log_format: String,

    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create a new entry
    #[command(alias = "nova")]
    New {
        /// Entry title
        title: String,
    },

    /// Print an entry
    #[command(alias = "ler")]
    Read {
        /// Entry id or unambiguous id prefix
        id: String,
    },

    /// List entries, newest first
    #[command(alias = "listar")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Replace an entry's content with a file or standard input
    #[command(alias = "editar")]
    Update {
        /// Entry id or unambiguous id prefix
        id: String,
        /// Read the new content from this file instead of standard input
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete an entry
    #[command(alias = "apagar")]
    Delete {
        /// Entry id or unambiguous id prefix
        id: String,
    },

    /// Manage planner events
    Planner {
        #[command(subcommand)]
        command: PlannerCommand,
    },

    /// Manage entry attachments
    #[command(alias = "midia")]
    Media {
        #[command(subcommand)]
        command: MediaCommand,
    },

    /// Analyze the mood of an entry
    #[command(alias = "humor")]
    Mood {
        /// Entry id or unambiguous id prefix
        id: String,
    },

    /// Encrypt a file for an age recipient
    #[command(alias = "criptografar")]
    Encrypt {
        /// File to encrypt
        path: PathBuf,
        /// age public key (age1...)
        #[arg(short, long)]
        recipient: String,
    },

    /// Decrypt a .age file
    #[command(alias = "descriptografar")]
    Decrypt {
        /// File to decrypt
        path: PathBuf,
        /// age secret key, or path to an identity file
        #[arg(short, long)]
        identity: String,
    },

    /// Export an entry as txt, md or json
    #[command(alias = "exportar")]
    Export {
        /// Entry id or unambiguous id prefix
        id: String,
        /// Destination file
        destination: PathBuf,
        /// Output format; derived from the destination extension when omitted
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Archive the whole data directory into a tar.gz file
    Backup {
        /// Archive to write
        destination: PathBuf,
    },

    /// List the contents of a backup archive and print its checksum
    VerifyBackup {
        /// Archive to read
        archive: PathBuf,
    },
}

/// `planner` subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PlannerCommand {
    /// List events, soonest first
    #[command(alias = "listar")]
    List,

    /// Add an event
    Add {
        /// Date in YYYY-MM-DD format
        date: String,
        /// Event title
        title: String,
    },

    /// Change an event's date and/or title
    Update {
        /// Event id
        id: u64,
        /// New date in YYYY-MM-DD format
        #[arg(long)]
        date: Option<String>,
        /// New title
        #[arg(long)]
        title: Option<String>,
    },

    /// Remove an event
    #[command(alias = "delete")]
    Del {
        /// Event id
        id: u64,
    },
}

/// `media` subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MediaCommand {
    /// Copy a file into an entry's attachments
    Add {
        /// Entry id the attachment belongs to
        entry_id: String,
        /// File to attach
        file: PathBuf,
    },

    /// List an entry's attachments
    #[command(alias = "listar")]
    List {
        /// Entry id
        entry_id: String,
    },

    /// Remove an attachment
    #[command(alias = "remove")]
    Rm {
        /// Entry id
        entry_id: String,
        /// Attachment file name
        filename: String,
    },
}
