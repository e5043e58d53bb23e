//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::note::NoteId;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Image file to attach
    pub image: PathBuf,

    /// Description of the note (remaining words are joined with spaces)
    #[arg(required = true, trailing_var_arg = true)]
    pub description: Vec<String>,
}

impl AddCommand {
    /// The description as one string.
    #[must_use]
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Show at most N notes (newest first)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the note to delete
    pub id: NoteId,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Render command arguments.
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Write the HTML to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit only the notes container, not a full page
    #[arg(long)]
    pub fragment: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
