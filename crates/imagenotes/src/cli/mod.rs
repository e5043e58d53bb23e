//! Command-line interface for imagenotes.
//!
//! This module provides the CLI structure for the `imgnote` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ListCommand, OutputFormat, RenderCommand,
    StatusCommand,
};

use crate::logging::Verbosity;

/// imgnote - Keep notes made of an image and a description
///
/// Notes are stored locally and can be listed, deleted, or rendered as an
/// HTML page of cards.
#[derive(Debug, Parser)]
#[command(name = "imgnote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a note from an image and a description
    Add(AddCommand),

    /// List saved notes, newest first
    List(ListCommand),

    /// Delete a note
    Delete(DeleteCommand),

    /// Render the notes as HTML
    Render(RenderCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
