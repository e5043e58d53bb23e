//! `imgnote` - CLI for imagenotes
//!
//! This binary adds, lists, deletes and renders image notes stored in the
//! local notes database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use imagenotes::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand, OutputFormat,
    RenderCommand,
};
use imagenotes::view::{AssumeYes, TerminalPrompter};
use imagenotes::{
    init_logging, AppContext, Config, DeleteOutcome, ImageDecoder, ImageFile, Note, NoteForm,
    Prompter, SqliteSlots, Store, View,
};

/// Longest description shown in a table row.
const TABLE_DESCRIPTION_WIDTH: usize = 48;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands load the file themselves so a broken file can be
    // inspected.
    match cli.command {
        Command::Add(cmd) => handle_add(&load_context(cli.config)?, &cmd).await,
        Command::List(cmd) => handle_list(&load_context(cli.config)?, &cmd),
        Command::Delete(cmd) => handle_delete(&load_context(cli.config)?, &cmd),
        Command::Render(cmd) => handle_render(&load_context(cli.config)?, &cmd),
        Command::Status(cmd) => handle_status(&load_context(cli.config)?, cmd.json),
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn load_context(path: Option<PathBuf>) -> Result<Arc<AppContext>> {
    let config = Config::load_from(path).context("failed to load configuration")?;
    Ok(Arc::new(AppContext::new(config)))
}

fn open_store(ctx: &Arc<AppContext>) -> Result<Store<SqliteSlots>> {
    let path = ctx.config().database_path();
    let backend = SqliteSlots::open(&path)
        .with_context(|| format!("failed to open notes database {}", path.display()))?;
    Ok(Store::new(backend, Arc::clone(ctx)))
}

fn open_view(
    ctx: &Arc<AppContext>,
    prompter: Box<dyn Prompter>,
) -> Result<View<SqliteSlots, Box<dyn Prompter>>> {
    let mut view = View::new(open_store(ctx)?, prompter);
    view.initial_render()?;
    Ok(view)
}

async fn handle_add(ctx: &Arc<AppContext>, cmd: &AddCommand) -> Result<()> {
    let mut view = open_view(ctx, Box::new(TerminalPrompter::stdio()))?;
    let decoder = ImageDecoder::new(Arc::clone(ctx));

    let mut form = NoteForm::filled(ImageFile::new(cmd.image.clone()), cmd.description_text());
    let note = view.submit(&mut form, &decoder).await?;

    println!("Added note {} ({})", note.id, note.date);
    Ok(())
}

fn handle_list(ctx: &Arc<AppContext>, cmd: &ListCommand) -> Result<()> {
    let store = open_store(ctx)?;
    let notes = store.load_with_policy()?;
    let limit = cmd.limit.unwrap_or(usize::MAX);
    let newest_first: Vec<&Note> = notes.iter().rev().take(limit).collect();

    match cmd.format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = newest_first
                .iter()
                .map(|note| {
                    serde_json::json!({
                        "id": note.id,
                        "date": note.date,
                        "description": note.description,
                        "image_type": note.image_mime(),
                        "image_bytes": note.image.len(),
                        "version": note.version,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Plain => {
            for note in &newest_first {
                println!("{}\t{}\t{}", note.id, note.date, note.description);
            }
        }
        OutputFormat::Table => {
            if newest_first.is_empty() {
                println!("{}", ctx.placeholder_text());
                return Ok(());
            }
            println!("{:<15} {:<12} {:<14} DESCRIPTION", "ID", "DATE", "TYPE");
            for note in &newest_first {
                println!(
                    "{:<15} {:<12} {:<14} {}",
                    note.id,
                    note.date,
                    note.image_mime().unwrap_or("-"),
                    truncate(&note.description, TABLE_DESCRIPTION_WIDTH)
                );
            }
        }
    }
    Ok(())
}

fn handle_delete(ctx: &Arc<AppContext>, cmd: &DeleteCommand) -> Result<()> {
    let prompter: Box<dyn Prompter> = if cmd.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompter::stdio())
    };
    let mut view = open_view(ctx, prompter)?;

    match view.delete(cmd.id)? {
        DeleteOutcome::Cancelled => println!("Cancelled."),
        DeleteOutcome::Deleted { remaining } => {
            println!("Deleted note {} ({} remaining)", cmd.id, remaining);
        }
    }
    Ok(())
}

fn handle_render(ctx: &Arc<AppContext>, cmd: &RenderCommand) -> Result<()> {
    let view = open_view(ctx, Box::new(AssumeYes))?;
    let html = if cmd.fragment {
        view.render_html()
    } else {
        view.render_page()
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn handle_status(ctx: &Arc<AppContext>, json: bool) -> Result<()> {
    let store = open_store(ctx)?;
    let stats = store.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": ctx.config().database_path(),
            "slot_key": ctx.slot_key(),
            "notes": stats.note_count,
            "slot_bytes": stats.slot_bytes,
            "oldest": stats.oldest,
            "newest": stats.newest,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("imgnote status");
        println!("--------------");
        println!("Database:      {}", stats.location);
        println!("Slot:          {}", ctx.slot_key());
        println!("Notes:         {}", stats.note_count);
        println!("Slot size:     {} bytes", stats.slot_bytes);
        if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
            println!("Oldest id:     {oldest}");
            println!("Newest id:     {newest}");
        }
    }
    Ok(())
}

fn handle_config(path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Slot key:           {}", config.storage.slot_key);
                println!(
                    "  Discard corrupt:    {}",
                    config.storage.discard_corrupt_slot
                );
                println!();
                println!("[Image]");
                match config.max_image_bytes() {
                    Some(max) => println!("  Max bytes:          {max}"),
                    None => println!("  Max bytes:          unlimited"),
                }
                println!(
                    "  Allowed types:      {}",
                    config.image.allowed_types.join(", ")
                );
                println!();
                println!("[View]");
                println!("  Title:              {}", config.view.title);
                println!("  Date format:        {}", config.view.date_format);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => return Err(e).context("configuration is invalid"),
            }
        }
    }
    Ok(())
}

/// First line of `text`, cut to `width` characters.
fn truncate(text: &str, width: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let cut = first_line.len() < text.len() || first_line.chars().count() > width;
    if !cut {
        return first_line.to_string();
    }
    let shortened: String = first_line.chars().take(width.saturating_sub(3)).collect();
    format!("{shortened}...")
}
