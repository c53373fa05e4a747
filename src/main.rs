//! bakery-ocr - A terminal client for the Bakery OCR extraction service
//!
//! Select a photo of a price list or menu, send it to the extraction service
//! and browse, toggle and export the returned table.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod error;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::model::ProcessingMode;
use crate::services::HttpExtractionService;
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bakery-ocr",
    version,
    about = "Extract bakery price lists and menus from photos"
)]
struct Cli {
    /// Image to select at startup.
    file: Option<PathBuf>,

    /// Extraction service base URL.
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Processing mode: auto, table or text.
    #[arg(long)]
    mode: Option<ProcessingMode>,

    /// Directory for bakery_items.json / bakery_items.csv.
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

/// Config for this run: stored config with command-line overrides
fn effective_config(stored: &Config, cli: &Cli) -> Config {
    let mut config = stored.clone();
    if let Some(ref server) = cli.server {
        config.server_url = server.clone();
    }
    if let Some(mode) = cli.mode {
        config.default_mode = mode;
    }
    if let Some(ref dir) = cli.export_dir {
        config.export_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = secs;
    }
    config
}

/// Log to `~/.bakery-ocr/bakery-ocr.log`; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let dir = Config::config_dir().context("Could not determine config directory")?;
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("bakery-ocr.log"))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {:#}", e);
    }

    let mut stored = Config::load().unwrap_or_default();
    let config = effective_config(&stored, &cli);
    tracing::info!(server = %config.server_url, mode = %config.default_mode, "starting");

    let service = HttpExtractionService::new(
        &config.server_url,
        config.request_timeout(),
        config.health_timeout(),
    )
    .context("Could not create the HTTP client")?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    let mut app = App::new(config, Arc::new(service));
    app.update(Action::CheckServer)?;
    if let Some(path) = cli.file {
        app.update(Action::SelectPath(path))?;
    }

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    stored.default_mode = app.mode();
    if let Err(e) = stored.save() {
        tracing::warn!(error = %e, "could not save config");
    }

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting on error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(e) = app.draw(frame, area) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Paste(text) => app.handle_paste_event(text)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        } else {
            // No event - send a tick for time-based updates
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
