//! `sodo-tui`: terminal editor for floor-plan device surveys.
//!
//! Places cameras, switches and other devices on a floor plan, links
//! them, and reports a bill of materials. Screens are navigable via
//! number keys (1-3): Map, Inventory, and Report.
//!
//! Logs go to a file (default `<temp>/sodo-tui.log`) so they never
//! corrupt the terminal. Every edit is written through to the saved
//! project in the data directory.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use sodo_core::{Editor, FileSlot, ProjectStore};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::action::Notification;
use crate::app::App;

/// Terminal editor for floor-plan device surveys.
#[derive(Parser, Debug)]
#[command(name = "sodo-tui", version, about)]
struct Cli {
    /// Open a share link (or bare payload) in a read-only session
    #[arg(long, env = "SODO_SHARE")]
    share: Option<String>,

    /// Directory holding the saved project
    #[arg(long, env = "SODO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log file path (defaults to <temp>/sodo-tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Hold the guard for the life of the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("sodo_tui={log_level},sodo_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("sodo-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("sodo-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = sodo_config::load_config()?;
    config.validate()?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
    let store = ProjectStore::open(Arc::new(FileSlot::new(data_dir.clone())), cli.share.as_deref());
    let fell_back = cli.share.is_some() && !store.is_read_only();
    if fell_back {
        warn!("share link could not be decoded; opened the saved project");
    }
    info!(
        data_dir = %data_dir.display(),
        origin = ?store.origin(),
        read_only = store.is_read_only(),
        "starting sodo-tui"
    );

    let editor = Editor::new(store, config.editor.range_policy);
    let mut app = App::new(editor, config);
    if fell_back {
        app.notify(Notification::warning(
            "Share link could not be read; showing your saved project",
        ));
    }
    app.run().await
}
