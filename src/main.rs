//! pagenav - run a navigation script headlessly
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use pagenav::headless::{load_script, run_script, HeadlessEvent};
use pagenav_app::config::load_settings;
use pagenav_core::logging;

/// pagenav - Form-factor-aware page navigation, driven from a script
#[derive(Parser, Debug)]
#[command(name = "pagenav")]
#[command(about = "Replay a navigation script and print NDJSON events", long_about = None)]
struct Args {
    /// Path to the navigation script (TOML)
    #[arg(long, value_name = "FILE")]
    script: PathBuf,

    /// Write logs under the local data directory (level from PAGENAV_LOG)
    #[arg(long)]
    log: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // Held until exit so the file writer flushes
    let _log_guard = if args.log {
        Some(logging::init()?)
    } else {
        None
    };

    let mut script = match load_script(&args.script) {
        Ok(script) => script,
        Err(e) => {
            HeadlessEvent::error(format!("{}: {}", args.script.display(), e), true).emit();
            return Err(e.into());
        }
    };

    // Scripts without a [settings] table use the project config next to them
    if script.settings.is_none() {
        let project_dir = args
            .script
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        script.settings = Some(load_settings(&project_dir));
    }

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<HeadlessEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            event.emit();
        }
    });

    let result = run_script(script, events_tx).await;
    // Sender is gone once run_script returns, so the printer drains and exits
    printer.await?;

    if let Err(e) = result {
        HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
        return Err(e.into());
    }

    Ok(())
}
