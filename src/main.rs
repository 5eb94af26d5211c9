use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod document;
mod domain;
mod filter;
mod inputter;
mod loader;
mod modal;
mod model;
mod selection;
mod sorter;
mod table;
mod ui;

use controller::Controller;
use domain::{DEFAULT_SELECTION_LIMIT, FVError, PageConfig};
use model::{Model, Status};
use ui::PageUI;

/// Browse the family library results: pick up to N friends, sort and filter
/// the aggregated table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Aggregated results file (csv, parquet or arrow)
    results: String,

    /// Friends csv with `vanity,steam64_id` columns
    #[arg(short, long)]
    friends: Option<String>,

    /// Maximum number of friends that can be selected
    #[arg(short, long, default_value_t = DEFAULT_SELECTION_LIMIT)]
    limit: usize,

    /// Where to write logs, filtered by RUST_LOG
    #[arg(long, default_value = "famview.log")]
    log_file: String,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, FVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.into_owned()))
        .map_err(|e| FVError::LoadingFailed(e.to_string()))
}

fn init_tracing(log_file: &Path) -> Result<(), FVError> {
    let file = File::create(log_file)?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), FVError> {
    init_tracing(&expand_path(&args.log_file)?)?;

    let config = PageConfig::default()
        .selection_limit(args.limit)
        .event_poll_time(args.poll_ms);

    let results = expand_path(&args.results)?;
    let friends = args.friends.as_deref().map(expand_path).transpose()?;
    info!("Loading {} (friends: {:?})", results.display(), friends);
    let document = loader::load_page(&results, friends.as_deref(), &config)?;

    let mut model = Model::init(&config, document);
    let mut ui = PageUI::new();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture)?;
    let size = terminal.size()?;
    model.update(Some(domain::Message::Resize(
        size.width as usize,
        size.height as usize,
    )));

    let result = (|| -> Result<(), FVError> {
        while model.status != Status::QUITTING {
            terminal.draw(|f| ui.draw(&model, f))?;
            let message = controller.handle_event(&model)?;
            model.update(message);
        }
        Ok(())
    })();

    execute!(std::io::stdout(), DisableMouseCapture)?;
    ratatui::restore();
    info!("Quitting famview");
    result
}
