use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod college;
mod controller;
mod domain;
mod inputter;
mod model;
mod ui;
mod view;

use college::Dataset;
use controller::Controller;
use domain::{CTConfig, CTError, ColumnLayout, SearchButton};
use model::{Model, Status};
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with a list of college records, the bundled list is used if omitted
    dataset: Option<String>,

    /// Number of records loaded per page
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    page_size: u16,

    /// Columns shown next to name, rating, fees and user review
    #[arg(long, value_enum, default_value_t = ColumnLayout::Featured)]
    layout: ColumnLayout,

    /// Behaviour of the button next to the search field
    #[arg(long, value_enum, default_value_t = SearchButton::Search)]
    button: SearchButton,

    /// Maximal width of the name column
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Event poll time in ms
    #[arg(long, default_value_t = 100)]
    poll: u64,

    /// Hide notifications after this many ms, they stay until dismissed otherwise
    #[arg(long)]
    toast_timeout: Option<u64>,

    /// Write logs to this file, filtered by RUST_LOG (default info)
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn config(&self) -> CTConfig {
        let config = CTConfig::default()
            .with_items_per_page(self.page_size as usize)
            .with_layout(self.layout)
            .with_search_button(self.button)
            .with_max_column_width(self.max_column_width)
            .with_event_poll_time(self.poll);
        match self.toast_timeout {
            Some(timeout) => config.with_toast_timeout(timeout),
            None => config,
        }
    }
}

fn expand_path(path: &str) -> Result<PathBuf, CTError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| CTError::LoadingFailed(format!("Can not expand {path}: {e}")))
}

// The terminal belongs to the table, logs only go to a file.
fn setup_logging(path: &str) -> Result<(), CTError> {
    let file = File::create(expand_path(path)?)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args) -> Result<(), CTError> {
    if let Some(path) = &args.log {
        setup_logging(path)?;
    }
    info!("Starting ct!");

    let cfg = args.config();
    let dataset = match &args.dataset {
        Some(path) => Dataset::load(expand_path(path)?)?,
        None => Dataset::bundled(),
    };

    let mut terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableMouseCapture) {
        error!("No mouse support: {e:?}");
    }
    let result = event_loop(&cfg, dataset, &mut terminal);
    if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture) {
        error!("Failed to release the mouse: {e:?}");
    }
    ratatui::restore();
    result
}

fn event_loop(
    cfg: &CTConfig,
    dataset: Dataset,
    terminal: &mut DefaultTerminal,
) -> Result<(), CTError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, size.width as usize, size.height as usize);
    model.load_dataset(dataset);

    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message);
    }
    info!("Quitting ct!");
    Ok(())
}
