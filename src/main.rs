mod app;
mod catalog;
mod config;
mod domain;
mod error;
mod filters;
mod handlers;
mod icons;
mod infra;
mod navigation;
mod paths;
mod probe;
mod scan;
mod selection;
mod suggest;
mod terminal;
mod ui;

use crate::app::App;
use crate::config::AppConfig;
use crate::domain::DialogKind;
use crate::filters::Filters;
use crate::handlers::{handle_key_event, handle_scan_event};
use crate::infra::{Filesystem, LocalFilesystem};
use crate::navigation::{NavigationEngine, NavigationOptions};
use crate::scan::ScanEvent;
use crate::selection::SelectionWorkflow;
use crate::terminal::{PickerTerminal, restore_terminal, setup_terminal};
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use crossterm::event::{self, Event, KeyEventKind};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Open,
    Save,
    #[value(name = "dir")]
    Directory,
}

#[derive(Debug, Parser)]
#[command(
    name = "fspick",
    version,
    about = "Pick a file or directory in the terminal; the choice is printed to stdout"
)]
struct Args {
    /// Directory to start browsing in
    #[arg(default_value = ".")]
    location: String,

    /// What kind of path to pick
    #[arg(short, long, value_enum, default_value_t = Mode::Open)]
    mode: Mode,

    /// Open mode: accept files that do not exist yet
    #[arg(long)]
    allow_missing: bool,

    /// Save mode: refuse to pick an existing file
    #[arg(long)]
    no_overwrite: bool,

    /// Named file filter, e.g. "Rust=rs,toml" (repeatable, first is active)
    #[arg(long = "filter", value_name = "NAME=EXT,EXT")]
    filters: Vec<String>,

    /// File name to pre-fill the input with
    #[arg(long)]
    default_file: Option<String>,

    /// Show dot-files from the start
    #[arg(long)]
    show_hidden: bool,

    /// Write a debug log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn dialog_kind(&self) -> DialogKind {
        match self.mode {
            Mode::Open => DialogKind::Open {
                must_exist: !self.allow_missing,
            },
            Mode::Save => DialogKind::Save {
                can_overwrite: !self.no_overwrite,
            },
            Mode::Directory => DialogKind::SelectDirectory,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match AppConfig::load_or_default() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load config, using defaults: {err:#}");
            AppConfig::default()
        }
    };

    let log_file = args.log_file.as_deref().or(config.log_file.as_deref());
    init_logging(log_file, config.level_filter())?;
    if let Some(warning) = config.version_warning() {
        eprintln!("{warning}");
        log::warn!("{warning}");
    }

    let fs: Arc<dyn Filesystem> = Arc::new(LocalFilesystem);
    let start = start_location(fs.as_ref(), &args.location)?;
    let kind = args.dialog_kind();
    let filters = Filters::from_specs(&args.filters)?;
    log::info!(
        "fspick starting: mode={:?} location={} filters={:?}",
        args.mode,
        start.display(),
        filters.names()
    );

    let (scan_tx, scan_rx) = mpsc::unbounded_channel::<ScanEvent>();
    let options = NavigationOptions {
        show_hidden: args.show_hidden || config.show_hidden,
        show_files: kind.shows_files(),
        sort: config.sort_entries,
        filter: None,
    };
    let engine = NavigationEngine::new(fs, &start, options, scan_tx);
    let workflow = SelectionWorkflow::new(kind).with_default_file(args.default_file.as_deref());
    let icons = icons::picker_for(config.ascii_icons);
    let app = App::new(config, engine, workflow, filters, icons);

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, app, scan_rx).await;
    restore_terminal(&mut terminal)?;

    match run_result {
        Ok(Some(path)) => {
            println!("{}", path.display());
            Ok(())
        }
        Ok(None) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn run_app(
    terminal: &mut PickerTerminal,
    mut app: App,
    mut scan_rx: UnboundedReceiver<ScanEvent>,
) -> Result<Option<PathBuf>> {
    while !app.should_quit {
        while let Ok(event) = scan_rx.try_recv() {
            handle_scan_event(&mut app, event);
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(50)).context("event poll failed")?
            && let Event::Key(key) = event::read().context("event read failed")?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(&mut app, key);
        }
    }

    Ok(app.accepted_path())
}

fn start_location(fs: &dyn Filesystem, raw: &str) -> Result<PathBuf> {
    let expanded = paths::expand_home(fs, raw).context("failed to expand start location")?;
    let location = paths::absolutize(&expanded, &paths::working_dir());
    if !probe::is_dir(fs, &location) {
        bail!("not a directory: {}", location.display());
    }
    Ok(location)
}

// stderr belongs to the UI, so logs only go to a file when one is asked for.
fn init_logging(path: Option<&Path>, level: LevelFilter) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to create log file: {}", path.display()))?;
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, log_config, file).context("failed to initialise logger")?;
    Ok(())
}
