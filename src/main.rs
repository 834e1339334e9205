//! debugmenu demo - a terminal scene with a debug command overlay.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, warn};

use debugmenu::app::App;
use debugmenu::AppError;
use debugmenu::commands::{self, CommandRegistry};
use debugmenu::config::Settings;
use debugmenu::events::EventHandler;
use debugmenu::logging;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "debugmenu", version, about)]
struct Cli {
    /// Path to a config file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with debug commands disabled.
    #[arg(long)]
    disable: bool,

    /// Key that toggles the overlay, e.g. "`", "~" or "F12".
    #[arg(short, long)]
    toggle_key: Option<String>,
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let settings = load_settings(&cli);
    let registry = commands::install(Rc::new(CommandRegistry::from_settings(&settings)));
    let mut app = App::new(registry, &settings);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal).context("failed to restore terminal")?;

    if let Err(e) = &result {
        error!("Application error: {}", e);
        eprintln!("{}", e.user_message());
    }
    drop(app);
    commands::uninstall();
    logging::shutdown();
    Ok(result?)
}

fn load_settings(cli: &Cli) -> Settings {
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = loaded.unwrap_or_else(|e| {
        let err = AppError::from(e);
        warn!("Failed to load config, using default: {}", err);
        eprintln!("{}", err.user_message());
        Settings::default()
    });

    if cli.disable {
        settings.enabled = false;
    }
    if let Some(key) = &cli.toggle_key {
        settings.toggle_key = key.clone();
    }
    settings
}

fn run(terminal: &mut Tui, app: &mut App) -> debugmenu::Result<()> {
    let events = EventHandler::new();
    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;
        app.update(events.next()?);
    }
    Ok(())
}

fn setup_terminal() -> debugmenu::Result<Tui> {
    enable_raw_mode().map_err(|e| AppError::terminal(format!("cannot enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| AppError::terminal(format!("cannot enter alternate screen: {e}")))?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
