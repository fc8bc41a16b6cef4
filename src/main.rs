//! labelpick - a terminal-based inline label picker.
//!
//! Connects to a label service, shows the labels attached to a resource, and
//! opens an inline picker to attach existing labels or create new ones.

mod api;
mod app;
mod config;
mod error;
mod events;
mod logging;
mod tasks;
mod ui;

use std::io;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::error;

use app::App;
use error::AppError;
use events::{Event, EventHandler};

/// Pick and create labels from your terminal.
#[derive(Debug, Parser)]
#[command(name = "labelpick", version, about)]
struct Cli {
    /// Base URL of the label service (overrides the config file).
    #[arg(long)]
    url: Option<String>,

    /// Organization id for label creation (overrides the config file).
    #[arg(long)]
    org: Option<String>,

    /// Label names to attach on startup. May be given multiple times.
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// Write the effective settings (after --url/--org) back to the config
    /// file.
    #[arg(long)]
    save: bool,

    /// Store an API token in the OS keyring and exit.
    #[arg(long, value_name = "TOKEN")]
    set_token: Option<String>,

    /// Print the log directory and exit.
    #[arg(long)]
    log_dir: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(token) = cli.set_token {
        api::auth::store_token("default", &token)?;
        println!("Token stored");
        return Ok(());
    }

    if cli.log_dir {
        match logging::log_directory() {
            Some(dir) => println!("{}", dir.display()),
            None => println!("Log directory could not be determined"),
        }
        return Ok(());
    }

    logging::init()?;

    let mut settings = match config::load() {
        Ok(settings) => settings,
        // The TUI is not up yet, so the friendly message goes to stderr.
        Err(e) => {
            let e = AppError::from(e);
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };
    if let Some(url) = cli.url {
        settings.service_url = url;
    }
    if let Some(org) = cli.org {
        settings.org_id = Some(org);
    }
    settings.validate().map_err(AppError::from)?;

    if cli.save {
        config::save(&settings).map_err(AppError::from)?;
    }

    let result = run(settings, cli.labels).await;

    logging::shutdown();
    result
}

/// Set up the terminal, run the event loop, and restore the terminal even
/// when the loop fails.
async fn run(settings: config::Settings, seed_labels: Vec<String>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, settings, seed_labels);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "Event loop failed");
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: config::Settings,
    seed_labels: Vec<String>,
) -> anyhow::Result<()> {
    let (mut rx, spawner) = tasks::create_task_channel();
    let events = EventHandler::with_tick_rate(settings.tick_rate_ms);
    let mut app = App::new(settings, spawner, seed_labels);

    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;

        while let Ok(message) = rx.try_recv() {
            app.on_api_message(message);
        }

        match events.next()? {
            Event::Tick => {}
            event => app.on_event(event),
        }
    }

    Ok(())
}
