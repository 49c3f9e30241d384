use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use mathsolver::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // The credential check happens before the terminal is taken over so the
    // message stays readable.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging();
    info!(model = %config.model, "starting mathsolver");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(&config);
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("bye");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }
    }
    Ok(())
}

/// Log to a file; stderr belongs to the TUI. Failing to set up logging is
/// not fatal.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("mathsolver")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mathsolver.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("MATHSOLVER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
