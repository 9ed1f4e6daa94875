use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

mod app;
mod assistant;
mod config;
mod contact;
mod handler;
mod openai;
mod transcript;
mod tui;
mod ui;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        // Ticks arrive every 300ms, so finished reply tasks are reaped
        // promptly even when the user isn't typing.
        app.poll_tasks().await;

        terminal.draw(|frame| ui::render(frame, &mut app))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

/// Logs go to a file because the terminal itself belongs to the UI.
fn init_logging() -> Result<()> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("studio-assistant");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("studio.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
