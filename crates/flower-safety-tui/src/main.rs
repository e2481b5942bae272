use std::sync::Arc;

use anyhow::Result;
use flower_safety_core::{Config, FlowerCheckClient, SystemClock};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init();

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable config file");
        Config::new()
    });
    let endpoint = config.resolve_endpoint();
    info!(endpoint = %endpoint, log_file = ?log_path, "starting flower safety chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let classifier = Arc::new(FlowerCheckClient::new(&endpoint));
    let mut app = App::new(classifier, Box::new(SystemClock), endpoint, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }

    Ok(())
}
