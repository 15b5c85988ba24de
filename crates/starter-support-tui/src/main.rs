use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use starter_support_core::{Config, SupportClient};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "starter-support", version)]
#[command(about = "Chat with StarterSupport about the product or your order")]
struct Cli {
    /// Support backend URL (overrides STARTER_SUPPORT_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Give up on a backend request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Write the effective backend URL and timeout to the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    let base_url = config.resolve_base_url(cli.base_url.as_deref());
    if cli.timeout.is_some() {
        config.request_timeout_secs = cli.timeout;
    }
    if cli.save_config {
        config.base_url = Some(base_url.clone());
        config.save_to(&config_path)?;
    }

    let log_path = logging::init(cli.log_file, config.log_filter.as_deref())?;
    info!(%base_url, log = %log_path.display(), config = %config_path.display(), "starting");

    let client = SupportClient::with_timeout(&base_url, config.request_timeout())?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, client).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

async fn run(terminal: &mut Tui, client: SupportClient) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(client, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    info!(messages = app.session.messages().len(), "session ended");
    Ok(())
}
