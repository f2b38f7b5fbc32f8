use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cryptodesk::{
    api::ApiClient,
    app::App,
    config::Config,
    logging,
    runtime::{self, Dispatcher},
    session::{Session, SESSION_FILE},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, panic};
use tracing::{info, warn};

fn main() -> Result<()> {
    let config = Config::parse();
    let home = config.home_dir()?;
    let _log_guard = logging::init(&home, &config.log_filter)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let session = Session::open_or_reset(home.join(SESSION_FILE))?;
    let client = ApiClient::new(config.api_url.clone(), session.clone());
    info!(api_url = %config.api_url, "starting cryptodesk");

    let health_client = client.clone();
    rt.spawn(async move {
        match health_client.health().await {
            Ok(status) => info!(message = %status.message, "backend reachable"),
            Err(err) => warn!(error = %err, "backend health check failed"),
        }
    });

    let (mut app, initial) = App::new(session, config.toggle_policy());
    let (dispatcher, outcomes) = Dispatcher::new(client, rt.handle().clone());

    // Terminal setup
    install_panic_hook();
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = runtime::run(&mut terminal, &mut app, &dispatcher, outcomes, initial);

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor().context("Failed to show cursor")?;

    if let Err(err) = &result {
        warn!(error = %err, "event loop stopped");
    }
    result
}

fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Puts the terminal back before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
