//! shopgrid - Browse a product catalog in the terminal
//!
//! A terminal UI application that fetches a product catalog, lets the user
//! search it by title, and shows the matches as a grid of cards.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use shopgrid::app::App;
use shopgrid::cli::{Cli, StartupConfig};
use shopgrid::data::{CatalogClient, CatalogError, Product};
use shopgrid::logging::init_logging;
use shopgrid::query::QueryClient;
use shopgrid::ui;

/// Name of the thread that draws the UI
const UI_THREAD: &str = "main";

/// Returns true if a panic on this thread takes the UI down
fn is_ui_thread(name: Option<&str>) -> bool {
    name == Some(UI_THREAD)
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
///
/// Fetch tasks run on worker threads and the query layer recovers their
/// panics, so those are only logged; printing them would draw over the UI.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let thread = std::thread::current();
        if is_ui_thread(thread.name()) {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        } else {
            tracing::error!(
                thread = thread.name().unwrap_or("<unnamed>"),
                "worker panicked: {}",
                panic_info
            );
        }
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    // Logging is best effort; the UI works without it
    if let Err(e) = init_logging(&config.log_level, config.log_file.as_deref()) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    tracing::info!(endpoint = %config.endpoint, "shopgrid starting");

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Mount the catalog view; the fetch starts in the background
    let query: QueryClient<Vec<Product>, CatalogError> =
        QueryClient::new(config.query_options.clone());
    let source = Arc::new(CatalogClient::with_endpoint(config.endpoint.clone()));
    let mut app = App::with_startup_config(Arc::new(query), source, &config);

    // Main event loop
    loop {
        // Scrolling limits depend on how many cards fit in a row
        let (width, _) = terminal_size()?;
        app.set_viewport_width(width);

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    tracing::info!("shopgrid stopped");

    Ok(())
}
