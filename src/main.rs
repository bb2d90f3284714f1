mod app;
mod background;
mod clock;
mod config;
mod editor;
mod overlay;
mod pin;
mod server;
mod store;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use app::App;
use config::Config;
use store::{FileMessageStore, HttpMessageStore, MessageStore};

const TICK_RATE: Duration = Duration::from_millis(50);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "🏫 rkiosk - Digital signage for the school foyer")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// Directory holding config.json, message.json and the log file
    #[arg(short, long, global = true, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Background theme (campus, herbst, winter, fruehling)
    #[arg(short = 't', long)]
    theme: Option<String>,
    /// Base URL of a message endpoint; without it message.json is used directly
    #[arg(short, long)]
    server: Option<String>,
    /// Seconds an overlay stays open
    #[arg(long)]
    timeout: Option<u64>,
    /// Seconds of visible countdown before an overlay closes
    #[arg(long)]
    countdown: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the welcome-message endpoint
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn init_file_logging(dir: &Path) -> Result<()> {
    let path = config::data_path(dir, config::LOG_FILE);
    let log_file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stdout_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Serve { port }) => {
            init_stdout_logging();
            let mut config = config::load_config(&args.data_dir);
            if let Some(p) = port { config.port = p; }
            config.normalize();

            let store = FileMessageStore::new(config::data_path(&args.data_dir, config::MESSAGE_FILE));
            server::serve(config.port, server::ServerState { store: Arc::new(store) }).await
        }
        None => {
            init_file_logging(&args.data_dir)?;
            let mut config = config::load_config(&args.data_dir);

            // CLI overrides
            if let Some(t) = args.theme { config.theme = t; }
            if let Some(s) = args.server { config.server_url = Some(s); }
            if let Some(t) = args.timeout { config.overlay_timeout_secs = t; }
            if let Some(c) = args.countdown { config.countdown_secs = c; }
            config.normalize();

            run_kiosk(&config, &args.data_dir)
        }
    }
}

fn open_store(config: &Config, data_dir: &Path) -> Arc<dyn MessageStore> {
    match config.message_endpoint() {
        Some(endpoint) => {
            tracing::info!("using message endpoint {}", endpoint);
            Arc::new(HttpMessageStore::new(endpoint))
        }
        None => {
            let store = FileMessageStore::new(config::data_path(data_dir, config::MESSAGE_FILE));
            tracing::info!("using message file {}", store.path().display());
            Arc::new(store)
        }
    }
}

fn run_kiosk(config: &Config, data_dir: &Path) -> Result<()> {
    let mut app = App::new(config, open_store(config, data_dir), Instant::now());
    app.load_message();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = tokio::task::block_in_place(|| run(&mut terminal, &mut app));
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| {
            app.viewport = f.size();
            ui::render(f, app);
        })?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if app::handle_key(key, app, Instant::now()) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app::handle_mouse(mouse, app, Instant::now()),
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update(Instant::now());
            last_tick = Instant::now();
        }
    }
}
