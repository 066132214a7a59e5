use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use vision_dashboard::data::duration::parse_interval;
use vision_dashboard::data::Database;
use vision_dashboard::poll::{FetchInbox, TokioFetcher};
use vision_dashboard::source::QueryRequest;
use vision_dashboard::ui::{self, Theme};
use vision_dashboard::view::TerminalFullscreen;
use vision_dashboard::{
    events, logging, App, Backend, HttpBackend, PollConfig, PollMode, PollingScheduler, Report,
    Settings, ViewModeController,
};

#[derive(Parser, Debug)]
#[command(name = "vision-dashboard")]
#[command(about = "Terminal dashboard for environment, microservice and database health")]
struct Args {
    /// Settings file (default: vision.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL; a `?mode=monitor` query starts in monitor mode
    #[arg(short, long)]
    base_url: Option<String>,

    /// Enter monitor mode once the inventory has loaded
    #[arg(short, long)]
    monitor: bool,

    /// Polling flow: one combined dashboard fetch, or separate inventory and health fetches
    #[arg(long, value_enum)]
    poll_mode: Option<PollMode>,

    /// Health poll interval (e.g. "15s", "500ms"), overriding the backend config
    #[arg(long)]
    health_interval: Option<String>,

    /// Full dashboard refresh interval, overriding the backend config
    #[arg(long)]
    full_interval: Option<String>,

    /// Monitor auto-scroll interval, overriding the backend config
    #[arg(long)]
    scroll_interval: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Export an uptime report to a JSON file and exit
    #[arg(short, long, conflicts_with = "execute")]
    export: Option<PathBuf>,

    /// Run a query through the backend and print the response
    #[arg(long, requires = "db_config")]
    execute: Option<String>,

    /// JSON file with the database to run --execute against
    #[arg(long, requires = "execute")]
    db_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref base_url) = args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(mode) = args.poll_mode {
        settings.poll_mode = mode;
    }
    if let Some(ref log_file) = args.log_file {
        settings.log_file = Some(log_file.clone());
    }
    if let Some(ref level) = args.log_level {
        settings.log_level = level.clone();
    }

    logging::init(settings.log_file.as_deref(), &settings.log_level)?;

    let rt = Runtime::new()?;
    let backend = HttpBackend::builder()
        .base_url(settings.base_url.as_str())
        .timeout(settings.request_timeout())
        .build()
        .with_context(|| format!("Invalid base URL: {}", settings.base_url))?;

    // Handle query mode (non-interactive)
    if let (Some(sql), Some(db_config)) = (&args.execute, &args.db_config) {
        return execute_query(&rt, &backend, sql, db_config);
    }

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&rt, &backend, export_path);
    }

    let monitor = args.monitor || settings.monitor_requested();
    run_tui(&rt, Arc::new(backend), &settings, &args, monitor)
}

/// Apply interval overrides from the command line on top of the resolved config.
fn apply_overrides(config: &mut PollConfig, args: &Args) -> Result<()> {
    if let Some(ref s) = args.health_interval {
        config.health_interval = parse_interval(s).context("--health-interval")?;
    }
    if let Some(ref s) = args.full_interval {
        config.full_interval = parse_interval(s).context("--full-interval")?;
    }
    if let Some(ref s) = args.scroll_interval {
        config.scroll_interval = parse_interval(s).context("--scroll-interval")?;
    }
    Ok(())
}

/// Run the TUI against the given backend
fn run_tui(
    rt: &Runtime,
    backend: Arc<dyn Backend>,
    settings: &Settings,
    args: &Args,
    monitor: bool,
) -> Result<()> {
    let (mut config, warning) = rt.block_on(PollConfig::load(backend.as_ref(), settings.poll_mode));
    apply_overrides(&mut config, args)?;

    let description = backend.description().to_string();
    let (fetcher, mut inbox) = TokioFetcher::new(rt.handle().clone(), backend);
    let view = ViewModeController::new(Box::new(TerminalFullscreen::new()))
        .with_config(&config)
        .with_bottom_threshold(settings.monitor.bottom_threshold);

    let mut app = App::new(
        Box::new(fetcher),
        PollingScheduler::new(settings.poll_mode, config),
        view,
        description,
    )
    .with_monitor_on_load(monitor);
    app.theme = Theme::auto_detect();
    if let Some(message) = warning {
        app.set_status_message(message);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.start();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &mut inbox);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    inbox: &mut FetchInbox,
) -> Result<()> {
    let origin = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => {
                    // Rows start after header (1) + tabs (1) + block border (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        for fetched in inbox.drain() {
            app.handle_fetched(fetched);
        }
        app.advance_clock(origin.elapsed());
    }

    info!("dashboard stopped");
    Ok(())
}

/// Fetch the dashboard once and write the uptime report
fn export_to_file(rt: &Runtime, backend: &HttpBackend, path: &Path) -> Result<()> {
    let data = rt
        .block_on(backend.dashboard())
        .with_context(|| format!("Failed to fetch dashboard data from {}", backend.base_url()))?;

    Report::build(&data.environments, &data.health).write_json(path)?;
    println!("Exported to {}", path.display());
    Ok(())
}

/// Send a query to `/api/db/execute` and print the response as JSON
fn execute_query(rt: &Runtime, backend: &HttpBackend, sql: &str, db_config: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(db_config)
        .with_context(|| format!("Failed to read {}", db_config.display()))?;
    let database: Database = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid database config in {}", db_config.display()))?;

    let request = QueryRequest {
        db_config: database,
        query: sql.to_string(),
    };
    let response = rt
        .block_on(backend.execute_query(&request))
        .context("Query request failed")?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        let reason = response.error.as_deref().unwrap_or("unknown error");
        warn!(error = reason, "query failed");
        bail!("Query failed: {}", reason);
    }
    Ok(())
}
