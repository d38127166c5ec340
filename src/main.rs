use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tokio::runtime::Handle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use linewatch::data::{AnomalyLog, ChartFeed, UniformRandom};
use linewatch::{
    events, ui, App, CycleOutcome, Dashboard, DemoSource, MonitoringLoop, PredictorSource,
    ReportKind, Settings, SharedDashboard, StateExport, StatusAggregator, TelemetrySource, View,
};
use linewatch_client::PredictorClient;

#[derive(Parser, Debug)]
#[command(name = "linewatch", version)]
#[command(about = "Terminal dashboard for process line telemetry and predictor anomalies")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Predictor service URL, e.g. "http://localhost:5000"
    #[arg(long, conflicts_with = "demo")]
    endpoint: Option<String>,

    /// Time between cycles (e.g., "5s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Use the built-in simulator instead of the predictor service
    #[arg(long)]
    demo: bool,

    /// Seed the simulator and status relaxation for a reproducible run
    #[arg(long, requires = "demo")]
    seed: Option<u64>,

    /// Poll without the TUI, logging to stderr, until Ctrl-C
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Run the given number of cycles, write the state to this file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write a CSV report (anomaly, production, quality) instead of JSON
    #[arg(long, requires = "export")]
    report: Option<ReportKind>,

    /// Cycles to run before exporting
    #[arg(long, default_value = "1")]
    cycles: u32,

    /// Log to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut settings = Settings::load(args.config.as_deref())
        .inspect_err(|e| error!(error = %e, "Configuration rejected"))
        .context("Failed to load settings")?;
    if let Some(ref endpoint) = args.endpoint {
        settings.predictor.endpoint = endpoint.clone();
    }
    if let Some(ref interval) = args.interval {
        settings.monitor.interval = interval.clone();
    }
    settings
        .validate()
        .inspect_err(|e| error!(error = %e, "Configuration rejected"))
        .context("Invalid settings")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let source = build_source(&args, &settings)?;
    let dashboard = build_dashboard(&settings, args.seed)?;
    let monitor = MonitoringLoop::new(source, dashboard).with_interval(settings.interval()?);

    if let Some(ref path) = args.export {
        return runtime.block_on(export_to_file(monitor, path, args.report, args.cycles));
    }

    if args.headless {
        return runtime.block_on(run_headless(monitor));
    }

    run_tui(monitor, runtime.handle().clone())
}

/// Stderr for headless and export runs; in the TUI, only `--log-file`.
fn init_logging(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let interactive = args.export.is_none() && !args.headless;

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn build_source(args: &Args, settings: &Settings) -> Result<Box<dyn TelemetrySource>> {
    if args.demo {
        let source = match args.seed {
            Some(seed) => DemoSource::seeded(seed),
            None => DemoSource::new(),
        };
        return Ok(Box::new(source));
    }

    let client = PredictorClient::builder()
        .endpoint(settings.predictor.endpoint.clone())
        .timeout(settings.predictor_timeout()?)
        .build()
        .context("Failed to build predictor client")?;
    Ok(Box::new(PredictorSource::new(client)))
}

fn build_dashboard(settings: &Settings, seed: Option<u64>) -> Result<SharedDashboard> {
    let Some(seed) = seed else {
        return Ok(Dashboard::from_settings(settings)?.shared());
    };

    let feed = ChartFeed::from_definitions(settings.monitor.window, &settings.charts)?;
    let aggregator = StatusAggregator::with_source(Box::new(UniformRandom::seeded(seed)));
    let dashboard = Dashboard::new(feed, AnomalyLog::new(settings.monitor.anomaly_log), aggregator)
        .with_failure_threshold(settings.monitor.failure_threshold);
    Ok(dashboard.shared())
}

/// Check health, run `cycles` cycles back to back, then write the export.
async fn export_to_file(
    monitor: MonitoringLoop,
    path: &Path,
    report: Option<ReportKind>,
    cycles: u32,
) -> Result<()> {
    monitor
        .check_health()
        .await
        .inspect_err(|e| error!(error = %e, "Startup failed"))
        .context("Predictor service is not available")?;

    let mut applied = 0;
    let mut last_error = None;
    for cycle in 1..=cycles {
        match monitor.run_cycle().await {
            CycleOutcome::Applied(_) => applied += 1,
            CycleOutcome::Skipped(err) => {
                warn!(cycle, error = %err, "Cycle failed");
                last_error = Some(err);
            }
        }
    }
    if cycles > 0 && applied == 0 {
        match last_error {
            Some(err) => bail!("No cycle succeeded: {}", err),
            None => bail!("No cycle succeeded"),
        }
    }

    let dashboard = monitor.dashboard().read();
    match report {
        Some(kind) => kind.write(&dashboard, path)?,
        None => StateExport::capture(&dashboard, Utc::now()).write(path)?,
    }

    println!("Exported linewatch state to: {}", path.display());
    Ok(())
}

async fn run_headless(mut monitor: MonitoringLoop) -> Result<()> {
    monitor.start().await.context("Failed to start monitoring")?;
    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    monitor.stop();

    let dashboard = monitor.dashboard().read();
    info!(
        cycles = dashboard.cycles(),
        anomalies = dashboard.anomalies().len(),
        failures = dashboard.failures().total(),
        status = %dashboard.overall_status(),
        "Monitoring finished"
    );
    Ok(())
}

/// Run the TUI on this thread; monitoring tasks run on `runtime`.
fn run_tui(monitor: MonitoringLoop, runtime: Handle) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(monitor, runtime).with_theme(ui::Theme::auto_detect());
    app.toggle_monitoring();

    let result = run_app(&mut terminal, &mut app);

    app.quit();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                    .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Modules => ui::modules::render(frame, app, chunks[2]),
                View::Charts => ui::charts::render(frame, app, chunks[2]),
                View::Anomalies => ui::anomalies::render(frame, app, chunks[2]),
                View::Batches => ui::batches::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts after header (1) + tabs (1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 2),
                _ => {}
            }
        }

        app.poll_pending_cycle();
    }

    Ok(())
}
