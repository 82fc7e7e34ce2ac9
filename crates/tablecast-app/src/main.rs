// tablecast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries the report)
// 2. Load config (copying defaults on first run)
// 3. Load fixtures, standings and predictions
// 4. Project the table / replay history
// 5. Print the report

use std::time::Instant;

use anyhow::Context;
use tablecast_app::{app, config, report};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("tablecast starting up");

    // 2. Load config
    let mut config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams, {} gameweeks, replay window {}..={}",
        config.season.num_teams,
        config.season.num_gameweeks,
        config.season.replay_window.start,
        config.season.replay_window.end
    );

    // Optional arguments: `[table|chart|fixtures] [gameweek]`.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let view = match args.first() {
        Some(arg) => arg
            .parse::<config::ViewMode>()
            .map_err(anyhow::Error::msg)?,
        None => config.report.view,
    };
    if let Some(gw) = args.get(1) {
        let gameweek = gw
            .parse::<u32>()
            .with_context(|| format!("invalid gameweek '{gw}'"))?;
        config.report.gameweek = Some(gameweek);
    }

    // 3. Load inputs
    let inputs = app::load_inputs(&config)?;
    info!(
        "Loaded {} teams, {} fixtures, {} predictions",
        inputs.data.standings.len(),
        inputs.data.fixtures.len(),
        inputs.predictions.len()
    );

    // 4. Project / replay
    let start = Instant::now();
    let report = app::build_report(&config, &inputs, view).context("failed to build report")?;
    info!("Report built in {} ms", start.elapsed().as_millis());

    // 5. Print
    let output = report::render(&report, config.report.format).context("failed to render report")?;
    print!("{output}");

    info!("tablecast finished");
    Ok(())
}

/// Initialize tracing to log to a file so stdout stays clean for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("tablecast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tablecast_app=info,tablecast_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
