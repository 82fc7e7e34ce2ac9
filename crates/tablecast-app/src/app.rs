// Application flow: load inputs, project the table, replay history for the
// chart view, and assemble the report.

use std::path::Path;

use anyhow::Context;
use tablecast_core::{project_with_diagnostics, replay, EngineError, GameweekRange, Predictions};
use tracing::{info, warn};

use crate::config::{Config, ViewMode};
use crate::ingest::{self, LeagueData};
use crate::report::{chart_series, fixture_list, table_rows, Report, TeamFilter};

/// Everything the report needs, loaded from the configured paths.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub data: LeagueData,
    pub predictions: Predictions,
}

/// Read the fixtures, standings and (optional) predictions files.
pub fn load_inputs(config: &Config) -> anyhow::Result<Inputs> {
    let paths = &config.data_paths;
    let data = ingest::load_inputs(
        Path::new(&paths.fixtures),
        Path::new(&paths.standings),
        &config.season,
    )
    .context("failed to load league data")?;

    let predictions = match &paths.predictions {
        Some(p) if Path::new(p).exists() => {
            ingest::load_predictions(Path::new(p)).context("failed to load predictions")?
        }
        Some(p) => {
            info!("No predictions file at {}, projecting the current table", p);
            Predictions::new()
        }
        None => Predictions::new(),
    };

    Ok(Inputs { data, predictions })
}

/// Project the table and, for the chart view, replay the configured window.
///
/// The replay only runs when there is at least one prediction; otherwise the
/// chart would be a flat line at every team's current rank. The fixtures view
/// lists `report.gameweek`, or the first gameweek of the window.
pub fn build_report(
    config: &Config,
    inputs: &Inputs,
    view: ViewMode,
) -> Result<Report, EngineError> {
    let base = &inputs.data.standings;
    let fixtures = &inputs.data.fixtures;
    let predictions = &inputs.predictions;

    let projection = project_with_diagnostics(base, fixtures, predictions);
    if projection.skipped > 0 {
        warn!(
            "{} predicted fixture(s) name a team missing from the standings",
            projection.skipped
        );
    }

    let report_cfg = &config.report;
    let window = config.season.replay_window;

    let all_or_named = || TeamFilter::from_names(&report_cfg.teams, TeamFilter::All);
    let (filter, chart, fixture_view) = match view {
        ViewMode::Table => (all_or_named(), None, None),
        ViewMode::Fixtures => {
            let gameweek = report_cfg.gameweek.unwrap_or(window.start);
            GameweekRange::new(gameweek, gameweek).validate(config.season.num_gameweeks)?;
            let list = fixture_list(fixtures, predictions, gameweek);
            (all_or_named(), None, Some(list))
        }
        ViewMode::Chart => {
            let filter = TeamFilter::from_names(
                &report_cfg.teams,
                TeamFilter::Top(report_cfg.chart_top_teams),
            );
            let chart = if predictions.is_empty() {
                info!("No predictions yet, skipping position history calculation");
                None
            } else {
                let history = replay(
                    base,
                    fixtures,
                    predictions,
                    window,
                    config.season.num_gameweeks,
                )?;
                let visible = filter.visible(&projection.standings);
                Some(chart_series(&history, &visible, config.season.num_teams))
            };
            (filter, chart, None)
        }
    };

    Ok(Report {
        view,
        table: table_rows(&projection.standings, base, &filter, &report_cfg.zones),
        chart,
        fixtures: fixture_view,
        window,
        predictions_applied: projection.applied,
        predictions_skipped: projection.skipped,
    })
}
