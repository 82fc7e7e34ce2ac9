// Report building: projected table rows, rank trajectories, and their text
// and JSON renderings.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;
use tablecast_core::{
    Fixture, FixtureId, GameweekRange, Outcome, PositionHistory, Predictions, Score, TeamRecord,
};
use tracing::warn;

use crate::config::{OutputFormat, ViewMode, ZoneConfig};

// ---------------------------------------------------------------------------
// Team filter
// ---------------------------------------------------------------------------

/// Which teams a report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamFilter {
    All,
    Only(BTreeSet<String>),
    /// The top `n` of the projected table.
    Top(usize),
}

impl TeamFilter {
    /// Explicit list if one is given, otherwise `fallback`.
    pub fn from_names(names: &[String], fallback: TeamFilter) -> Self {
        if names.is_empty() {
            fallback
        } else {
            TeamFilter::Only(names.iter().cloned().collect())
        }
    }

    /// Names of the visible teams, judged against the projected table.
    pub fn visible(&self, projected: &[TeamRecord]) -> BTreeSet<String> {
        match self {
            TeamFilter::All => projected.iter().map(|t| t.team.clone()).collect(),
            TeamFilter::Only(names) => names.clone(),
            TeamFilter::Top(n) => projected.iter().take(*n).map(|t| t.team.clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    ChampionsLeague,
    EuropaLeague,
    Relegation,
    None,
}

impl Zone {
    pub fn for_rank(rank: usize, zones: &ZoneConfig) -> Self {
        if rank == 0 {
            Zone::None
        } else if rank <= zones.champions_league {
            Zone::ChampionsLeague
        } else if rank <= zones.europa_league {
            Zone::EuropaLeague
        } else if rank >= zones.relegation_from {
            Zone::Relegation
        } else {
            Zone::None
        }
    }

    /// One-character marker for the text table.
    pub fn marker(&self) -> char {
        match self {
            Zone::ChampionsLeague => 'C',
            Zone::EuropaLeague => 'E',
            Zone::Relegation => 'R',
            Zone::None => ' ',
        }
    }
}

/// One line of the projected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub rank: usize,
    pub team: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
    /// Base rank minus projected rank; positive means the team moved up.
    pub movement: i64,
    pub zone: Zone,
}

/// Build table rows for the visible teams, in projected order.
///
/// Movement is measured against the rank each base record carries (the
/// published position), not a re-sort of the base table. A base rank of 0
/// means unknown and gives no movement.
pub fn table_rows(
    projected: &[TeamRecord],
    base: &[TeamRecord],
    filter: &TeamFilter,
    zones: &ZoneConfig,
) -> Vec<TableRow> {
    let base_ranks: HashMap<&str, usize> = base
        .iter()
        .filter(|t| t.rank > 0)
        .map(|t| (t.team.as_str(), t.rank))
        .collect();
    let visible = filter.visible(projected);

    projected
        .iter()
        .filter(|t| visible.contains(&t.team))
        .map(|t| {
            let movement = base_ranks
                .get(t.team.as_str())
                .map(|&b| b as i64 - t.rank as i64)
                .unwrap_or(0);
            TableRow {
                rank: t.rank,
                team: t.team.clone(),
                played: t.played,
                win: t.win,
                draw: t.draw,
                loss: t.loss,
                goals_for: t.goals_for,
                goals_against: t.goals_against,
                goal_difference: t.goal_difference(),
                points: t.points,
                movement,
                zone: Zone::for_rank(t.rank, zones),
            }
        })
        .collect()
}

fn movement_label(movement: i64) -> String {
    match movement {
        0 => "-".to_string(),
        m if m > 0 => format!("^{m}"),
        m => format!("v{}", m.abs()),
    }
}

/// Fixed-width text rendering of the table.
pub fn render_table(rows: &[TableRow]) -> String {
    let width = rows.iter().map(|r| r.team.len()).max().unwrap_or(4).max(4);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "  {:>3} {:<width$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4} {:>4}",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "+/-"
    );
    for row in rows {
        let gd = if row.goal_difference > 0 {
            format!("+{}", row.goal_difference)
        } else {
            row.goal_difference.to_string()
        };
        let _ = writeln!(
            out,
            "{} {:>3} {:<width$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4} {:>4}",
            row.zone.marker(),
            row.rank,
            row.team,
            row.played,
            row.win,
            row.draw,
            row.loss,
            row.goals_for,
            row.goals_against,
            gd,
            row.points,
            movement_label(row.movement),
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Rank trajectory of one team across the replayed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub team: String,
    /// `(gameweek, rank)` pairs in gameweek order.
    pub points: Vec<(u32, usize)>,
}

/// Series for every visible team present in `history`, sorted by team name.
pub fn chart_series(
    history: &PositionHistory,
    visible: &BTreeSet<String>,
    max_series: usize,
) -> Vec<ChartSeries> {
    if visible.len() > max_series {
        warn!(
            "{} teams selected for the chart; more than {} is hard to read",
            visible.len(),
            max_series
        );
    }

    visible
        .iter()
        .filter_map(|team| {
            let points = history
                .window
                .iter()
                .filter_map(|gw| history.rank_at(team, gw).map(|r| (gw, r)))
                .collect::<Vec<_>>();
            if points.is_empty() {
                None
            } else {
                Some(ChartSeries {
                    team: team.clone(),
                    points,
                })
            }
        })
        .collect()
}

/// Text grid: one row per team, one column per gameweek.
pub fn render_chart(series: &[ChartSeries], window: GameweekRange) -> String {
    let width = series.iter().map(|s| s.team.len()).max().unwrap_or(4).max(4);
    let mut out = String::new();

    let _ = write!(out, "{:<width$}", "Team");
    for gw in window.iter() {
        let _ = write!(out, " {:>3}", format!("G{gw}"));
    }
    out.push('\n');

    for s in series {
        let _ = write!(out, "{:<width$}", s.team);
        for (_, rank) in &s.points {
            let _ = write!(out, " {rank:>3}");
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Fixture list
// ---------------------------------------------------------------------------

/// One match in the fixtures view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureLine {
    pub id: FixtureId,
    pub home: String,
    pub away: String,
    pub date: Option<NaiveDate>,
    /// Final score of a completed match.
    pub result: Option<Score>,
    pub prediction: Option<Score>,
}

impl FixtureLine {
    /// The score shown for the match: the result once played, else the
    /// prediction.
    pub fn shown_score(&self) -> Option<Score> {
        self.result.or(self.prediction)
    }

    /// Points each side takes from the shown score, as `(home, away)`.
    pub fn points_impact(&self) -> Option<(u32, u32)> {
        self.shown_score().map(|score| match Outcome::of(score) {
            Outcome::HomeWin => (3, 0),
            Outcome::Draw => (1, 1),
            Outcome::AwayWin => (0, 3),
        })
    }
}

/// Every fixture of one gameweek, with the dates it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureList {
    pub gameweek: u32,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub fixtures: Vec<FixtureLine>,
}

/// Fixtures of `gameweek` in input order, paired with any prediction.
pub fn fixture_list(fixtures: &[Fixture], predictions: &Predictions, gameweek: u32) -> FixtureList {
    let lines: Vec<FixtureLine> = fixtures
        .iter()
        .filter(|f| f.gameweek == gameweek)
        .map(|f| FixtureLine {
            id: f.id.clone(),
            home: f.home.clone(),
            away: f.away.clone(),
            date: f.date,
            result: f.result,
            prediction: predictions.get(&f.id),
        })
        .collect();

    let dates = lines.iter().filter_map(|l| l.date);
    FixtureList {
        gameweek,
        first_date: dates.clone().min(),
        last_date: dates.max(),
        fixtures: lines,
    }
}

fn short_date(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// "16 Aug", "16 Aug - 18 Aug", or empty when no fixture is dated.
pub fn date_range_label(list: &FixtureList) -> String {
    match (list.first_date, list.last_date) {
        (Some(first), Some(last)) if first == last => short_date(first),
        (Some(first), Some(last)) => format!("{} - {}", short_date(first), short_date(last)),
        _ => String::new(),
    }
}

/// Text listing: fixture ids are what the predictions file refers to.
pub fn render_fixtures(list: &FixtureList) -> String {
    let mut out = String::new();
    let dates = date_range_label(list);
    if dates.is_empty() {
        let _ = writeln!(out, "Gameweek {}", list.gameweek);
    } else {
        let _ = writeln!(out, "Gameweek {} ({})", list.gameweek, dates);
    }

    if list.fixtures.is_empty() {
        let _ = writeln!(out, "No fixtures for this gameweek");
        return out;
    }

    let id_w = list.fixtures.iter().map(|l| l.id.as_str().len()).max().unwrap_or(2);
    let home_w = list.fixtures.iter().map(|l| l.home.len()).max().unwrap_or(4);
    let away_w = list.fixtures.iter().map(|l| l.away.len()).max().unwrap_or(4);

    for line in &list.fixtures {
        let score = match line.shown_score() {
            Some(s) => s.to_string(),
            None => "v".to_string(),
        };
        let date = line.date.map(short_date).unwrap_or_default();
        let note = match (line.result, line.points_impact()) {
            (Some(_), _) => "played".to_string(),
            (None, Some((h, a))) => format!("+{h} / +{a} pts"),
            (None, None) => String::new(),
        };
        let row = format!(
            "  {:<id_w$}  {:>home_w$} {:^5} {:<away_w$}  {:<6}  {}",
            line.id.as_str(),
            line.home,
            score,
            line.away,
            date,
            note,
        );
        let _ = writeln!(out, "{}", row.trim_end());
    }
    out
}

// ---------------------------------------------------------------------------
// Report bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub view: ViewMode,
    pub table: Vec<TableRow>,
    /// Present only for the chart view when predictions exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Vec<ChartSeries>>,
    /// Present only for the fixtures view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<FixtureList>,
    #[serde(skip)]
    pub window: GameweekRange,
    pub predictions_applied: usize,
    pub predictions_skipped: usize,
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Text => {
            let mut out = match (&report.view, &report.chart) {
                (ViewMode::Chart, Some(series)) => render_chart(series, report.window),
                (ViewMode::Chart, None) => {
                    "No predictions yet; the chart would repeat the current table.\n".to_string()
                }
                (ViewMode::Table, _) => render_table(&report.table),
                (ViewMode::Fixtures, _) => match &report.fixtures {
                    Some(list) => render_fixtures(list),
                    None => String::new(),
                },
            };
            if report.predictions_skipped > 0 {
                let _ = writeln!(
                    out,
                    "\n{} prediction(s) skipped: team not found in the table",
                    report.predictions_skipped
                );
            }
            Ok(out)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
