// CSV ingestion: fixtures, base standings and predictions.
//
// Header names are matched case-insensitively after trimming. The fixtures
// file is recognised by its `league`, `home` and `away` columns; any other
// file is treated as a standings table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tablecast_core::{Fixture, FixtureId, Predictions, Score, Season, TeamRecord};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// What a CSV file holds, judged from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Fixtures,
    Standings,
}

/// Base table and fixture list, ready for the engine.
#[derive(Debug, Clone)]
pub struct LeagueData {
    /// Teams in file order, ranked by file position.
    pub standings: Vec<TeamRecord>,
    /// Fixtures sorted by date with gameweeks assigned.
    pub fixtures: Vec<Fixture>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {origin}: {source}")]
    Csv { origin: String, source: csv::Error },

    #[error("{origin} has no `{column}` column")]
    MissingColumn { origin: String, column: String },

    #[error("invalid prediction on line {line}: {message}")]
    InvalidPrediction { line: usize, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// A parsed CSV file: normalised header names plus the data rows.
struct Table {
    origin: String,
    columns: HashMap<String, usize>,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read<R: Read>(rdr: R, origin: &str) -> Result<Self, IngestError> {
        let csv_err = |e| IngestError::Csv {
            origin: origin.to_string(),
            source: e,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            match record {
                Ok(r) => rows.push(r),
                Err(e) => warn!("skipping malformed row in {}: {}", origin, e),
            }
        }

        Ok(Table {
            origin: origin.to_string(),
            columns,
            headers,
            rows,
        })
    }

    fn kind(&self) -> TableKind {
        detect_kind(&self.headers)
    }

    fn require(&self, column: &str) -> Result<usize, IngestError> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| IngestError::MissingColumn {
                origin: self.origin.clone(),
                column: column.to_string(),
            })
    }

    /// First of `names` present in the header row.
    fn find(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|n| self.columns.get(*n).copied())
    }
}

fn field(row: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).unwrap_or("").trim()
}

/// Classify a header row. Names are compared lower-cased and trimmed.
pub fn detect_kind<S: AsRef<str>>(headers: &[S]) -> TableKind {
    let has = |name: &str| {
        headers
            .iter()
            .any(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
    };
    if has("league") && has("home") && has("away") {
        TableKind::Fixtures
    } else {
        TableKind::Standings
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Parse a `YYYYMMDD` date.
pub fn parse_fixture_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").ok()
}

fn parse_fixtures(table: &Table, season: &Season) -> Result<Vec<Fixture>, IngestError> {
    let home_col = table.require("home")?;
    let away_col = table.require("away")?;
    let date_col = table.find(&["date"]);
    let home_score_col = table.find(&["home score", "home_score", "homescore"]);
    let away_score_col = table.find(&["away score", "away_score", "awayscore"]);

    let mut fixtures: Vec<Fixture> = table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let date_str = field(row, date_col);
            let date = parse_fixture_date(date_str);
            if date.is_none() && !date_str.is_empty() {
                warn!("fixture-{}: unparsable date '{}'", index, date_str);
            }

            let result = match (
                field(row, home_score_col).parse::<u32>(),
                field(row, away_score_col).parse::<u32>(),
            ) {
                (Ok(h), Ok(a)) => Some(Score::new(h, a)),
                _ => None,
            };

            Fixture {
                id: FixtureId(format!("fixture-{index}")),
                gameweek: 0,
                home: field(row, Some(home_col)).to_string(),
                away: field(row, Some(away_col)).to_string(),
                date,
                result,
            }
        })
        .collect();

    // Undated fixtures sort first. The sort is stable so file order breaks ties.
    fixtures.sort_by_key(|f| f.date);

    let per_gameweek = season.fixtures_per_gameweek.max(1);
    for (i, fixture) in fixtures.iter_mut().enumerate() {
        fixture.gameweek = (i / per_gameweek) as u32 + 1;
    }

    Ok(fixtures)
}

/// Parse a fixtures CSV and assign gameweeks from the date order.
pub fn fixtures_from_reader<R: Read>(rdr: R, season: &Season) -> Result<Vec<Fixture>, IngestError> {
    let table = Table::read(rdr, "fixtures input")?;
    parse_fixtures(&table, season)
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

fn parse_count(row: &StringRecord, idx: Option<usize>, team: &str, column: &str) -> u32 {
    let raw = field(row, idx);
    match raw.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            if !raw.is_empty() {
                warn!("team '{}': unparsable {} '{}', using 0", team, column, raw);
            }
            0
        }
    }
}

fn parse_standings(table: &Table) -> Result<Vec<TeamRecord>, IngestError> {
    let team_col = table.require("team")?;
    let played_col = table.find(&["played", "mp"]);
    let won_col = table.find(&["won", "w"]);
    let drawn_col = table.find(&["drawn", "d"]);
    let lost_col = table.find(&["lost", "l"]);
    let gf_col = table.find(&["goals for", "gf"]);
    let ga_col = table.find(&["goals against", "ga"]);
    let gd_col = table.find(&["goal difference", "gd"]);
    let points_col = table.find(&["points", "pts"]);

    let mut standings = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let team = field(row, Some(team_col));
        if team.is_empty() {
            warn!("skipping standings row with no team name");
            continue;
        }

        let record = TeamRecord {
            team: team.to_string(),
            played: parse_count(row, played_col, team, "played"),
            win: parse_count(row, won_col, team, "won"),
            draw: parse_count(row, drawn_col, team, "drawn"),
            loss: parse_count(row, lost_col, team, "lost"),
            goals_for: parse_count(row, gf_col, team, "goals for"),
            goals_against: parse_count(row, ga_col, team, "goals against"),
            points: parse_count(row, points_col, team, "points"),
            rank: standings.len() + 1,
        };

        if let Ok(gd) = field(row, gd_col).parse::<i64>() {
            if gd != record.goal_difference() {
                warn!(
                    "team '{}': goal difference column says {} but goals give {}",
                    record.team,
                    gd,
                    record.goal_difference()
                );
            }
        }
        if !record.is_consistent() {
            warn!(
                "team '{}': points/played do not match W{} D{} L{}",
                record.team, record.win, record.draw, record.loss
            );
        }

        standings.push(record);
    }

    Ok(standings)
}

/// Parse a standings CSV. Ranks follow file order.
pub fn standings_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamRecord>, IngestError> {
    let table = Table::read(rdr, "standings input")?;
    parse_standings(&table)
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

fn parse_score_field(raw: &str, line: usize, side: &str) -> Result<i64, IngestError> {
    raw.parse::<i64>().map_err(|_| IngestError::InvalidPrediction {
        line,
        message: format!("{side} score '{raw}' is not a whole number"),
    })
}

/// Parse a predictions CSV with `fixture,home,away` columns.
///
/// Negative or non-numeric scores fail the whole file. When a fixture appears
/// twice the later row wins.
pub fn predictions_from_reader<R: Read>(rdr: R) -> Result<Predictions, IngestError> {
    let table = Table::read(rdr, "predictions input")?;
    let fixture_col = table.require("fixture")?;
    let home_col = table.require("home")?;
    let away_col = table.require("away")?;

    let mut predictions = Predictions::new();
    for (i, row) in table.rows.iter().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let id = field(row, Some(fixture_col));
        if id.is_empty() {
            return Err(IngestError::InvalidPrediction {
                line,
                message: "missing fixture id".into(),
            });
        }

        let home = parse_score_field(field(row, Some(home_col)), line, "home")?;
        let away = parse_score_field(field(row, Some(away_col)), line, "away")?;
        let score = Score::from_signed(home, away).map_err(|e| IngestError::InvalidPrediction {
            line,
            message: e.to_string(),
        })?;

        if predictions.insert(FixtureId::new(id), score).is_some() {
            warn!("duplicate prediction for {}, using line {}", id, line);
        }
    }

    Ok(predictions)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load predictions from a CSV file.
pub fn load_predictions(path: &Path) -> Result<Predictions, IngestError> {
    let predictions = predictions_from_reader(open(path)?)?;
    info!("Loaded {} predictions from {}", predictions.len(), path.display());
    Ok(predictions)
}

/// Load the fixtures and standings files.
///
/// The two paths may be given the wrong way round; the header row decides
/// which file is which.
pub fn load_inputs(
    fixtures_path: &Path,
    standings_path: &Path,
    season: &Season,
) -> Result<LeagueData, IngestError> {
    let first = Table::read(open(fixtures_path)?, &fixtures_path.display().to_string())?;
    let second = Table::read(open(standings_path)?, &standings_path.display().to_string())?;

    let (fixtures_table, standings_table) = match (first.kind(), second.kind()) {
        (TableKind::Fixtures, _) => (first, second),
        (_, TableKind::Fixtures) => {
            warn!(
                "{} looks like the fixtures file; swapping inputs",
                standings_path.display()
            );
            (second, first)
        }
        _ => {
            return Err(IngestError::Validation(format!(
                "neither {} nor {} has league/home/away columns",
                fixtures_path.display(),
                standings_path.display()
            )))
        }
    };

    let fixtures = parse_fixtures(&fixtures_table, season)?;
    let standings = parse_standings(&standings_table)?;

    info!(
        "Parsed {} fixtures and {} teams",
        fixtures.len(),
        standings.len()
    );
    if fixtures.len() != season.expected_fixtures() {
        warn!(
            "expected {} fixtures, got {}",
            season.expected_fixtures(),
            fixtures.len()
        );
    }
    if standings.len() != season.num_teams {
        warn!("expected {} teams, got {}", season.num_teams, standings.len());
    }
    if standings.is_empty() {
        return Err(IngestError::Validation(
            "standings CSV produced zero teams".into(),
        ));
    }

    Ok(LeagueData {
        standings,
        fixtures,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
