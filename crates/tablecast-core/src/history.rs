// History replayer: fold predicted results one gameweek at a time and record
// every team's rank after each gameweek.
//
// Gameweeks must be replayed in order because each one builds on the stats
// accumulated by all earlier ones. Only the ranking step within a gameweek is
// independent per team.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::EngineError;
use crate::fixture::{Fixture, Predictions};
use crate::ranking::rank_positions;
use crate::season::GameweekRange;
use crate::standings::{TeamRecord, WorkingTable};

/// Rank (and points) of every team after each gameweek of the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionHistory {
    /// Length of every per-team sequence.
    pub season_length: u32,
    /// Gameweeks that were replayed. Slots outside it hold base-table values.
    pub window: GameweekRange,
    /// Team -> rank after gameweek `g` at index `g - 1`.
    pub ranks: BTreeMap<String, Vec<usize>>,
    /// Team -> points after gameweek `g` at index `g - 1`.
    pub points: BTreeMap<String, Vec<u32>>,
    /// Predicted fixtures folded during the replay.
    pub applied: usize,
    /// Predicted fixtures in the window skipped for an unknown team.
    pub skipped: usize,
}

impl PositionHistory {
    pub fn ranks_for(&self, team: &str) -> Option<&[usize]> {
        self.ranks.get(team).map(Vec::as_slice)
    }

    pub fn points_for(&self, team: &str) -> Option<&[u32]> {
        self.points.get(team).map(Vec::as_slice)
    }

    /// Rank of `team` after `gameweek` (1-based).
    pub fn rank_at(&self, team: &str, gameweek: u32) -> Option<usize> {
        let idx = gameweek.checked_sub(1)? as usize;
        self.ranks.get(team)?.get(idx).copied()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.ranks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Replay predictions gameweek by gameweek across `range`.
///
/// Every team's sequence has `season_length` entries, pre-filled with its
/// base-table rank and points; only gameweeks inside `range` are overwritten.
/// Gameweeks with nothing to fold still record the unchanged table, so the
/// trajectory stays flat rather than leaving a gap. Fixtures whose gameweek
/// lies outside `range` are ignored.
pub fn replay(
    base: &[TeamRecord],
    fixtures: &[Fixture],
    predictions: &Predictions,
    range: GameweekRange,
    season_length: u32,
) -> Result<PositionHistory, EngineError> {
    range.validate(season_length)?;

    let mut table = WorkingTable::from_base(base);
    let slots = season_length as usize;

    let mut ranks: Vec<Vec<usize>> = vec![vec![0; slots]; table.teams().len()];
    for (idx, pos) in rank_positions(table.teams()) {
        ranks[idx].fill(pos);
    }
    let mut points: Vec<Vec<u32>> = table
        .teams()
        .iter()
        .map(|t| vec![t.points; slots])
        .collect();

    let mut applied = 0;
    let mut skipped = 0;

    if predictions.is_empty() {
        debug!("no predictions, history stays at base ranks");
    } else {
        let mut buckets: HashMap<u32, Vec<&Fixture>> = HashMap::new();
        for fixture in fixtures.iter().filter(|f| range.contains(f.gameweek)) {
            buckets.entry(fixture.gameweek).or_default().push(fixture);
        }

        for gameweek in range.iter() {
            for fixture in buckets.get(&gameweek).into_iter().flatten() {
                let Some(score) = predictions.get(&fixture.id) else {
                    continue;
                };
                match table.apply(fixture, score) {
                    Some(_) => applied += 1,
                    None => skipped += 1,
                }
            }

            let slot = (gameweek - 1) as usize;
            for (idx, pos) in rank_positions(table.teams()) {
                ranks[idx][slot] = pos;
                points[idx][slot] = table.teams()[idx].points;
            }
        }

        debug!(
            "replayed gameweeks {}..={}: {} predictions applied, {} skipped",
            range.start, range.end, applied, skipped
        );
    }

    let names = table.teams().iter().map(|t| t.team.clone());
    Ok(PositionHistory {
        season_length,
        window: range,
        ranks: names.clone().zip(ranks).collect(),
        points: names.zip(points).collect(),
        applied,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
