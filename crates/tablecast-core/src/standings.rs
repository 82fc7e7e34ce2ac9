// Team records and the result-folding primitive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fixture::{Fixture, Score};

/// Cumulative league statistics for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Team name. Case-sensitive; must match the names used in fixtures.
    pub team: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    /// 1-based table position. Recomputed by ranking, never trusted from input.
    #[serde(default)]
    pub rank: usize,
}

impl TeamRecord {
    /// A team with no matches played.
    pub fn new(team: impl Into<String>) -> Self {
        TeamRecord {
            team: team.into(),
            played: 0,
            win: 0,
            draw: 0,
            loss: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            rank: 0,
        }
    }

    /// Goals scored minus goals conceded. Always derived, never stored.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// True when points and played agree with the win/draw/loss split.
    pub fn is_consistent(&self) -> bool {
        let (win, draw, loss) = (u64::from(self.win), u64::from(self.draw), u64::from(self.loss));
        u64::from(self.points) == 3 * win + draw && u64::from(self.played) == win + draw + loss
    }
}

/// Result of a single folded fixture, from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn of(score: Score) -> Self {
        match score.home.cmp(&score.away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::AwayWin,
        }
    }

    /// Total points the fixture hands out across both teams.
    pub fn points_awarded(&self) -> u32 {
        match self {
            Outcome::Draw => 2,
            Outcome::HomeWin | Outcome::AwayWin => 3,
        }
    }
}

/// Fold one score into the two teams' cumulative stats.
///
/// Folding the same fixture twice counts it twice; callers apply each
/// (fixture, score) pair once. Counters saturate at `u32::MAX` instead of
/// wrapping, so an absurd score can never reorder the table by overflow.
pub fn apply_result(home: &mut TeamRecord, away: &mut TeamRecord, score: Score) -> Outcome {
    home.played = home.played.saturating_add(1);
    away.played = away.played.saturating_add(1);

    home.goals_for = home.goals_for.saturating_add(score.home);
    home.goals_against = home.goals_against.saturating_add(score.away);
    away.goals_for = away.goals_for.saturating_add(score.away);
    away.goals_against = away.goals_against.saturating_add(score.home);

    let outcome = Outcome::of(score);
    match outcome {
        Outcome::HomeWin => {
            home.win = home.win.saturating_add(1);
            home.points = home.points.saturating_add(3);
            away.loss = away.loss.saturating_add(1);
        }
        Outcome::AwayWin => {
            away.win = away.win.saturating_add(1);
            away.points = away.points.saturating_add(3);
            home.loss = home.loss.saturating_add(1);
        }
        Outcome::Draw => {
            home.draw = home.draw.saturating_add(1);
            away.draw = away.draw.saturating_add(1);
            home.points = home.points.saturating_add(1);
            away.points = away.points.saturating_add(1);
        }
    }
    outcome
}

// ---------------------------------------------------------------------------
// Working table
// ---------------------------------------------------------------------------

/// Per-call mutable copy of the base table, in base order, with a name index.
#[derive(Debug, Clone)]
pub(crate) struct WorkingTable {
    teams: Vec<TeamRecord>,
    index: HashMap<String, usize>,
}

impl WorkingTable {
    /// A repeated team name keeps its first position but takes the later
    /// record's stats.
    pub(crate) fn from_base(base: &[TeamRecord]) -> Self {
        let mut teams: Vec<TeamRecord> = Vec::with_capacity(base.len());
        let mut index = HashMap::with_capacity(base.len());
        for record in base {
            if let Some(&idx) = index.get(&record.team) {
                warn!("duplicate team '{}' in base table, using the later entry", record.team);
                teams[idx] = record.clone();
                continue;
            }
            index.insert(record.team.clone(), teams.len());
            teams.push(record.clone());
        }
        WorkingTable { teams, index }
    }

    /// Fold a score into the fixture's two teams. Returns `None` (and changes
    /// nothing) when either team is unknown or both sides name the same team.
    pub(crate) fn apply(&mut self, fixture: &Fixture, score: Score) -> Option<Outcome> {
        let (Some(&h), Some(&a)) = (self.index.get(&fixture.home), self.index.get(&fixture.away))
        else {
            debug!(
                "skipping fixture {}: unknown team in '{}' vs '{}'",
                fixture.id, fixture.home, fixture.away
            );
            return None;
        };
        if h == a {
            debug!("skipping fixture {}: '{}' listed as both sides", fixture.id, fixture.home);
            return None;
        }

        let (home, away) = pair_mut(&mut self.teams, h, a);
        Some(apply_result(home, away, score))
    }

    pub(crate) fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub(crate) fn into_teams(self) -> Vec<TeamRecord> {
        self.teams
    }
}

/// Two distinct mutable elements of a slice.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
