// Season shape: team count, season length and the replay window.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Inclusive range of gameweeks, both ends 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekRange {
    pub start: u32,
    pub end: u32,
}

impl GameweekRange {
    pub fn new(start: u32, end: u32) -> Self {
        GameweekRange { start, end }
    }

    /// The whole season, gameweek 1 through `season_length`.
    pub fn full(season_length: u32) -> Self {
        GameweekRange::new(1, season_length)
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        (self.start..=self.end).contains(&gameweek)
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// Check the range fits a season: `1 <= start <= end <= season_length`.
    pub fn validate(&self, season_length: u32) -> Result<(), EngineError> {
        if self.start == 0 || self.start > self.end || self.end > season_length {
            return Err(EngineError::InvalidGameweekRange {
                start: self.start,
                end: self.end,
                season_length,
            });
        }
        Ok(())
    }
}

/// League shape for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub num_teams: usize,
    pub num_gameweeks: u32,
    /// Fixtures per gameweek when bucketing a date-sorted fixture list.
    pub fixtures_per_gameweek: usize,
    /// Gameweeks replayed for the trajectory view.
    pub replay_window: GameweekRange,
}

impl Default for Season {
    /// A 20-team double round-robin, replaying the second half of the season.
    fn default() -> Self {
        Season {
            num_teams: 20,
            num_gameweeks: 38,
            fixtures_per_gameweek: 10,
            replay_window: GameweekRange::new(18, 38),
        }
    }
}

impl Season {
    /// Fixture count of a double round-robin between `num_teams` teams.
    pub fn expected_fixtures(&self) -> usize {
        self.num_teams * self.num_teams.saturating_sub(1)
    }
}
