// Engine error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid prediction {home}-{away}: scores must be non-negative")]
    InvalidPrediction { home: i64, away: i64 },

    #[error("invalid gameweek range {start}..={end} for a {season_length}-gameweek season")]
    InvalidGameweekRange {
        start: u32,
        end: u32,
        season_length: u32,
    },
}
