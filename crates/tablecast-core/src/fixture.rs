// Fixtures, scores and the sparse prediction map.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Fixture identity
// ---------------------------------------------------------------------------

/// Stable identifier of a fixture (e.g. "fixture-42").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureId(pub String);

impl FixtureId {
    pub fn new(id: impl Into<String>) -> Self {
        FixtureId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FixtureId {
    fn from(id: &str) -> Self {
        FixtureId(id.to_string())
    }
}

impl From<String> for FixtureId {
    fn from(id: String) -> Self {
        FixtureId(id)
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A full-time score, either known or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Score { home, away }
    }

    /// Build a score from signed input, rejecting negative values.
    ///
    /// This is the boundary check for predictions coming from user input;
    /// the rest of the engine only ever sees `u32` goals.
    pub fn from_signed(home: i64, away: i64) -> Result<Self, EngineError> {
        match (u32::try_from(home), u32::try_from(away)) {
            (Ok(h), Ok(a)) => Ok(Score::new(h, a)),
            _ => Err(EngineError::InvalidPrediction { home, away }),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A scheduled match between two teams in one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    /// 1-based gameweek, assigned by ingestion.
    pub gameweek: u32,
    pub home: String,
    pub away: String,
    /// Kickoff date, when the source provided a parsable one.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Known result for a completed match. Already reflected in the base table.
    #[serde(default)]
    pub result: Option<Score>,
}

impl Fixture {
    pub fn new(
        id: impl Into<FixtureId>,
        gameweek: u32,
        home: impl Into<String>,
        away: impl Into<String>,
    ) -> Self {
        Fixture {
            id: id.into(),
            gameweek,
            home: home.into(),
            away: away.into(),
            date: None,
            result: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Sparse map from fixture to predicted score. Fixtures without an entry are
/// left out of every projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions(HashMap<FixtureId, Score>);

impl Predictions {
    pub fn new() -> Self {
        Predictions(HashMap::new())
    }

    /// Set the prediction for a fixture, returning the one it replaced.
    pub fn insert(&mut self, id: FixtureId, score: Score) -> Option<Score> {
        self.0.insert(id, score)
    }

    pub fn remove(&mut self, id: &FixtureId) -> Option<Score> {
        self.0.remove(id)
    }

    pub fn get(&self, id: &FixtureId) -> Option<Score> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FixtureId, &Score)> {
        self.0.iter()
    }
}

impl FromIterator<(FixtureId, Score)> for Predictions {
    fn from_iter<I: IntoIterator<Item = (FixtureId, Score)>>(iter: I) -> Self {
        Predictions(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
