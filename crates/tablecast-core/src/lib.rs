// Library root: the standings engine. Pure functions over owned copies of the
// caller's base table, fixtures and predictions.

pub mod error;
pub mod fixture;
pub mod history;
pub mod projection;
pub mod ranking;
pub mod season;
pub mod standings;

pub use error::EngineError;
pub use fixture::{Fixture, FixtureId, Predictions, Score};
pub use history::{replay, PositionHistory};
pub use projection::{project, project_with_diagnostics, Projection};
pub use ranking::{compare_standing, rank};
pub use season::{GameweekRange, Season};
pub use standings::{apply_result, Outcome, TeamRecord};
