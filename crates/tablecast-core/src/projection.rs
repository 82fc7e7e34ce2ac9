// Standings projector: fold every predicted result into the base table and
// re-rank it.

use tracing::debug;

use crate::fixture::{Fixture, Predictions};
use crate::ranking::rank;
use crate::standings::{TeamRecord, WorkingTable};

/// Projected final table plus how many predictions actually landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Teams best-to-worst with fresh ranks.
    pub standings: Vec<TeamRecord>,
    /// Predicted fixtures folded into the table.
    pub applied: usize,
    /// Predicted fixtures skipped because a team name had no table entry.
    pub skipped: usize,
}

/// Project the final table from `base` and the predicted fixtures.
///
/// Fixtures without a prediction contribute nothing, even when they carry a
/// known result: completed matches are assumed to be in `base` already.
pub fn project(base: &[TeamRecord], fixtures: &[Fixture], predictions: &Predictions) -> Vec<TeamRecord> {
    project_with_diagnostics(base, fixtures, predictions).standings
}

/// Same as [`project`], also reporting applied and skipped fixture counts.
pub fn project_with_diagnostics(
    base: &[TeamRecord],
    fixtures: &[Fixture],
    predictions: &Predictions,
) -> Projection {
    let mut table = WorkingTable::from_base(base);
    let mut applied = 0;
    let mut skipped = 0;

    if !predictions.is_empty() {
        for fixture in fixtures {
            let Some(score) = predictions.get(&fixture.id) else {
                continue;
            };
            match table.apply(fixture, score) {
                Some(_) => applied += 1,
                None => skipped += 1,
            }
        }
    }

    debug!(
        "projected {} teams: {} predictions applied, {} skipped",
        base.len(),
        applied,
        skipped
    );

    Projection {
        standings: rank(table.into_teams()),
        applied,
        skipped,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureId, Score};

    fn team(name: &str, points: u32, goals_for: u32, goals_against: u32) -> TeamRecord {
        TeamRecord {
            points,
            goals_for,
            goals_against,
            ..TeamRecord::new(name)
        }
    }

    fn find<'a>(table: &'a [TeamRecord], name: &str) -> &'a TeamRecord {
        table.iter().find(|t| t.team == name).unwrap()
    }

    fn predictions(entries: &[(&str, u32, u32)]) -> Predictions {
        entries
            .iter()
            .map(|&(id, h, a)| (FixtureId::new(id), Score::new(h, a)))
            .collect()
    }

    #[test]
    fn no_predictions_is_identity() {
        let base = crate::rank(vec![
            team("A", 40, 50, 20),
            team("B", 38, 45, 30),
            team("C", 38, 41, 26),
            team("D", 12, 15, 60),
        ]);
        let fixtures = vec![
            Fixture::new("f1", 18, "A", "B"),
            Fixture::new("f2", 18, "C", "D"),
        ];

        let projected = project(&base, &fixtures, &Predictions::new());
        assert_eq!(projected, base);
    }

    #[test]
    fn winning_prediction_lifts_team() {
        // Both on 0 points, identical GD/GF; B starts above A in input order.
        let base = vec![TeamRecord::new("B"), TeamRecord::new("A")];
        let fixtures = vec![Fixture::new("f1", 1, "A", "B")];

        let projected = project(&base, &fixtures, &predictions(&[("f1", 3, 0)]));

        let a = find(&projected, "A");
        let b = find(&projected, "B");
        assert_eq!(a.points, 3);
        assert_eq!(a.rank, 1);
        assert_eq!(b.rank, 2);
        assert_eq!(a.goal_difference(), 3);
        assert_eq!(b.goal_difference(), -3);
    }

    #[test]
    fn unpredicted_fixtures_are_ignored() {
        let base = vec![TeamRecord::new("A"), TeamRecord::new("B")];
        let mut completed = Fixture::new("f1", 1, "A", "B");
        completed.result = Some(Score::new(5, 0));
        let fixtures = vec![completed, Fixture::new("f2", 2, "B", "A")];

        let out = project_with_diagnostics(&base, &fixtures, &predictions(&[("f2", 1, 1)]));

        assert_eq!(out.applied, 1);
        assert_eq!(out.skipped, 0);
        let a = find(&out.standings, "A");
        assert_eq!(a.played, 1);
        assert_eq!(a.points, 1);
        assert_eq!(a.goals_for, 1);
    }

    #[test]
    fn unknown_team_is_skipped_and_counted() {
        let base = vec![TeamRecord::new("A"), TeamRecord::new("B")];
        let fixtures = vec![
            Fixture::new("f1", 1, "A", "Mystery Town"),
            Fixture::new("f2", 1, "B", "A"),
        ];

        let out = project_with_diagnostics(
            &base,
            &fixtures,
            &predictions(&[("f1", 9, 0), ("f2", 0, 2)]),
        );

        assert_eq!(out.applied, 1);
        assert_eq!(out.skipped, 1);
        let a = find(&out.standings, "A");
        assert_eq!(a.played, 1);
        assert_eq!(a.goals_for, 2);
    }

    #[test]
    fn prediction_for_unknown_fixture_is_ignored() {
        let base = vec![TeamRecord::new("A"), TeamRecord::new("B")];
        let fixtures = vec![Fixture::new("f1", 1, "A", "B")];

        let out = project_with_diagnostics(&base, &fixtures, &predictions(&[("f99", 2, 0)]));
        assert_eq!(out.applied, 0);
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn base_inputs_are_not_mutated() {
        let base = vec![team("A", 3, 2, 1), team("B", 0, 1, 2)];
        let fixtures = vec![Fixture::new("f1", 2, "B", "A")];
        let base_before = base.clone();
        let fixtures_before = fixtures.clone();

        let _ = project(&base, &fixtures, &predictions(&[("f1", 4, 0)]));

        assert_eq!(base, base_before);
        assert_eq!(fixtures, fixtures_before);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let base = vec![
            team("A", 10, 10, 10),
            team("B", 10, 10, 10),
            team("C", 10, 10, 10),
        ];
        let fixtures = vec![Fixture::new("f1", 1, "A", "C")];
        let preds = predictions(&[("f1", 1, 1)]);

        let first = project(&base, &fixtures, &preds);
        let second = project(&base, &fixtures, &preds);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|t| t.team.as_str()).collect::<Vec<_>>(),
            vec!["A", "C", "B"]
        );
    }

    #[test]
    fn empty_base_table() {
        let fixtures = vec![Fixture::new("f1", 1, "A", "B")];
        let out = project_with_diagnostics(&[], &fixtures, &predictions(&[("f1", 1, 0)]));
        assert!(out.standings.is_empty());
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn huge_predicted_score_projects_without_overflow() {
        let base = crate::rank(vec![team("A", 20, 30, 10), team("B", 25, 20, 15)]);
        let fixtures = vec![Fixture::new("f1", 18, "A", "B")];

        let projected = project(&base, &fixtures, &predictions(&[("f1", u32::MAX, 0)]));

        let a = find(&projected, "A");
        assert_eq!(a.goals_for, u32::MAX);
        assert_eq!(a.points, 23);
        assert_eq!(a.rank, 2);
        assert_eq!(find(&projected, "B").goals_against, u32::MAX);
    }
}
