// Table ordering: points, then goal difference, then goals scored.

use std::cmp::Ordering;

use crate::standings::TeamRecord;

/// Compare two teams best-first. `Ordering::Less` means `a` ranks above `b`.
///
/// Teams equal on points, goal difference and goals scored compare `Equal`;
/// their relative order is decided by the caller's input order.
pub fn compare_standing(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Order teams best-to-worst and assign 1-based ranks.
///
/// The sort is stable, so fully tied teams keep their input order. Pass teams
/// in a fixed canonical order (the base table's) for reproducible output.
pub fn rank(mut teams: Vec<TeamRecord>) -> Vec<TeamRecord> {
    teams.sort_by(compare_standing);
    for (i, team) in teams.iter_mut().enumerate() {
        team.rank = i + 1;
    }
    teams
}

/// Ranks only, as `(team index in input, rank)` pairs, without cloning records.
pub(crate) fn rank_positions(teams: &[TeamRecord]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by(|&a, &b| compare_standing(&teams[a], &teams[b]));
    order
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| (idx, pos + 1))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, points: u32, goals_for: u32, goals_against: u32) -> TeamRecord {
        TeamRecord {
            points,
            goals_for,
            goals_against,
            ..TeamRecord::new(name)
        }
    }

    fn names(teams: &[TeamRecord]) -> Vec<&str> {
        teams.iter().map(|t| t.team.as_str()).collect()
    }

    #[test]
    fn orders_by_points_first() {
        let ranked = rank(vec![team("A", 10, 5, 5), team("B", 20, 1, 9), team("C", 15, 9, 1)]);
        assert_eq!(names(&ranked), vec!["B", "C", "A"]);
        assert_eq!(
            ranked.iter().map(|t| t.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn goal_difference_breaks_points_tie() {
        let ranked = rank(vec![team("A", 30, 20, 20), team("B", 30, 25, 15)]);
        assert_eq!(names(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn negative_goal_difference_sorts_below_zero() {
        let ranked = rank(vec![team("A", 12, 10, 14), team("B", 12, 10, 10)]);
        assert_eq!(names(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn goals_for_breaks_goal_difference_tie() {
        // Equal points and GD (+10), A has scored more.
        let ranked = rank(vec![team("B", 40, 40, 30), team("A", 40, 50, 40)]);
        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn full_tie_keeps_input_order() {
        let ranked = rank(vec![
            team("C", 7, 3, 3),
            team("A", 7, 3, 3),
            team("B", 7, 3, 3),
        ]);
        assert_eq!(names(&ranked), vec!["C", "A", "B"]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let teams = vec![
            team("A", 7, 3, 3),
            team("B", 9, 1, 0),
            team("C", 7, 3, 3),
            team("D", 7, 4, 4),
        ];
        let once = rank(teams);
        let twice = rank(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn input_ranks_are_overwritten() {
        let mut a = team("A", 0, 0, 0);
        a.rank = 7;
        let ranked = rank(vec![a]);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn rank_positions_agree_with_rank() {
        let teams = vec![
            team("A", 7, 3, 3),
            team("B", 9, 1, 0),
            team("C", 7, 3, 3),
            team("D", 7, 4, 4),
        ];
        let ranked = rank(teams.clone());
        for (idx, pos) in rank_positions(&teams) {
            let expected = ranked.iter().find(|t| t.team == teams[idx].team).unwrap();
            assert_eq!(expected.rank, pos);
        }
    }
}
