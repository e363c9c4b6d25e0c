use crate::model::{Season, StandingsRow};

const POINTS_PER_WIN: u32 = 3;

/// Matchdays left for `row`. Clamped at zero when the feed reports more games played than
/// the season has.
pub fn games_remaining(row: &StandingsRow, season: &Season) -> u32 {
    season.total_matchdays.saturating_sub(row.played_games)
}

/// Saturates at `u32::MAX` instead of wrapping on absurd inputs.
pub fn max_possible_points(row: &StandingsRow, season: &Season) -> u32 {
    row.points
        .saturating_add(POINTS_PER_WIN.saturating_mul(games_remaining(row, season)))
}

pub fn wins_for_points(points: u32) -> u32 {
    points.div_ceil(POINTS_PER_WIN)
}
