use chrono::{DateTime, Utc};

use crate::model::Match;

/// Earliest match in `competition_code` kicking off at or after `now`.
///
/// Matches sharing the earliest kickoff resolve to the one that comes first in `matches`.
/// `None` means there is nothing scheduled, which is not an error.
pub fn next_fixture<'a>(
    matches: &'a [Match],
    competition_code: &str,
    now: DateTime<Utc>,
) -> Option<&'a Match> {
    upcoming(matches, competition_code, now).min_by_key(|m| m.utc_date)
}

/// Same as [`next_fixture`], restricted to matches `team_id` plays in.
pub fn next_fixture_for_team<'a>(
    matches: &'a [Match],
    team_id: u32,
    competition_code: &str,
    now: DateTime<Utc>,
) -> Option<&'a Match> {
    upcoming(matches, competition_code, now)
        .filter(|m| m.involves(team_id))
        .min_by_key(|m| m.utc_date)
}

fn upcoming<'a, 'c>(
    matches: &'a [Match],
    competition_code: &'c str,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a Match> {
    matches
        .iter()
        .filter(move |m| m.competition_code == competition_code && m.utc_date >= now)
}
