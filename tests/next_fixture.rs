use chrono::{DateTime, Duration, TimeZone, Utc};

use liga_terminal::demo::seed_team_matches;
use liga_terminal::model::{Match, Team, Venue};
use liga_terminal::next_fixture::{next_fixture, next_fixture_for_team};

fn today() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

fn fixture(id: u64, competition: &str, utc_date: DateTime<Utc>, home: u32, away: u32) -> Match {
    Match {
        id,
        utc_date,
        competition_code: competition.to_string(),
        home_team: Team::new(home, &format!("Team {home}")),
        away_team: Team::new(away, &format!("Team {away}")),
        matchday: Some(26),
        status: Some("SCHEDULED".to_string()),
    }
}

fn mixed_matches() -> Vec<Match> {
    let now = today();
    vec![
        fixture(1, "PPL", now - Duration::days(1), 498, 503),
        fixture(2, "PPL", now + Duration::days(1), 1903, 498),
        fixture(3, "PPL", now + Duration::days(3), 498, 5613),
        fixture(4, "CUP", now + Duration::days(1) - Duration::hours(2), 498, 810),
    ]
}

#[test]
fn picks_tomorrows_league_match_over_cup_and_past() {
    let matches = mixed_matches();
    let next = next_fixture(&matches, "PPL", today()).expect("a league match is scheduled");
    assert_eq!(next.id, 2);
}

#[test]
fn selection_is_idempotent_and_leaves_input_alone() {
    let matches = mixed_matches();
    let before = matches.clone();
    let first = next_fixture(&matches, "PPL", today()).map(|m| m.id);
    let second = next_fixture(&matches, "PPL", today()).map(|m| m.id);
    assert_eq!(first, second);
    assert_eq!(matches, before);
}

#[test]
fn nothing_to_pick_is_none() {
    let now = today();
    assert!(next_fixture(&[], "PPL", now).is_none());

    let past = vec![
        fixture(1, "PPL", now - Duration::days(7), 1, 2),
        fixture(2, "PPL", now - Duration::minutes(1), 3, 4),
    ];
    assert!(next_fixture(&past, "PPL", now).is_none());

    let other = vec![fixture(3, "CUP", now + Duration::days(1), 1, 2)];
    assert!(next_fixture(&other, "PPL", now).is_none());
}

#[test]
fn kickoff_at_now_counts_as_upcoming() {
    let now = today();
    let matches = vec![fixture(7, "PPL", now, 1, 2)];
    assert_eq!(next_fixture(&matches, "PPL", now).map(|m| m.id), Some(7));
}

#[test]
fn competition_code_must_match_exactly() {
    let now = today();
    let matches = vec![fixture(1, "ppl", now + Duration::days(1), 1, 2)];
    assert!(next_fixture(&matches, "PPL", now).is_none());
}

#[test]
fn equal_kickoffs_keep_input_order() {
    let kickoff = today() + Duration::days(2);
    let matches = vec![
        fixture(11, "PPL", kickoff, 1, 2),
        fixture(12, "PPL", kickoff, 3, 4),
        fixture(13, "PPL", kickoff + Duration::hours(2), 5, 6),
    ];
    assert_eq!(next_fixture(&matches, "PPL", today()).map(|m| m.id), Some(11));

    let reversed: Vec<_> = matches.iter().rev().cloned().collect();
    assert_eq!(next_fixture(&reversed, "PPL", today()).map(|m| m.id), Some(12));
}

#[test]
fn unsorted_input_still_finds_earliest() {
    let now = today();
    let matches = vec![
        fixture(1, "PPL", now + Duration::days(9), 1, 2),
        fixture(2, "PPL", now + Duration::days(2), 3, 4),
        fixture(3, "PPL", now + Duration::days(5), 5, 6),
    ];
    assert_eq!(next_fixture(&matches, "PPL", now).map(|m| m.id), Some(2));
}

#[test]
fn team_variant_skips_other_teams() {
    let matches = mixed_matches();
    let next = next_fixture_for_team(&matches, 5613, "PPL", today()).expect("Braga plays");
    assert_eq!(next.id, 3);
    assert_eq!(next.venue_for(5613), Some(Venue::Away));
    assert_eq!(next.opponent_of(5613).map(|t| t.id), Some(498));
    assert!(next_fixture_for_team(&matches, 810, "PPL", today()).is_none());
}

#[test]
fn demo_fixtures_skip_the_cup_tie() {
    let now = today();
    let matches = seed_team_matches(now, 34, 498, 5);
    let next = next_fixture_for_team(&matches, 498, "PPL", now).expect("league round ahead");
    assert_eq!(next.competition_code, "PPL");
    assert_eq!(next.matchday, Some(29));
    assert!(next.utc_date >= now);
}
