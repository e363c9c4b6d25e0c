use chrono::{TimeZone, Utc};

use liga_terminal::football_data::{parse_matches_json, parse_standings_json, parse_teams_json};

const TEAMS_JSON: &str = r#"{
  "count": 2,
  "competition": { "id": 2017, "name": "Primeira Liga", "code": "PPL" },
  "teams": [
    {
      "id": 498,
      "name": "Sporting Clube de Portugal",
      "shortName": "Sporting CP",
      "tla": "SCP",
      "crest": "https://crests.football-data.org/498.png",
      "venue": "Estádio José Alvalade"
    },
    {
      "id": 1903,
      "name": "Sport Lisboa e Benfica",
      "shortName": "",
      "tla": "SLB",
      "crest": null
    }
  ]
}"#;

const STANDINGS_JSON: &str = r#"{
  "competition": { "code": "PPL" },
  "season": { "currentMatchday": 28 },
  "standings": [
    {
      "stage": "REGULAR_SEASON",
      "type": "TOTAL",
      "table": [
        {
          "position": 1,
          "team": { "id": 498, "name": "Sporting Clube de Portugal", "shortName": "Sporting CP", "tla": "SCP" },
          "playedGames": 28,
          "form": "W,W,D,W,W",
          "won": 21, "draw": 5, "lost": 2,
          "points": 68,
          "goalsFor": 64, "goalsAgainst": 20, "goalDifference": 44
        },
        {
          "position": 17,
          "team": { "id": 712, "name": "SC Farense", "shortName": "Farense", "tla": "FAR" },
          "playedGames": 28,
          "form": null,
          "won": 5, "draw": 8, "lost": 15,
          "points": 23,
          "goalsFor": 20, "goalsAgainst": 41, "goalDifference": -21
        }
      ]
    },
    {
      "stage": "REGULAR_SEASON",
      "type": "HOME",
      "table": [
        {
          "position": 1,
          "team": { "id": 1903, "name": "Sport Lisboa e Benfica" },
          "playedGames": 14,
          "won": 12, "draw": 2, "lost": 0,
          "points": 38,
          "goalsFor": 35, "goalsAgainst": 6, "goalDifference": 29
        }
      ]
    }
  ]
}"#;

const MATCHES_JSON: &str = r#"{
  "filters": { "status": ["SCHEDULED"], "limit": 5 },
  "matches": [
    {
      "id": 501,
      "utcDate": "2026-03-15T20:30:00Z",
      "status": "TIMED",
      "matchday": 26,
      "competition": { "id": 2017, "code": "PPL" },
      "homeTeam": { "id": 498, "name": "Sporting Clube de Portugal", "shortName": "Sporting CP", "tla": "SCP" },
      "awayTeam": { "id": 503, "name": "FC Porto", "shortName": "Porto", "tla": "FCP" }
    },
    {
      "id": 502,
      "utcDate": "not a date",
      "competition": { "code": "PPL" },
      "homeTeam": { "id": 498, "name": "Sporting Clube de Portugal" },
      "awayTeam": { "id": 810, "name": "Boavista FC" }
    },
    {
      "id": 503,
      "utcDate": "2026-04-02T19:45:00+01:00",
      "status": "SCHEDULED",
      "matchday": null,
      "competition": { "code": "TCA" },
      "homeTeam": { "id": null, "name": null },
      "awayTeam": { "id": 498, "name": "Sporting Clube de Portugal" }
    },
    {
      "id": 504,
      "utcDate": "2026-04-05T18:00:00Z",
      "homeTeam": { "id": 5613, "name": "Sporting Clube de Braga" },
      "awayTeam": { "id": 498, "name": "Sporting Clube de Portugal" }
    }
  ]
}"#;

#[test]
fn parses_teams() {
    let teams = parse_teams_json(TEAMS_JSON).expect("teams should parse");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].id, 498);
    assert_eq!(teams[0].display_name(), "Sporting CP");
    assert_eq!(teams[0].tla.as_deref(), Some("SCP"));
    // Blank short name falls back to the full name.
    assert_eq!(teams[1].display_name(), "Sport Lisboa e Benfica");
    assert_eq!(teams[1].crest, None);
}

#[test]
fn parses_first_standings_table_only() {
    let rows = parse_standings_json(STANDINGS_JSON).expect("standings should parse");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.team.id != 1903));

    let leader = &rows[0];
    assert_eq!(leader.position, 1);
    assert_eq!(leader.played_games, 28);
    assert_eq!(leader.points, 68);
    assert_eq!(leader.form.as_deref(), Some("W,W,D,W,W"));
    assert!(leader.is_consistent());

    let cutoff = &rows[1];
    assert_eq!(cutoff.position, 17);
    assert_eq!(cutoff.goal_difference, -21);
    assert_eq!(cutoff.form, None);
    assert!(cutoff.is_consistent());
}

#[test]
fn parses_matches_and_skips_unusable_entries() {
    let matches = parse_matches_json(MATCHES_JSON).expect("matches should parse");
    let ids: Vec<u64> = matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![501, 504]);

    let first = &matches[0];
    assert_eq!(
        first.utc_date,
        Utc.with_ymd_and_hms(2026, 3, 15, 20, 30, 0).unwrap()
    );
    assert_eq!(first.competition_code, "PPL");
    assert_eq!(first.matchday, Some(26));
    assert_eq!(first.status.as_deref(), Some("TIMED"));
    assert_eq!(first.away_team.display_name(), "Porto");

    // No competition block: kept, with an empty code the selector never matches.
    assert_eq!(matches[1].competition_code, "");
}

#[test]
fn offset_dates_normalise_to_utc() {
    let raw = r#"{ "matches": [ {
        "id": 9,
        "utcDate": "2026-04-02T19:45:00+01:00",
        "competition": { "code": "PPL" },
        "homeTeam": { "id": 1, "name": "A" },
        "awayTeam": { "id": 2, "name": "B" }
    } ] }"#;
    let matches = parse_matches_json(raw).expect("matches should parse");
    assert_eq!(
        matches[0].utc_date,
        Utc.with_ymd_and_hms(2026, 4, 2, 18, 45, 0).unwrap()
    );
}

#[test]
fn null_and_empty_payloads_are_empty() {
    assert!(parse_teams_json("null").expect("null parses").is_empty());
    assert!(parse_standings_json("").expect("empty parses").is_empty());
    assert!(parse_matches_json("  null ").expect("null parses").is_empty());
    assert!(
        parse_standings_json(r#"{ "standings": [] }"#)
            .expect("no tables parses")
            .is_empty()
    );
}

#[test]
fn malformed_json_is_an_error() {
    let err = parse_standings_json("{ \"standings\": [").unwrap_err();
    assert!(format!("{err:#}").contains("invalid standings json"));
    assert!(parse_matches_json("42").is_err());
}
