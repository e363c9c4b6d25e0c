use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};

use crate::model::{Match, StandingsRow, Team};

pub const DEMO_COMPETITION: &str = "PPL";
const CUP_COMPETITION: &str = "TCA";
const PLAYED: u32 = 28;

// (id, name, short, tla, won, draw, lost, goals_for, goals_against), table order.
const SEED_TABLE: [(u32, &str, &str, &str, u32, u32, u32, u32, u32); 18] = [
    (498, "Sporting Clube de Portugal", "Sporting CP", "SCP", 21, 5, 2, 64, 20),
    (1903, "Sport Lisboa e Benfica", "Benfica", "SLB", 20, 6, 2, 60, 18),
    (503, "FC Porto", "Porto", "FCP", 18, 6, 4, 52, 22),
    (5613, "Sporting Clube de Braga", "Braga", "BRA", 15, 7, 6, 45, 28),
    (5543, "Vitória SC", "Vitória SC", "VSC", 12, 8, 8, 36, 32),
    (5530, "CD Santa Clara", "Santa Clara", "SCL", 12, 6, 10, 30, 30),
    (6618, "Casa Pia AC", "Casa Pia", "CPI", 11, 7, 10, 33, 35),
    (5602, "FC Famalicão", "Famalicão", "FAM", 10, 9, 9, 31, 30),
    (582, "GD Estoril Praia", "Estoril", "EST", 10, 6, 12, 38, 42),
    (583, "Moreirense FC", "Moreirense", "MOR", 9, 8, 11, 29, 36),
    (496, "Rio Ave FC", "Rio Ave", "RAV", 8, 10, 10, 30, 38),
    (5533, "Gil Vicente FC", "Gil Vicente", "GIL", 8, 9, 11, 28, 34),
    (7822, "FC Arouca", "Arouca", "ARO", 8, 7, 13, 32, 45),
    (5601, "CD Nacional", "Nacional", "NAC", 7, 8, 13, 25, 38),
    (9136, "CF Estrela da Amadora", "Estrela", "EAM", 7, 6, 15, 24, 44),
    (7844, "AVS Futebol SAD", "AVS", "AVS", 6, 7, 15, 22, 46),
    (712, "SC Farense", "Farense", "FAR", 5, 8, 15, 20, 41),
    (810, "Boavista FC", "Boavista", "BOA", 4, 7, 17, 21, 51),
];

pub fn seed_teams() -> Vec<Team> {
    SEED_TABLE
        .iter()
        .map(|&(id, name, short, tla, ..)| Team {
            id,
            name: name.to_string(),
            short_name: Some(short.to_string()),
            tla: Some(tla.to_string()),
            crest: Some(format!("https://crests.football-data.org/{id}.png")),
        })
        .collect()
}

pub fn seed_standings() -> Vec<StandingsRow> {
    seed_teams()
        .into_iter()
        .zip(SEED_TABLE.iter())
        .enumerate()
        .map(|(idx, (team, &(.., won, draw, lost, gf, ga)))| StandingsRow {
            team,
            position: idx as u32 + 1,
            played_games: PLAYED,
            won,
            draw,
            lost,
            goals_for: gf,
            goals_against: ga,
            points: 3 * won + draw,
            goal_difference: gf as i32 - ga as i32,
            form: None,
        })
        .collect()
}

/// Remaining league rounds, one per week from `now`, paired with the circle method, plus a
/// cup tie for the top four so the competition filter has something to skip.
pub fn seed_matches(now: DateTime<Utc>, total_matchdays: u32) -> Vec<Match> {
    let teams = seed_teams();
    let kickoff_time = NaiveTime::from_hms_opt(20, 15, 0).unwrap_or_default();
    let first_day = now.date_naive() + ChronoDuration::days(2);
    let rounds = total_matchdays.saturating_sub(PLAYED);

    let mut out = Vec::new();
    let mut next_id = 900_000u64;
    let n = teams.len();
    for round in 0..rounds {
        let day = first_day + ChronoDuration::weeks(round as i64);
        let utc_date = day.and_time(kickoff_time).and_utc();
        let order = circle_order(n, round as usize);
        for i in 0..n / 2 {
            let (a, b) = (&teams[order[i]], &teams[order[n - 1 - i]]);
            let (home, away) = if (round as usize + i) % 2 == 0 { (a, b) } else { (b, a) };
            out.push(Match {
                id: next_id,
                utc_date,
                competition_code: DEMO_COMPETITION.to_string(),
                home_team: home.clone(),
                away_team: away.clone(),
                matchday: Some(PLAYED + round + 1),
                status: Some("TIMED".to_string()),
            });
            next_id += 1;
        }
    }

    // Midweek cup ties land before the next league round.
    let cup_date = (now.date_naive() + ChronoDuration::days(1))
        .and_time(kickoff_time)
        .and_utc();
    for pair in teams[..4].chunks(2) {
        if let [home, away] = pair {
            out.push(Match {
                id: next_id,
                utc_date: cup_date,
                competition_code: CUP_COMPETITION.to_string(),
                home_team: home.clone(),
                away_team: away.clone(),
                matchday: None,
                status: Some("SCHEDULED".to_string()),
            });
            next_id += 1;
        }
    }
    out
}

pub fn seed_team_matches(
    now: DateTime<Utc>,
    total_matchdays: u32,
    team_id: u32,
    limit: usize,
) -> Vec<Match> {
    let mut matches: Vec<Match> = seed_matches(now, total_matchdays)
        .into_iter()
        .filter(|m| m.involves(team_id))
        .collect();
    matches.sort_by_key(|m| m.utc_date);
    matches.truncate(limit);
    matches
}

fn circle_order(n: usize, round: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    order.push(0);
    let others = n - 1;
    for k in 0..others {
        order.push(1 + (k + round) % others);
    }
    order
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn seed_rows_are_consistent() {
        let rows = seed_standings();
        assert_eq!(rows.len(), 18);
        assert!(rows.iter().all(|r| r.is_consistent()));
        assert!(rows.windows(2).all(|w| w[0].points >= w[1].points));
    }

    #[test]
    fn each_round_pairs_every_team_once() {
        let now = Utc::now();
        let matches = seed_matches(now, 34);
        let league: Vec<_> = matches
            .iter()
            .filter(|m| m.competition_code == DEMO_COMPETITION)
            .collect();
        assert_eq!(league.len(), 6 * 9);
        for md in 29..=34 {
            let mut seen = HashSet::new();
            for m in league.iter().filter(|m| m.matchday == Some(md)) {
                assert!(seen.insert(m.home_team.id));
                assert!(seen.insert(m.away_team.id));
            }
            assert_eq!(seen.len(), 18);
        }
    }

    #[test]
    fn team_matches_are_limited_and_sorted() {
        let now = Utc::now();
        let matches = seed_team_matches(now, 34, 498, 5);
        assert_eq!(matches.len(), 5);
        assert!(matches.windows(2).all(|w| w[0].utc_date <= w[1].utc_date));
        // Sporting's first fixture is the cup tie.
        assert_eq!(matches[0].competition_code, CUP_COMPETITION);
    }
}
