use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use liga_terminal::demo::{seed_matches, seed_standings};
use liga_terminal::football_data::parse_standings_json;
use liga_terminal::model::{Season, StandingsRow};
use liga_terminal::next_fixture::{next_fixture, next_fixture_for_team};
use liga_terminal::relegation::analyze_table;

fn standings_payload(rows: &[StandingsRow]) -> String {
    let table: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                r#"{{"position":{},"team":{{"id":{},"name":"{}","shortName":"{}"}},"playedGames":{},"form":"W,D,L,W,W","won":{},"draw":{},"lost":{},"points":{},"goalsFor":{},"goalsAgainst":{},"goalDifference":{}}}"#,
                r.position,
                r.team.id,
                r.team.name,
                r.team.display_name(),
                r.played_games,
                r.won,
                r.draw,
                r.lost,
                r.points,
                r.goals_for,
                r.goals_against,
                r.goal_difference
            )
        })
        .collect();
    format!(
        r#"{{"standings":[{{"type":"TOTAL","table":[{}]}}]}}"#,
        table.join(",")
    )
}

fn bench_analyze_table(c: &mut Criterion) {
    let season = Season::default();
    let table = seed_standings();
    c.bench_function("analyze_table", |b| {
        b.iter(|| {
            let reports = analyze_table(black_box(&table), &season).unwrap();
            black_box(reports.len());
        })
    });
}

fn bench_next_fixture(c: &mut Criterion) {
    let now = Utc::now();
    let matches = seed_matches(now, 34);
    c.bench_function("next_fixture", |b| {
        b.iter(|| {
            let next = next_fixture(black_box(&matches), "PPL", now);
            black_box(next.map(|m| m.id));
        })
    });
    c.bench_function("next_fixture_for_team", |b| {
        b.iter(|| {
            let next = next_fixture_for_team(black_box(&matches), 810, "PPL", now);
            black_box(next.map(|m| m.id));
        })
    });
}

fn bench_standings_parse(c: &mut Criterion) {
    let raw = standings_payload(&seed_standings());
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let rows = parse_standings_json(black_box(&raw)).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_analyze_table,
    bench_next_fixture,
    bench_standings_parse
);
criterion_main!(perf);
