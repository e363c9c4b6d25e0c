use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::model::{Season, StandingsRow};
use crate::relegation::{RelegationReport, analyze_table};
use crate::season::{games_remaining, max_possible_points};
use crate::tier::classify;

pub struct ExportReport {
    pub standings_rows: usize,
    pub relegation_rows: usize,
}

/// Writes the table and a relegation report per team to an xlsx workbook.
pub fn export_standings(
    path: &Path,
    table: &[StandingsRow],
    season: &Season,
) -> Result<ExportReport> {
    let reports = analyze_table(table, season).context("relegation analysis failed")?;

    let mut standings = vec![standings_header()];
    standings.extend(table.iter().map(|row| standings_row(row, season)));

    let mut relegation = vec![relegation_header()];
    relegation.extend(reports.iter().map(relegation_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Relegation")?;
        write_rows(sheet, &relegation)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    info!(path = %path.display(), rows = table.len(), "standings exported");
    Ok(ExportReport {
        standings_rows: standings.len() - 1,
        relegation_rows: relegation.len() - 1,
    })
}

fn standings_header() -> Vec<String> {
    [
        "Pos", "Team", "Tier", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Left", "Max Pts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn standings_row(row: &StandingsRow, season: &Season) -> Vec<String> {
    vec![
        row.position.to_string(),
        row.team.name.clone(),
        classify(row.position, season).label().to_string(),
        row.played_games.to_string(),
        row.won.to_string(),
        row.draw.to_string(),
        row.lost.to_string(),
        row.goals_for.to_string(),
        row.goals_against.to_string(),
        row.goal_difference.to_string(),
        row.points.to_string(),
        games_remaining(row, season).to_string(),
        max_possible_points(row, season).to_string(),
    ]
}

fn relegation_header() -> Vec<String> {
    [
        "Pos",
        "Team",
        "Status",
        "Safe",
        "Pts Needed",
        "Wins Needed",
        "Can Be Relegated",
        "Pts To Escape",
        "Cutoff Max Pts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn relegation_row(report: &RelegationReport) -> Vec<String> {
    vec![
        report.subject.position.to_string(),
        report.subject.team.name.clone(),
        report.status.label().to_string(),
        yes_no(report.is_mathematically_safe),
        report.points_needed_for_safety.to_string(),
        report.wins_needed.to_string(),
        yes_no(report.can_still_be_relegated),
        opt_to_string(report.points_to_escape_zone),
        report.cutoff_max_points.to_string(),
    ]
}

fn yes_no(value: bool) -> String {
    let label = if value { "yes" } else { "no" };
    label.to_string()
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::seed_standings;

    #[test]
    fn rows_follow_table_and_reports() {
        let season = Season::default();
        let table = seed_standings();
        let row = standings_row(&table[16], &season);
        assert_eq!(row[0], "17");
        assert_eq!(row[2], "RELEG");
        assert_eq!(row[11], "6");
        assert_eq!(row[12], (23 + 18).to_string());

        let reports = analyze_table(&table, &season).expect("complete table");
        let row = relegation_row(&reports[17]);
        assert_eq!(row[2], "DANGER");
        // Boavista 19 pts vs AVS 25 pts at 16th.
        assert_eq!(row[7], "6");
        let row = relegation_row(&reports[0]);
        assert_eq!(row[2], "SAFE");
        assert_eq!(row[7], "");
    }

    #[test]
    fn export_fails_without_cutoff_row() {
        let season = Season::default();
        let table: Vec<_> = seed_standings().into_iter().take(10).collect();
        let path = std::env::temp_dir().join("liga_terminal_export_incomplete.xlsx");
        assert!(export_standings(&path, &table, &season).is_err());
    }
}
