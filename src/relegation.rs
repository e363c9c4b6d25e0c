use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{Season, StandingsRow};
use crate::season::{max_possible_points, wins_for_points};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("standings incomplete: no row at position {position} ({rows} rows supplied)")]
    IncompleteStandings { position: u32, rows: usize },
    #[error("team {team_id} not found in standings")]
    SubjectNotFound { team_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelegationStatus {
    Safe,
    Warning,
    Danger,
}

impl RelegationStatus {
    pub fn label(self) -> &'static str {
        match self {
            RelegationStatus::Safe => "SAFE",
            RelegationStatus::Warning => "WARNING",
            RelegationStatus::Danger => "DANGER",
        }
    }
}

/// Result of one relegation analysis. Holds its own copies of the rows so it outlives the
/// snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelegationReport {
    pub subject: StandingsRow,
    pub cutoff: StandingsRow,
    pub subject_max_points: u32,
    pub cutoff_max_points: u32,
    pub is_in_relegation_zone: bool,
    pub is_mathematically_safe: bool,
    pub points_needed_for_safety: u32,
    pub wins_needed: u32,
    pub can_still_be_relegated: bool,
    /// Points between the subject and the play-off row; only set inside the zone. Negative
    /// when the subject has more points but sits lower on tie-breaks.
    pub points_to_escape_zone: Option<i32>,
    pub status: RelegationStatus,
}

pub fn analyze(
    subject: &StandingsRow,
    table: &[StandingsRow],
    season: &Season,
) -> Result<RelegationReport, AnalysisError> {
    let cutoff = row_at(table, season.relegation_cutoff_position)?;
    if !table.iter().any(|row| row.team.id == subject.team.id) {
        return Err(AnalysisError::SubjectNotFound {
            team_id: subject.team.id,
        });
    }

    let subject_max_points = max_possible_points(subject, season);
    let cutoff_max_points = max_possible_points(cutoff, season);

    let is_in_relegation_zone = subject.position >= season.relegation_cutoff_position;
    // Strict: level on points at the ceiling can still go either way on tie-breaks.
    let is_mathematically_safe = subject.points > cutoff_max_points;
    let points_needed_for_safety = cutoff_max_points
        .saturating_add(1)
        .saturating_sub(subject.points);
    let wins_needed = wins_for_points(points_needed_for_safety);
    let can_still_be_relegated = subject_max_points >= cutoff.points
        && subject.position > season.direct_relegation_boundary;

    let points_to_escape_zone = if is_in_relegation_zone {
        let boundary = row_at(table, season.direct_relegation_boundary)?;
        Some(points_gap(boundary.points, subject.points))
    } else {
        None
    };

    // Zone membership wins over arithmetic safety.
    let status = if is_in_relegation_zone {
        RelegationStatus::Danger
    } else if is_mathematically_safe {
        RelegationStatus::Safe
    } else {
        RelegationStatus::Warning
    };

    debug!(
        team_id = subject.team.id,
        position = subject.position,
        points = subject.points,
        cutoff_max_points,
        status = status.label(),
        "relegation analysis"
    );

    Ok(RelegationReport {
        subject: subject.clone(),
        cutoff: cutoff.clone(),
        subject_max_points,
        cutoff_max_points,
        is_in_relegation_zone,
        is_mathematically_safe,
        points_needed_for_safety,
        wins_needed,
        can_still_be_relegated,
        points_to_escape_zone,
        status,
    })
}

pub fn analyze_team(
    team_id: u32,
    table: &[StandingsRow],
    season: &Season,
) -> Result<RelegationReport, AnalysisError> {
    // The cutoff check comes first, same as `analyze`.
    row_at(table, season.relegation_cutoff_position)?;
    let subject = table
        .iter()
        .find(|row| row.team.id == team_id)
        .ok_or(AnalysisError::SubjectNotFound { team_id })?;
    analyze(subject, table, season)
}

/// One report per row, in table order.
pub fn analyze_table(
    table: &[StandingsRow],
    season: &Season,
) -> Result<Vec<RelegationReport>, AnalysisError> {
    table
        .iter()
        .map(|row| analyze(row, table, season))
        .collect()
}

fn points_gap(target: u32, points: u32) -> i32 {
    let gap = i64::from(target) - i64::from(points);
    i32::try_from(gap).unwrap_or(if gap < 0 { i32::MIN } else { i32::MAX })
}

fn row_at(table: &[StandingsRow], position: u32) -> Result<&StandingsRow, AnalysisError> {
    table
        .iter()
        .find(|row| row.position == position)
        .ok_or(AnalysisError::IncompleteStandings {
            position,
            rows: table.len(),
        })
}
