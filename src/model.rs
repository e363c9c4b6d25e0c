use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub tla: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

impl Team {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            short_name: None,
            tla: None,
            crest: None,
        }
    }

    /// Short name when the feed has a non-empty one, otherwise the full name.
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

/// One team's record in a standings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: Team,
    pub position: u32,
    pub played_games: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub goal_difference: i32,
    #[serde(default)]
    pub form: Option<String>,
}

impl StandingsRow {
    /// Checks the arithmetic invariants of a well-formed row. The analytics never reject a
    /// row on this basis; it is only used for diagnostics.
    pub fn is_consistent(&self) -> bool {
        let games_ok = self.won + self.draw + self.lost == self.played_games;
        let points_ok = self.points == 3 * self.won + self.draw;
        let gd_ok = self.goal_difference == self.goals_for as i32 - self.goals_against as i32;
        games_ok && points_ok && gd_ok
    }
}

/// League-wide constants. Defaults match Liga Portugal: 18 teams, 34 matchdays,
/// 16th plays the relegation play-off, 17th and 18th go down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub total_matchdays: u32,
    pub relegation_cutoff_position: u32,
    pub direct_relegation_boundary: u32,
}

impl Season {
    pub const fn new(
        total_matchdays: u32,
        relegation_cutoff_position: u32,
        direct_relegation_boundary: u32,
    ) -> Self {
        Self {
            total_matchdays,
            relegation_cutoff_position,
            direct_relegation_boundary,
        }
    }

    /// Longest season accepted from configuration.
    pub const MAX_MATCHDAYS: u32 = 1000;

    pub fn is_valid(&self) -> bool {
        (1..=Self::MAX_MATCHDAYS).contains(&self.total_matchdays)
            && self.relegation_cutoff_position > 0
            && self.direct_relegation_boundary < self.relegation_cutoff_position
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::new(34, 17, 16)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub utc_date: DateTime<Utc>,
    pub competition_code: String,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub matchday: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

impl Match {
    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team.id == team_id || self.away_team.id == team_id
    }

    pub fn venue_for(&self, team_id: u32) -> Option<Venue> {
        if self.home_team.id == team_id {
            Some(Venue::Home)
        } else if self.away_team.id == team_id {
            Some(Venue::Away)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, team_id: u32) -> Option<&Team> {
        match self.venue_for(team_id)? {
            Venue::Home => Some(&self.away_team),
            Venue::Away => Some(&self.home_team),
        }
    }
}
