use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::model::{Match, StandingsRow, Team};

const AUTH_HEADER: &str = "X-Auth-Token";

/// Blocking client for the football-data.org v4 endpoints used by the app.
#[derive(Debug, Clone)]
pub struct FootballData {
    base_url: String,
    api_key: String,
    config: AppConfig,
}

impl FootballData {
    pub fn new(config: &AppConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            base_url: config.base_url.clone(),
            api_key,
            config: config.clone(),
        })
    }

    pub fn teams_url(&self, competition: &str) -> String {
        format!("{}/v4/competitions/{competition}/teams", self.base_url)
    }

    pub fn standings_url(&self, competition: &str) -> String {
        format!("{}/v4/competitions/{competition}/standings", self.base_url)
    }

    pub fn team_matches_url(&self, team_id: u32) -> String {
        format!(
            "{}/v4/teams/{team_id}/matches?status=SCHEDULED&limit={}",
            self.base_url, self.config.match_limit
        )
    }

    pub fn fetch_teams(&self) -> Result<Vec<Team>> {
        let body = self
            .get(&self.teams_url(&self.config.competition))
            .context("teams request failed")?;
        let teams = parse_teams_json(&body)?;
        info!(count = teams.len(), competition = %self.config.competition, "fetched teams");
        Ok(teams)
    }

    pub fn fetch_standings(&self) -> Result<Vec<StandingsRow>> {
        let body = self
            .get(&self.standings_url(&self.config.competition))
            .context("standings request failed")?;
        let table = parse_standings_json(&body)?;
        info!(rows = table.len(), competition = %self.config.competition, "fetched standings");
        Ok(table)
    }

    pub fn fetch_team_matches(&self, team_id: u32) -> Result<Vec<Match>> {
        let body = self
            .get(&self.team_matches_url(team_id))
            .context("team matches request failed")?;
        let matches = parse_matches_json(&body)?;
        info!(team_id, count = matches.len(), "fetched scheduled matches");
        Ok(matches)
    }

    fn get(&self, url: &str) -> Result<String> {
        let client = http_client()?;
        debug!(url, "GET");
        fetch_json_cached(
            client,
            url,
            &[(AUTH_HEADER, self.api_key.as_str())],
            self.config.cache_max_age,
        )
    }
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<ApiTeam>,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    standings: Vec<ApiStanding>,
}

#[derive(Debug, Deserialize)]
struct ApiStanding {
    #[serde(default)]
    table: Vec<ApiTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableRow {
    position: u32,
    team: ApiTeam,
    played_games: u32,
    #[serde(default)]
    form: Option<String>,
    won: u32,
    draw: u32,
    lost: u32,
    points: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i32,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    id: u64,
    utc_date: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    matchday: Option<u32>,
    #[serde(default)]
    competition: ApiCompetition,
    home_team: ApiTeamRef,
    away_team: ApiTeamRef,
}

#[derive(Debug, Default, Deserialize)]
struct ApiCompetition {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeam {
    id: u32,
    name: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    tla: Option<String>,
    #[serde(default)]
    crest: Option<String>,
}

/// Team reference inside a match. Undrawn cup slots come through with null id and name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeamRef {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    tla: Option<String>,
    #[serde(default)]
    crest: Option<String>,
}

impl From<ApiTeam> for Team {
    fn from(t: ApiTeam) -> Self {
        Team {
            id: t.id,
            name: t.name,
            short_name: t.short_name,
            tla: t.tla,
            crest: t.crest,
        }
    }
}

impl ApiTeamRef {
    fn into_team(self) -> Option<Team> {
        Some(Team {
            id: self.id?,
            name: self.name?,
            short_name: self.short_name,
            tla: self.tla,
            crest: self.crest,
        })
    }
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let data: TeamsResponse = serde_json::from_str(trimmed).context("invalid teams json")?;
    Ok(data.teams.into_iter().map(Team::from).collect())
}

/// Rows of the first table in the payload (the overall table on football-data.org).
pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingsRow>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let data: StandingsResponse =
        serde_json::from_str(trimmed).context("invalid standings json")?;
    let Some(first) = data.standings.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(first
        .table
        .into_iter()
        .map(|row| StandingsRow {
            team: row.team.into(),
            position: row.position,
            played_games: row.played_games,
            won: row.won,
            draw: row.draw,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            points: row.points,
            goal_difference: row.goal_difference,
            form: row.form,
        })
        .collect())
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<Match>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let data: MatchesResponse = serde_json::from_str(trimmed).context("invalid matches json")?;
    let mut out = Vec::with_capacity(data.matches.len());
    for m in data.matches {
        let Some(utc_date) = parse_utc(&m.utc_date) else {
            debug!(id = m.id, raw = %m.utc_date, "skipping match with bad utcDate");
            continue;
        };
        let (Some(home_team), Some(away_team)) = (m.home_team.into_team(), m.away_team.into_team())
        else {
            continue;
        };
        out.push(Match {
            id: m.id,
            utc_date,
            competition_code: m.competition.code.unwrap_or_default(),
            home_team,
            away_team,
            matchday: m.matchday,
            status: m.status,
        });
    }
    Ok(out)
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_null(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed)
    }
}
