use std::collections::VecDeque;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::model::{Match, Season, StandingsRow, Team};
use crate::next_fixture::next_fixture_for_team;
use crate::relegation::{AnalysisError, RelegationReport, analyze_table, analyze_team};
use crate::tier::{Tier, classify};

/// What the screen is showing. Transient views (`Loading`, `Error`) are never pushed onto
/// the history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Menu,
    SelectTeam,
    NextMatch { team_id: u32 },
    Standings,
    Relegation { team_id: Option<u32> },
    Loading { pending: Pending },
    Error { message: String },
}

impl View {
    pub fn is_transient(&self) -> bool {
        matches!(self, View::Loading { .. } | View::Error { .. })
    }
}

/// The view a `Loading` screen resolves into once its data arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Teams,
    Standings,
    Relegation,
    TeamMatches { team_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    NextMatch,
    Standings,
    Relegation,
    Export,
}

pub const MENU_ITEMS: [MenuItem; 4] = [
    MenuItem::NextMatch,
    MenuItem::Standings,
    MenuItem::Relegation,
    MenuItem::Export,
];

/// Snapshot of a view plus its cursor, so going back restores where the user was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub view: View,
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub history: Vec<HistoryEntry>,
    pub selected: usize,
    pub competition: String,
    pub season: Season,
    pub demo: bool,
    pub teams: Vec<Team>,
    pub teams_fetched_at: Option<SystemTime>,
    pub standings: Vec<StandingsRow>,
    pub standings_fetched_at: Option<SystemTime>,
    pub selected_team: Option<Team>,
    pub team_matches: Vec<Match>,
    pub team_matches_for: Option<u32>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub snapshot_dirty: bool,
}

impl AppState {
    pub fn new(competition: &str, season: Season) -> Self {
        Self {
            view: View::Menu,
            history: Vec::new(),
            selected: 0,
            competition: competition.to_string(),
            season,
            demo: false,
            teams: Vec::with_capacity(18),
            teams_fetched_at: None,
            standings: Vec::with_capacity(18),
            standings_fetched_at: None,
            selected_team: None,
            team_matches: Vec::new(),
            team_matches_for: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            snapshot_dirty: false,
        }
    }

    pub fn navigate(&mut self, view: View) {
        if !self.view.is_transient() {
            self.history.push(HistoryEntry {
                view: self.view.clone(),
                selected: self.selected,
            });
        }
        self.view = view;
        self.selected = 0;
    }

    /// Replaces the current view without touching history (loading screens resolving).
    fn replace_view(&mut self, view: View) {
        self.view = view;
        self.selected = 0;
    }

    pub fn back(&mut self) {
        match self.history.pop() {
            Some(entry) => {
                self.view = entry.view;
                self.selected = entry.selected;
            }
            None => self.go_to_menu(),
        }
        self.clamp_selection();
    }

    pub fn go_to_menu(&mut self) {
        self.view = View::Menu;
        self.history.clear();
        self.selected = 0;
        self.selected_team = None;
        self.team_matches.clear();
        self.team_matches_for = None;
    }

    /// From the next-match screen back to the team grid, keeping the cursor on the team
    /// that was just viewed.
    pub fn choose_another_team(&mut self) {
        let team_id = match self.view {
            View::NextMatch { team_id } => team_id,
            _ => return,
        };
        self.history.retain(|entry| entry.view == View::Menu);
        if self.history.is_empty() {
            self.history.push(HistoryEntry {
                view: View::Menu,
                selected: 0,
            });
        }
        self.view = View::SelectTeam;
        self.selected = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .unwrap_or(0);
    }

    pub fn list_len(&self) -> usize {
        match self.view {
            View::Menu => MENU_ITEMS.len(),
            View::SelectTeam => self.teams.len(),
            View::Standings | View::Relegation { team_id: None } => self.standings.len(),
            _ => 0,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn selected_menu_item(&self) -> Option<MenuItem> {
        match self.view {
            View::Menu => MENU_ITEMS.get(self.selected).copied(),
            _ => None,
        }
    }

    /// Handles Enter on the current view. Returns the fetch the provider has to run, if any.
    pub fn activate(&mut self) -> Option<ProviderCommand> {
        match self.view.clone() {
            View::Menu => match self.selected_menu_item()? {
                MenuItem::NextMatch => {
                    self.navigate(View::Loading {
                        pending: Pending::Teams,
                    });
                    Some(ProviderCommand::FetchTeams)
                }
                MenuItem::Standings => {
                    self.navigate(View::Loading {
                        pending: Pending::Standings,
                    });
                    Some(ProviderCommand::FetchStandings)
                }
                MenuItem::Relegation => {
                    self.navigate(View::Loading {
                        pending: Pending::Relegation,
                    });
                    Some(ProviderCommand::FetchStandings)
                }
                MenuItem::Export => Some(self.request_export()),
            },
            View::SelectTeam => {
                let team = self.teams.get(self.selected)?.clone();
                let team_id = team.id;
                self.selected_team = Some(team);
                self.team_matches.clear();
                self.team_matches_for = None;
                self.navigate(View::Loading {
                    pending: Pending::TeamMatches { team_id },
                });
                Some(ProviderCommand::FetchTeamMatches { team_id })
            }
            View::Standings | View::Relegation { team_id: None } => {
                let team_id = self.standings.get(self.selected)?.team.id;
                self.navigate(View::Relegation {
                    team_id: Some(team_id),
                });
                None
            }
            View::NextMatch { .. }
            | View::Relegation { team_id: Some(_) }
            | View::Loading { .. }
            | View::Error { .. } => None,
        }
    }

    /// Re-fetch whatever the current view shows.
    pub fn refresh(&self) -> Option<ProviderCommand> {
        match self.view {
            View::SelectTeam => Some(ProviderCommand::FetchTeams),
            View::Standings | View::Relegation { .. } => Some(ProviderCommand::FetchStandings),
            View::NextMatch { team_id } => Some(ProviderCommand::FetchTeamMatches { team_id }),
            View::Menu | View::Loading { .. } | View::Error { .. } => None,
        }
    }

    /// Export works from any view and leaves navigation alone.
    pub fn request_export(&mut self) -> ProviderCommand {
        self.push_log("[INFO] Export requested");
        ProviderCommand::ExportStandings
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn team(&self, team_id: u32) -> Option<&Team> {
        self.teams
            .iter()
            .chain(self.standings.iter().map(|row| &row.team))
            .find(|t| t.id == team_id)
    }

    /// The fixture shown on the next-match screen, evaluated at `now`.
    pub fn next_match_at(&self, now: DateTime<Utc>) -> Option<&Match> {
        let team_id = self.team_matches_for?;
        next_fixture_for_team(&self.team_matches, team_id, &self.competition, now)
    }

    pub fn tier_of(&self, row: &StandingsRow) -> Tier {
        classify(row.position, &self.season)
    }

    pub fn relegation_report(&self, team_id: u32) -> Result<RelegationReport, AnalysisError> {
        analyze_team(team_id, &self.standings, &self.season)
    }

    pub fn relegation_reports(&self) -> Result<Vec<RelegationReport>, AnalysisError> {
        analyze_table(&self.standings, &self.season)
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetTeams(Vec<Team>),
    SetStandings(Vec<StandingsRow>),
    SetTeamMatches { team_id: u32, matches: Vec<Match> },
    ExportFinished { path: String, rows: usize },
    Failed { message: String },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchTeams,
    FetchStandings,
    FetchTeamMatches { team_id: u32 },
    ExportStandings,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTeams(teams) => {
            state.teams = teams;
            state.teams_fetched_at = Some(SystemTime::now());
            state.snapshot_dirty = true;
            if state.view == (View::Loading { pending: Pending::Teams }) {
                state.replace_view(View::SelectTeam);
            }
            state.clamp_selection();
        }
        Delta::SetStandings(rows) => {
            state.standings = rows;
            state.standings_fetched_at = Some(SystemTime::now());
            state.snapshot_dirty = true;
            match state.view {
                View::Loading {
                    pending: Pending::Standings,
                } => state.replace_view(View::Standings),
                View::Loading {
                    pending: Pending::Relegation,
                } => state.replace_view(View::Relegation { team_id: None }),
                _ => {}
            }
            state.clamp_selection();
        }
        Delta::SetTeamMatches { team_id, matches } => {
            // Ignore answers for a team the user has already navigated away from.
            if state.selected_team.as_ref().map(|t| t.id) != Some(team_id) {
                return;
            }
            state.team_matches = matches;
            state.team_matches_for = Some(team_id);
            if state.view
                == (View::Loading {
                    pending: Pending::TeamMatches { team_id },
                })
            {
                state.replace_view(View::NextMatch { team_id });
            }
        }
        Delta::ExportFinished { path, rows } => {
            state.push_log(format!("[INFO] Exported {rows} rows to {path}"));
        }
        Delta::Failed { message } => {
            state.push_log(format!("[WARN] {message}"));
            if matches!(state.view, View::Loading { .. }) {
                state.replace_view(View::Error { message });
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn menu_label(item: MenuItem) -> &'static str {
    match item {
        MenuItem::NextMatch => "Next match",
        MenuItem::Standings => "League table",
        MenuItem::Relegation => "Relegation watch",
        MenuItem::Export => "Export to xlsx",
    }
}
