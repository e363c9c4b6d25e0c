use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::demo;
use crate::export::export_standings;
use crate::football_data::FootballData;
use crate::model::{Match, StandingsRow, Team};
use crate::state::{Delta, ProviderCommand};

/// Where league data comes from: the live API, or the built-in sample league when no API key
/// is configured.
pub enum Source {
    Live(FootballData),
    Demo,
}

impl Source {
    pub fn from_config(config: &AppConfig) -> Self {
        match FootballData::new(config) {
            Some(client) => Source::Live(client),
            None => Source::Demo,
        }
    }

    fn teams(&self) -> Result<Vec<Team>> {
        match self {
            Source::Live(client) => client.fetch_teams(),
            Source::Demo => Ok(demo::seed_teams()),
        }
    }

    fn standings(&self) -> Result<Vec<StandingsRow>> {
        match self {
            Source::Live(client) => client.fetch_standings(),
            Source::Demo => Ok(demo::seed_standings()),
        }
    }

    fn team_matches(&self, team_id: u32, config: &AppConfig) -> Result<Vec<Match>> {
        match self {
            Source::Live(client) => client.fetch_team_matches(team_id),
            Source::Demo => Ok(demo::seed_team_matches(
                Utc::now(),
                config.season.total_matchdays,
                team_id,
                config.match_limit as usize,
            )),
        }
    }
}

pub fn spawn_provider(config: AppConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let source = Source::from_config(&config);
        if matches!(source, Source::Demo) {
            let _ = tx.send(Delta::Log(
                "[INFO] No FOOTBALL_DATA_API_KEY set, showing demo league".to_string(),
            ));
        }

        // Blocks until the UI drops its sender.
        for cmd in cmd_rx {
            handle_command(&source, &config, cmd, &tx);
        }
        info!("provider stopped");
    });
}

pub fn handle_command(
    source: &Source,
    config: &AppConfig,
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
) {
    match cmd {
        ProviderCommand::FetchTeams => match source.teams() {
            Ok(teams) => {
                let _ = tx.send(Delta::SetTeams(teams));
            }
            Err(err) => send_failure(tx, "Teams", &err),
        },
        ProviderCommand::FetchStandings => match source.standings() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetStandings(rows));
            }
            Err(err) => send_failure(tx, "Standings", &err),
        },
        ProviderCommand::FetchTeamMatches { team_id } => {
            match source.team_matches(team_id, config) {
                Ok(matches) => {
                    let _ = tx.send(Delta::SetTeamMatches { team_id, matches });
                }
                Err(err) => send_failure(tx, "Matches", &err),
            }
        }
        ProviderCommand::ExportStandings => {
            let result = source.standings().and_then(|rows| {
                let report = export_standings(&config.export_path, &rows, &config.season)?;
                let _ = tx.send(Delta::SetStandings(rows));
                Ok(report)
            });
            match result {
                Ok(report) => {
                    let _ = tx.send(Delta::ExportFinished {
                        path: config.export_path.display().to_string(),
                        rows: report.standings_rows + report.relegation_rows,
                    });
                }
                Err(err) => send_failure(tx, "Export", &err),
            }
        }
    }
}

fn send_failure(tx: &Sender<Delta>, what: &str, err: &anyhow::Error) {
    warn!("{what} failed: {err:#}");
    let _ = tx.send(Delta::Failed {
        message: format!("{what} error: {err:#}"),
    });
}
