pub mod config;
pub mod demo;
pub mod export;
pub mod football_data;
pub mod http_cache;
pub mod http_client;
pub mod model;
pub mod next_fixture;
pub mod persist;
pub mod provider;
pub mod relegation;
pub mod season;
pub mod state;
pub mod tier;

pub use model::{Match, Season, StandingsRow, Team, Venue};
pub use next_fixture::{next_fixture, next_fixture_for_team};
pub use relegation::{
    AnalysisError, RelegationReport, RelegationStatus, analyze, analyze_table, analyze_team,
};
pub use season::{games_remaining, max_possible_points};
pub use tier::{Tier, classify};
