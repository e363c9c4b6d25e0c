//! Runtime configuration.
//!
//! Everything is read from the environment (after `.env.local` / `.env` are loaded by
//! `main`). Bad values fall back to defaults rather than failing startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::model::Season;

/// football-data.org API base
pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org";

/// Liga Portugal competition code
pub const DEFAULT_COMPETITION: &str = "PPL";

/// Matches requested per team (the API caps this well above what we need)
pub const DEFAULT_MATCH_LIMIT: u32 = 5;

/// Freshness window for cached responses, mirrors `s-maxage=60`
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 60;

pub const DEFAULT_EXPORT_PATH: &str = "liga_export.xlsx";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub competition: String,
    pub season: Season,
    pub cache_max_age: Duration,
    pub match_limit: u32,
    pub export_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            competition: DEFAULT_COMPETITION.to_string(),
            season: Season::default(),
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS),
            match_limit: DEFAULT_MATCH_LIMIT,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_key = lookup("FOOTBALL_DATA_API_KEY")
            .or_else(|| lookup("VITE_API_KEY"))
            .and_then(|v| non_empty(&v));
        let base_url = lookup("FOOTBALL_DATA_BASE_URL")
            .and_then(|v| non_empty(&v))
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let competition = lookup("LIGA_COMPETITION")
            .and_then(|v| non_empty(&v))
            .map(|v| v.to_ascii_uppercase())
            .unwrap_or(defaults.competition);

        let season = Season::new(
            parse_or(&lookup, "LIGA_TOTAL_MATCHDAYS", defaults.season.total_matchdays),
            parse_or(
                &lookup,
                "LIGA_RELEGATION_CUTOFF",
                defaults.season.relegation_cutoff_position,
            ),
            parse_or(
                &lookup,
                "LIGA_PLAYOFF_POSITION",
                defaults.season.direct_relegation_boundary,
            ),
        );
        let season = if season.is_valid() {
            season
        } else {
            warn!(?season, "inconsistent season settings, using defaults");
            defaults.season
        };

        let cache_max_age = Duration::from_secs(parse_or(
            &lookup,
            "LIGA_CACHE_MAX_AGE_SECS",
            DEFAULT_CACHE_MAX_AGE_SECS,
        ));
        let match_limit = parse_or(&lookup, "LIGA_MATCH_LIMIT", DEFAULT_MATCH_LIMIT).clamp(1, 50);
        let export_path = lookup("LIGA_EXPORT_PATH")
            .and_then(|v| non_empty(&v))
            .map(PathBuf::from)
            .unwrap_or(defaults.export_path);

        Self {
            api_key,
            base_url,
            competition,
            season,
            cache_max_age,
            match_limit,
            export_path,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.api_key.is_none()
    }
}

/// Per-user cache directory, `$XDG_CACHE_HOME/liga_terminal` or `~/.cache/liga_terminal`.
pub fn app_cache_dir() -> Option<PathBuf> {
    const CACHE_DIR: &str = "liga_terminal";
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
