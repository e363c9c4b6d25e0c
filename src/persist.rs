use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::app_cache_dir;
use crate::model::{StandingsRow, Team};
use crate::state::AppState;

const CACHE_FILE: &str = "snapshot.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SnapshotFile {
    version: u32,
    competitions: HashMap<String, CompetitionSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CompetitionSnapshot {
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    teams_fetched_at: Option<u64>,
    #[serde(default)]
    standings: Vec<StandingsRow>,
    #[serde(default)]
    standings_fetched_at: Option<u64>,
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = snapshot_path() else {
        return;
    };
    load_from_path(&path, state);
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = snapshot_path() else {
        return;
    };
    save_to_path(&path, state);
}

/// Loads the snapshot for `state.competition`. A missing, unreadable or outdated file leaves
/// the state untouched.
pub fn load_from_path(path: &Path, state: &mut AppState) {
    let Some(file) = load_snapshot_file(path) else {
        return;
    };
    if file.version != CACHE_VERSION {
        debug!(version = file.version, "ignoring snapshot from another version");
        return;
    }
    let Some(snapshot) = file.competitions.get(&state.competition) else {
        return;
    };

    state.teams = snapshot.teams.clone();
    state.teams_fetched_at = snapshot.teams_fetched_at.and_then(system_time_from_secs);
    state.standings = snapshot.standings.clone();
    state.standings_fetched_at = snapshot
        .standings_fetched_at
        .and_then(system_time_from_secs);
    debug!(
        teams = state.teams.len(),
        rows = state.standings.len(),
        "snapshot loaded"
    );
}

pub fn save_to_path(path: &Path, state: &AppState) {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    let mut file = load_snapshot_file(path)
        .filter(|f| f.version == CACHE_VERSION)
        .unwrap_or_default();
    file.version = CACHE_VERSION;
    file.competitions.insert(
        state.competition.clone(),
        CompetitionSnapshot {
            teams: state.teams.clone(),
            teams_fetched_at: state.teams_fetched_at.and_then(system_time_to_secs),
            standings: state.standings.clone(),
            standings_fetched_at: state.standings_fetched_at.and_then(system_time_to_secs),
        },
    );

    let json = match serde_json::to_string(&file) {
        Ok(json) => json,
        Err(err) => {
            warn!("snapshot not serialized: {err}");
            return;
        }
    };
    let tmp = path.with_extension("json.tmp");
    if let Err(err) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        warn!("snapshot not saved: {err}");
    }
}

fn load_snapshot_file(path: &Path) -> Option<SnapshotFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<SnapshotFile>(&raw).ok()
}

fn snapshot_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

fn system_time_from_secs(secs: u64) -> Option<SystemTime> {
    UNIX_EPOCH.checked_add(std::time::Duration::from_secs(secs))
}
