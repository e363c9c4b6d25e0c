use serde::{Deserialize, Serialize};

use crate::model::Season;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    ChampionsLeague,
    EuropaLeague,
    ConferenceLeague,
    RelegationPlayoff,
    Relegation,
    None,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::ChampionsLeague => "UCL",
            Tier::EuropaLeague => "UEL",
            Tier::ConferenceLeague => "UECL",
            Tier::RelegationPlayoff => "PLAYOFF",
            Tier::Relegation => "RELEG",
            Tier::None => "",
        }
    }
}

/// Maps a 1-based table position to the competition it leads to.
///
/// European places are fixed; the relegation places come from `season`. Positions outside
/// every range (including 0) map to `Tier::None`.
pub fn classify(position: u32, season: &Season) -> Tier {
    match position {
        1 | 2 => Tier::ChampionsLeague,
        3 => Tier::EuropaLeague,
        4 => Tier::ConferenceLeague,
        p if p == season.direct_relegation_boundary => Tier::RelegationPlayoff,
        p if p >= season.relegation_cutoff_position => Tier::Relegation,
        _ => Tier::None,
    }
}
