//! Environment toggles of one battle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Rain,
    Sun,
    Sand,
    Hail,
}

impl Weather {
    pub fn name(self) -> &'static str {
        match self {
            Weather::Rain => "RainDance",
            Weather::Sun => "SunnyDay",
            Weather::Sand => "Sandstorm",
            Weather::Hail => "Hail",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTerrain {
    Electric,
    Grassy,
    Misty,
    Psychic,
}

impl FieldTerrain {
    pub fn name(self) -> &'static str {
        match self {
            FieldTerrain::Electric => "Electric Terrain",
            FieldTerrain::Grassy => "Grassy Terrain",
            FieldTerrain::Misty => "Misty Terrain",
            FieldTerrain::Psychic => "Psychic Terrain",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleEnv {
    /// Current weather; owned by the weather handler once the battle runs.
    pub weather: Option<Weather>,
    pub field_terrain: Option<FieldTerrain>,
    pub catching_disabled: bool,
    /// The AI bank may win even while the player still has reserves.
    pub ai_can_win: bool,
    pub hardcore: bool,
    pub near_water: bool,
    pub cave_or_night: bool,
    pub fishing: bool,
    pub caught_species: BTreeSet<String>,
    pub seen_species: BTreeSet<String>,
    pub unique_captures: u32,
    pub money: u32,
}

impl BattleEnv {
    pub fn has_caught(&self, species: &str) -> bool {
        self.caught_species.contains(species)
    }
}
