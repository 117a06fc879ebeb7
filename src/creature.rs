//! Persistent creature data: what exists before the battle and survives it.

use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Poison,
    Toxic,
    Paralysis,
    Burn,
    Sleep,
    Freeze,
}

impl Status {
    pub fn name(self) -> &'static str {
        match self {
            Status::Poison => "psn",
            Status::Toxic => "tox",
            Status::Paralysis => "par",
            Status::Burn => "brn",
            Status::Sleep => "slp",
            Status::Freeze => "frz",
        }
    }

    pub fn is_poison(self) -> bool {
        matches!(self, Status::Poison | Status::Toxic)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub dfe: u16,
    pub ats: u16,
    pub dfs: u16,
    pub spd: u16,
}

/// Computed (non-stage) stats of a creature at a given level.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSet {
    pub hp: u16,
    pub atk: u16,
    pub dfe: u16,
    pub ats: u16,
    pub dfs: u16,
    pub spd: u16,
}

impl StatsSet {
    pub fn from_base(base: BaseStats, ivs: [u8; 6], level: u8) -> Self {
        Self {
            hp: calc_hp(base.hp, ivs[0], level),
            atk: calc_stat(base.atk, ivs[1], level),
            dfe: calc_stat(base.dfe, ivs[2], level),
            ats: calc_stat(base.ats, ivs[3], level),
            dfs: calc_stat(base.dfs, ivs[4], level),
            spd: calc_stat(base.spd, ivs[5], level),
        }
    }
}

pub fn calc_hp(base: u16, iv: u8, level: u8) -> u16 {
    let base_value = base as u32 * 2 + iv as u32;
    let intermediate = (base_value * level as u32) / 100;
    (intermediate + level as u32 + 10) as u16
}

pub fn calc_stat(base: u16, iv: u8, level: u8) -> u16 {
    let base_value = base as u32 * 2 + iv as u32;
    let intermediate = (base_value * level as u32) / 100;
    (intermediate + 5) as u16
}

/// Medium-fast growth curve.
pub fn exp_for_level(level: u8) -> u32 {
    let level = level as u32;
    level * level * level
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    pub level: u8,
    pub into: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MegaData {
    pub stone: String,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<Type>>,
}

fn default_ivs() -> [u8; 6] {
    [31; 6]
}

fn default_rareness() -> u8 {
    45
}

fn default_base_exp() -> u16 {
    64
}

fn default_weight() -> f32 {
    10.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub species: String,
    #[serde(default)]
    pub nickname: Option<String>,
    pub level: u8,
    #[serde(default)]
    pub exp: Option<u32>,
    pub types: Vec<Type>,
    pub base_stats: BaseStats,
    #[serde(default = "default_ivs")]
    pub ivs: [u8; 6],
    /// `None` means full HP.
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default)]
    pub status: Option<Status>,
    pub skills: Vec<String>,
    /// Remaining PP per skill; empty means full.
    #[serde(default)]
    pub pp: Vec<u8>,
    pub ability: String,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default = "default_rareness")]
    pub rareness: u8,
    #[serde(default = "default_base_exp")]
    pub base_exp: u16,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub evolution: Option<Evolution>,
    #[serde(default)]
    pub mega: Option<MegaData>,
    #[serde(default)]
    pub form: u8,
}

impl Creature {
    pub fn new(species: impl Into<String>, level: u8, types: &[Type], base_stats: BaseStats) -> Self {
        Self {
            species: species.into(),
            nickname: None,
            level,
            exp: None,
            types: types.to_vec(),
            base_stats,
            ivs: default_ivs(),
            hp: None,
            status: None,
            skills: Vec::new(),
            pp: Vec::new(),
            ability: String::new(),
            item: None,
            rareness: default_rareness(),
            base_exp: default_base_exp(),
            weight: default_weight(),
            evolution: None,
            mega: None,
            form: 0,
        }
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.species)
    }

    pub fn stats(&self) -> StatsSet {
        StatsSet::from_base(self.base_stats, self.ivs, self.level)
    }

    pub fn max_hp(&self) -> u16 {
        self.stats().hp
    }

    pub fn current_hp(&self) -> u16 {
        self.hp.unwrap_or_else(|| self.max_hp()).min(self.max_hp())
    }

    pub fn exp(&self) -> u32 {
        self.exp.unwrap_or_else(|| exp_for_level(self.level))
    }

    pub fn type_pair(&self) -> [Type; 2] {
        let first = self.types.first().copied().unwrap_or(Type::Normal);
        let second = self.types.get(1).copied().unwrap_or(first);
        [first, second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charizard_base() -> BaseStats {
        BaseStats {
            hp: 78,
            atk: 84,
            dfe: 78,
            ats: 109,
            dfs: 85,
            spd: 100,
        }
    }

    #[test]
    fn stats_at_level_fifty() {
        let stats = StatsSet::from_base(charizard_base(), [31; 6], 50);
        assert_eq!(stats.hp, 153);
        assert_eq!(stats.atk, 104);
        assert_eq!(stats.spd, 120);
    }

    #[test]
    fn missing_hp_means_full() {
        let creature = Creature::new("charizard", 50, &[Type::Fire, Type::Flying], charizard_base());
        assert_eq!(creature.current_hp(), creature.max_hp());
        assert_eq!(creature.exp(), 125_000);
    }

    #[test]
    fn single_type_is_repeated() {
        let creature = Creature::new("pikachu", 5, &[Type::Electric], BaseStats::default());
        assert_eq!(creature.type_pair(), [Type::Electric, Type::Electric]);
    }
}
