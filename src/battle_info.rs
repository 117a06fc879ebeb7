//! Static description of an encounter, loadable from JSON.

use crate::creature::Creature;
use crate::env::BattleEnv;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Item id -> quantity.
pub type Bag = BTreeMap<String, u32>;

fn default_vs_type() -> usize {
    1
}

fn default_max_level() -> u8 {
    100
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleInfo {
    /// `parties[bank][party]` is the creature list of one trainer.
    pub parties: Vec<Vec<Vec<Creature>>>,
    /// Trainer names per bank; empty for a wild bank.
    #[serde(default)]
    pub names: Vec<Vec<String>>,
    #[serde(default)]
    pub classes: Vec<Vec<String>>,
    #[serde(default)]
    pub bags: Vec<Vec<Bag>>,
    #[serde(default)]
    pub ai_levels: Vec<Vec<u8>>,
    #[serde(default)]
    pub base_money: Vec<Vec<u32>>,
    /// Creatures on the field per bank.
    #[serde(default = "default_vs_type")]
    pub vs_type: usize,
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    #[serde(default)]
    pub battle_id: u32,
    #[serde(default)]
    pub background_name: String,
    #[serde(default)]
    pub env: BattleEnv,
}

impl BattleInfo {
    /// Player party against one wild creature.
    pub fn wild(player: Vec<Creature>, wild: Creature) -> Self {
        Self {
            parties: vec![vec![player], vec![vec![wild]]],
            names: vec![vec!["Player".to_string()], Vec::new()],
            classes: vec![vec!["Trainer".to_string()], Vec::new()],
            bags: vec![vec![Bag::new()], Vec::new()],
            ai_levels: vec![Vec::new(), vec![0]],
            base_money: Vec::new(),
            vs_type: 1,
            max_level: default_max_level(),
            battle_id: 0,
            background_name: String::new(),
            env: BattleEnv::default(),
        }
    }

    /// Player party against a named trainer.
    pub fn trainer(player: Vec<Creature>, name: &str, class: &str, foes: Vec<Creature>, base_money: u32) -> Self {
        Self {
            parties: vec![vec![player], vec![foes]],
            names: vec![vec!["Player".to_string()], vec![name.to_string()]],
            classes: vec![vec!["Trainer".to_string()], vec![class.to_string()]],
            bags: vec![vec![Bag::new()], vec![Bag::new()]],
            ai_levels: vec![Vec::new(), vec![1]],
            base_money: vec![Vec::new(), vec![base_money]],
            vs_type: 1,
            max_level: default_max_level(),
            battle_id: 0,
            background_name: String::new(),
            env: BattleEnv::default(),
        }
    }

    pub fn bank_count(&self) -> usize {
        self.parties.len()
    }

    /// Any bank other than the player's has trainers.
    pub fn trainer_battle(&self) -> bool {
        self.names.iter().skip(1).any(|names| !names.is_empty())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.parties.len() < 2 {
            anyhow::bail!("a battle needs at least two banks, got {}", self.parties.len());
        }
        if self.vs_type == 0 {
            anyhow::bail!("vs_type must be at least 1");
        }
        for (bank, parties) in self.parties.iter().enumerate() {
            if parties.iter().all(|party| party.is_empty()) {
                anyhow::bail!("bank {bank} has no creatures");
            }
            let names = self.names.get(bank).map_or(0, Vec::len);
            if names > 0 {
                let classes = self.classes.get(bank).map_or(0, Vec::len);
                if names != classes || names != parties.len() {
                    anyhow::bail!(
                        "bank {bank}: {names} names, {classes} classes and {} parties do not line up",
                        parties.len()
                    );
                }
            }
            for creature in parties.iter().flatten() {
                if creature.level == 0 || creature.level > self.max_level.max(1) {
                    anyhow::bail!(
                        "bank {bank}: {} has level {} outside 1..={}",
                        creature.species,
                        creature.level,
                        self.max_level
                    );
                }
                if creature.skills.is_empty() {
                    anyhow::bail!("bank {bank}: {} knows no skill", creature.species);
                }
                for skill in &creature.skills {
                    if crate::skills::get(skill).is_none() {
                        anyhow::bail!("bank {bank}: {} knows unknown skill {skill}", creature.species);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let info: BattleInfo = serde_json::from_str(raw).context("Failed to parse battle info JSON")?;
        info.validate()?;
        Ok(info)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read battle info at {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("Invalid battle info in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{onix, pikachu};

    #[test]
    fn wild_battle_is_not_a_trainer_battle() {
        let info = BattleInfo::wild(vec![pikachu()], onix());
        assert!(!info.trainer_battle());
        info.validate().unwrap();
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let mut info = BattleInfo::trainer(vec![pikachu()], "Brock", "Leader", vec![onix()], 100);
        info.classes[1].clear();
        assert!(info.validate().is_err());
    }

    #[test]
    fn json_round_trip_keeps_defaults() {
        let raw = r#"{
            "parties": [
                [[{"species": "pikachu", "level": 12, "types": ["electric"],
                   "base_stats": {"hp": 35, "atk": 55, "dfe": 40, "ats": 50, "dfs": 50, "spd": 90},
                   "skills": ["thunderbolt"], "ability": "static"}]],
                [[{"species": "onix", "level": 10, "types": ["rock", "ground"],
                   "base_stats": {"hp": 35, "atk": 45, "dfe": 160, "ats": 30, "dfs": 45, "spd": 70},
                   "skills": ["tackle"], "ability": "rockhead"}]]
            ]
        }"#;
        let info = BattleInfo::from_json_str(raw).unwrap();
        assert_eq!(info.vs_type, 1);
        assert_eq!(info.max_level, 100);
        assert_eq!(info.parties[0][0][0].ivs, [31; 6]);
        assert!(!info.env.hardcore);
    }

    #[test]
    fn unknown_skill_fails_validation() {
        let info = BattleInfo::wild(vec![pikachu().with_skills(&["splash"])], onix());
        let err = info.validate().unwrap_err();
        assert!(err.to_string().contains("splash"));
    }
}
