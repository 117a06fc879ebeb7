//! Battle-scoped wrapper around a persistent [`Creature`].

use crate::creature::{Creature, StatsSet, Status};
use crate::effects::{Effect, EffectKind, Scope};
use crate::skills::{self, SkillData};
use crate::types::Type;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BattlerId {
    pub bank: usize,
    pub index: usize,
}

impl BattlerId {
    pub const fn new(bank: usize, index: usize) -> Self {
        Self { bank, index }
    }
}

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Atk,
    Dfe,
    Ats,
    Dfs,
    Spd,
    Acc,
    Eva,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Dfe,
        Stat::Ats,
        Stat::Dfs,
        Stat::Spd,
        Stat::Acc,
        Stat::Eva,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            Stat::Atk => "atk",
            Stat::Dfe => "def",
            Stat::Ats => "spa",
            Stat::Dfs => "spd",
            Stat::Spd => "spe",
            Stat::Acc => "accuracy",
            Stat::Eva => "evasion",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Stat::Atk => "Attack",
            Stat::Dfe => "Defense",
            Stat::Ats => "Sp. Atk",
            Stat::Dfs => "Sp. Def",
            Stat::Spd => "Speed",
            Stat::Acc => "accuracy",
            Stat::Eva => "evasiveness",
        }
    }
}

/// Multiplier of a battle stat at a given stage.
pub fn stage_multiplier(stage: i8) -> f64 {
    if stage >= 0 {
        (2 + stage as i32) as f64 / 2.0
    } else {
        2.0 / (2 - stage as i32) as f64
    }
}

/// Accuracy and evasion use thirds instead of halves.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    if stage >= 0 {
        (3 + stage as i32) as f64 / 3.0
    } else {
        3.0 / (3 - stage as i32) as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkillSlot {
    pub id: String,
    pub pp: u8,
    pub max_pp: u8,
}

impl SkillSlot {
    pub fn data(&self) -> &'static SkillData {
        skills::get(&self.id).unwrap_or_else(|| skills::struggle())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LastHit {
    pub launcher: BattlerId,
    pub turn: u32,
    pub damage: u16,
}

/// State copied from another battler by a transformation; reverted on switch-out.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformBackup {
    pub source: BattlerId,
    species: String,
    types: [Type; 2],
    stats: StatsSet,
    ability: String,
    skills: Vec<SkillSlot>,
}

#[derive(Clone, Debug)]
pub struct Battler {
    pub id: BattlerId,
    pub party_id: usize,
    pub position: Option<usize>,
    pub from_party: bool,
    creature: Creature,
    pub species: String,
    pub name: String,
    pub level: u8,
    pub exp: u32,
    pub types: [Type; 2],
    pub stats: StatsSet,
    pub hp: u16,
    pub max_hp: u16,
    stages: [i8; 7],
    pub status: Option<Status>,
    /// Sleep turns left, or the toxic counter.
    pub status_count: u8,
    /// Confusion turns left; zero when not confused.
    pub confusion: u8,
    pub flinch: bool,
    pub item: Option<String>,
    pub original_item: Option<String>,
    pub ability: String,
    pub original_ability: String,
    pub skills: Vec<SkillSlot>,
    /// Turns spent on the field since the last entrance.
    pub turn_count: u32,
    pub last_sent_turn: Option<u32>,
    pub attack_order: Option<usize>,
    pub last_hit_by: Option<LastHit>,
    pub last_skill: Option<String>,
    pub ko_count: u32,
    pub mega_evolved: bool,
    pub form: u8,
    pub transform: Option<TransformBackup>,
    /// Foes this battler faced while on the field; used for exp sharing.
    pub encountered: Vec<BattlerId>,
    pub ability_effect: Option<Effect>,
    pub item_effect: Option<Effect>,
}

impl Battler {
    pub fn from_creature(id: BattlerId, party_id: usize, creature: Creature, from_party: bool) -> anyhow::Result<Self> {
        let stats = creature.stats();
        let mut skill_slots = Vec::with_capacity(creature.skills.len());
        for (i, skill_id) in creature.skills.iter().enumerate() {
            let data = skills::get(skill_id)
                .with_context(|| format!("{} knows unknown skill {skill_id}", creature.species))?;
            let pp = creature.pp.get(i).copied().unwrap_or(data.pp).min(data.pp);
            skill_slots.push(SkillSlot {
                id: data.id.to_string(),
                pp,
                max_pp: data.pp,
            });
        }
        if skill_slots.is_empty() {
            anyhow::bail!("{} has no skills", creature.species);
        }
        let ability = crate::normalize_id(&creature.ability);
        let item = creature.item.as_deref().map(crate::normalize_id);
        let status = creature.status;
        let status_count = match status {
            Some(Status::Sleep) => 2,
            _ => 0,
        };
        let mut battler = Self {
            id,
            party_id,
            position: None,
            from_party,
            species: creature.species.clone(),
            name: creature.display_name().to_string(),
            level: creature.level,
            exp: creature.exp(),
            types: creature.type_pair(),
            stats,
            hp: creature.current_hp(),
            max_hp: stats.hp,
            stages: [0; 7],
            status,
            status_count,
            confusion: 0,
            flinch: false,
            item: item.clone(),
            original_item: item,
            ability: ability.clone(),
            original_ability: ability,
            skills: skill_slots,
            turn_count: 0,
            last_sent_turn: None,
            attack_order: None,
            last_hit_by: None,
            last_skill: None,
            ko_count: 0,
            mega_evolved: false,
            form: creature.form,
            transform: None,
            encountered: Vec::new(),
            ability_effect: None,
            item_effect: None,
            creature,
        };
        battler.refresh_ability_effect();
        battler.refresh_item_effect();
        Ok(battler)
    }

    pub fn creature(&self) -> &Creature {
        &self.creature
    }

    pub fn creature_mut(&mut self) -> &mut Creature {
        &mut self.creature
    }

    pub fn dead(&self) -> bool {
        self.hp == 0
    }

    pub fn alive(&self) -> bool {
        self.hp > 0
    }

    pub fn on_field(&self) -> bool {
        self.position.is_some()
    }

    pub fn stat_stage(&self, stat: Stat) -> i8 {
        self.stages[stat.slot()]
    }

    pub fn set_stat_stage(&mut self, stat: Stat, stage: i8) {
        self.stages[stat.slot()] = stage.clamp(MIN_STAGE, MAX_STAGE);
    }

    pub fn stages(&self) -> [i8; 7] {
        self.stages
    }

    pub fn reset_stages(&mut self) {
        self.stages = [0; 7];
    }

    pub fn has_type(&self, kind: Type) -> bool {
        self.types.contains(&kind)
    }

    pub fn has_ability(&self, ability: &str) -> bool {
        self.ability == ability
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.item.as_deref() == Some(item)
    }

    /// Raw stat times its stage multiplier.
    pub fn staged_stat(&self, stat: Stat) -> f64 {
        let raw = match stat {
            Stat::Atk => self.stats.atk,
            Stat::Dfe => self.stats.dfe,
            Stat::Ats => self.stats.ats,
            Stat::Dfs => self.stats.dfs,
            Stat::Spd => self.stats.spd,
            Stat::Acc | Stat::Eva => return accuracy_stage_multiplier(self.stat_stage(stat)),
        };
        raw as f64 * stage_multiplier(self.stat_stage(stat))
    }

    pub fn hp_rate(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    pub fn grounded(&self) -> bool {
        !self.has_type(Type::Flying) && !self.has_ability("levitate")
    }

    pub fn is_confused(&self) -> bool {
        self.confusion > 0
    }

    pub fn refresh_ability_effect(&mut self) {
        self.ability_effect = (!self.ability.is_empty()).then(|| {
            Effect::permanent(EffectKind::Ability(self.ability.clone()), Scope::Battler(self.id))
        });
    }

    pub fn refresh_item_effect(&mut self) {
        self.item_effect = self
            .item
            .as_ref()
            .map(|item| Effect::permanent(EffectKind::Item(item.clone()), Scope::Battler(self.id)));
    }

    /// Clears everything that does not survive leaving the field.
    pub fn reset_volatile(&mut self) {
        self.reset_stages();
        self.confusion = 0;
        self.flinch = false;
        self.turn_count = 0;
        self.attack_order = None;
        if self.status == Some(Status::Toxic) {
            self.status_count = 0;
        }
        self.revert_transform();
        if self.ability != self.original_ability {
            self.ability = self.original_ability.clone();
            self.refresh_ability_effect();
        }
    }

    pub fn apply_transform(&mut self, source: &Battler) {
        if self.transform.is_none() {
            self.transform = Some(TransformBackup {
                source: source.id,
                species: self.species.clone(),
                types: self.types,
                stats: self.stats,
                ability: self.ability.clone(),
                skills: self.skills.clone(),
            });
        }
        self.species = source.species.clone();
        self.types = source.types;
        let hp = self.stats.hp;
        self.stats = source.stats;
        self.stats.hp = hp;
        self.stages = source.stages;
        self.ability = source.ability.clone();
        self.skills = source
            .skills
            .iter()
            .map(|slot| SkillSlot {
                id: slot.id.clone(),
                pp: 5.min(slot.max_pp),
                max_pp: 5.min(slot.max_pp),
            })
            .collect();
        self.refresh_ability_effect();
    }

    pub fn revert_transform(&mut self) {
        if let Some(backup) = self.transform.take() {
            self.species = backup.species;
            self.types = backup.types;
            self.stats = backup.stats;
            self.ability = backup.ability;
            self.skills = backup.skills;
            self.refresh_ability_effect();
        }
    }

    pub fn add_encountered(&mut self, foe: BattlerId) {
        if !self.encountered.contains(&foe) {
            self.encountered.push(foe);
        }
    }

    /// Recomputes stats from the creature after a level or form change, keeping damage taken.
    pub fn recalculate_stats(&mut self) {
        let lost = self.max_hp.saturating_sub(self.hp);
        self.creature.level = self.level;
        let stats = self.creature.stats();
        self.stats = stats;
        self.max_hp = stats.hp;
        if self.alive() {
            self.hp = self.max_hp.saturating_sub(lost).max(1);
        }
    }

    /// Writes battle results back into the persistent creature.
    pub fn copy_back(&mut self) {
        self.revert_transform();
        let creature = &mut self.creature;
        creature.level = self.level;
        creature.exp = Some(self.exp);
        creature.hp = Some(self.hp);
        creature.status = self.status;
        creature.item = self.original_item.clone();
        creature.form = self.form;
        let pp: Vec<u8> = creature
            .skills
            .iter()
            .map(|id| {
                let id = crate::normalize_id(id);
                self.skills
                    .iter()
                    .find(|slot| slot.id == id)
                    .map(|slot| slot.pp)
                    .unwrap_or(0)
            })
            .collect();
        creature.pp = pp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::BaseStats;

    fn battler() -> Battler {
        let creature = Creature::new(
            "pikachu",
            50,
            &[Type::Electric],
            BaseStats {
                hp: 35,
                atk: 55,
                dfe: 40,
                ats: 50,
                dfs: 50,
                spd: 90,
            },
        )
        .with_skills(&["thunderbolt", "Quick Attack"])
        .with_ability("Static");
        Battler::from_creature(BattlerId::new(0, 0), 0, creature, true).unwrap()
    }

    #[test]
    fn skills_and_ability_are_normalized() {
        let b = battler();
        assert_eq!(b.skills[1].id, "quickattack");
        assert!(b.has_ability("static"));
        assert_eq!(b.ability_effect.as_ref().map(|e| e.scope), Some(Scope::Battler(b.id)));
    }

    #[test]
    fn unknown_skill_is_a_setup_error() {
        let creature = Creature::new("ditto", 10, &[Type::Normal], BaseStats::default()).with_skills(&["notaskill"]);
        assert!(Battler::from_creature(BattlerId::new(0, 0), 0, creature, true).is_err());
    }

    #[test]
    fn stage_multipliers() {
        assert_eq!(stage_multiplier(0), 1.0);
        assert_eq!(stage_multiplier(2), 2.0);
        assert_eq!(stage_multiplier(-2), 0.5);
        assert_eq!(stage_multiplier(6), 4.0);
        assert_eq!(accuracy_stage_multiplier(-3), 0.5);
    }

    #[test]
    fn switch_out_reverts_transform_and_stages() {
        let mut b = battler();
        let mut other = battler();
        other.species = "onix".to_string();
        other.types = [Type::Rock, Type::Ground];
        other.set_stat_stage(Stat::Dfe, 2);
        b.apply_transform(&other);
        assert_eq!(b.species, "onix");
        assert_eq!(b.stat_stage(Stat::Dfe), 2);
        assert!(b.skills.iter().all(|s| s.pp == 5));
        b.reset_volatile();
        assert_eq!(b.species, "pikachu");
        assert_eq!(b.types, [Type::Electric, Type::Electric]);
        assert_eq!(b.stat_stage(Stat::Dfe), 0);
    }
}
