//! Skill data and the built-in catalog.

pub mod damage;
mod procedure;

pub use procedure::{use_skill, MoveAttempt, MovePrevention, SkillUse};

use crate::battler::Stat;
use crate::env::{FieldTerrain, Weather};
use crate::handlers::status::StatusChange;
use crate::types::Type;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    Physical,
    Special,
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkillTarget {
    /// One adjacent foe.
    Foe,
    AllFoes,
    User,
    /// The field or the user's side; no creature is targeted.
    Field,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SideCondition {
    Reflect,
    LightScreen,
    Safeguard,
    Mist,
    Tailwind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Procedure {
    Basic,
    Weather(Weather),
    FieldTerrain(FieldTerrain),
    ForceSwitch,
    SelfSwitch,
    Transform,
    SkillSwap,
    RolePlay,
    Trap,
    Bind,
    SideCondition(SideCondition),
    TrickRoom,
    HealBlock,
    /// Heals the user by a percentage of its max HP.
    Heal(u8),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SkillFlags {
    pub contact: bool,
    pub powder: bool,
    /// Announced before anything else in the turn (focus punch).
    pub pre_attack: bool,
    /// Hits a switching target before it leaves (pursuit).
    pub punishes_switch: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkillData {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: Type,
    pub category: Category,
    pub power: u16,
    /// `None` never misses.
    pub accuracy: Option<u8>,
    pub pp: u8,
    pub priority: i8,
    pub critical_stage: u8,
    pub target: SkillTarget,
    pub status: Option<StatusChange>,
    /// Percent chance of the secondary status / stat change on damaging skills.
    pub effect_chance: u8,
    pub stat_changes: &'static [(Stat, i8)],
    pub self_stat_changes: &'static [(Stat, i8)],
    /// Percent of dealt damage restored to the user.
    pub drain: Option<u8>,
    pub flags: SkillFlags,
    pub procedure: Procedure,
}

impl SkillData {
    fn new(id: &'static str, name: &'static str, kind: Type, category: Category, power: u16) -> Self {
        Self {
            id,
            name,
            kind,
            category,
            power,
            accuracy: Some(100),
            pp: 10,
            priority: 0,
            critical_stage: 0,
            target: if category == Category::Status {
                SkillTarget::User
            } else {
                SkillTarget::Foe
            },
            status: None,
            effect_chance: 100,
            stat_changes: &[],
            self_stat_changes: &[],
            drain: None,
            flags: SkillFlags::default(),
            procedure: Procedure::Basic,
        }
    }

    fn accuracy(mut self, accuracy: Option<u8>) -> Self {
        self.accuracy = accuracy;
        self
    }

    fn pp(mut self, pp: u8) -> Self {
        self.pp = pp;
        self
    }

    fn priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    fn target(mut self, target: SkillTarget) -> Self {
        self.target = target;
        self
    }

    fn status(mut self, status: StatusChange, chance: u8) -> Self {
        self.status = Some(status);
        self.effect_chance = chance;
        self
    }

    fn stats(mut self, changes: &'static [(Stat, i8)], chance: u8) -> Self {
        self.stat_changes = changes;
        self.effect_chance = chance;
        self
    }

    fn self_stats(mut self, changes: &'static [(Stat, i8)]) -> Self {
        self.self_stat_changes = changes;
        self
    }

    fn drain(mut self, percent: u8) -> Self {
        self.drain = Some(percent);
        self
    }

    fn contact(mut self) -> Self {
        self.flags.contact = true;
        self
    }

    fn powder(mut self) -> Self {
        self.flags.powder = true;
        self
    }

    fn pre_attack(mut self) -> Self {
        self.flags.pre_attack = true;
        self
    }

    fn punishes_switch(mut self) -> Self {
        self.flags.punishes_switch = true;
        self
    }

    fn procedure(mut self, procedure: Procedure) -> Self {
        self.procedure = procedure;
        self
    }

    pub fn is_damaging(&self) -> bool {
        self.category != Category::Status
    }

    pub fn targets_foe(&self) -> bool {
        matches!(self.target, SkillTarget::Foe | SkillTarget::AllFoes)
    }
}

fn build_catalog() -> Vec<SkillData> {
    use Category::*;
    use Procedure as P;
    use StatusChange as S;
    vec![
        SkillData::new("tackle", "Tackle", Type::Normal, Physical, 40).pp(35).contact(),
        SkillData::new("quickattack", "Quick Attack", Type::Normal, Physical, 40).pp(30).priority(1).contact(),
        SkillData::new("extremespeed", "Extreme Speed", Type::Normal, Physical, 80).pp(5).priority(2).contact(),
        SkillData::new("fakeout", "Fake Out", Type::Normal, Physical, 40).priority(3).status(S::Flinch, 100).contact(),
        SkillData::new("headbutt", "Headbutt", Type::Normal, Physical, 70).pp(15).status(S::Flinch, 30).contact(),
        SkillData::new("thunderbolt", "Thunderbolt", Type::Electric, Special, 90).pp(15).status(S::Paralysis, 10),
        SkillData::new("thunderwave", "Thunder Wave", Type::Electric, Status, 0)
            .accuracy(Some(90))
            .pp(20)
            .target(SkillTarget::Foe)
            .status(S::Paralysis, 100),
        SkillData::new("ember", "Ember", Type::Fire, Special, 40).pp(25).status(S::Burn, 10),
        SkillData::new("flamethrower", "Flamethrower", Type::Fire, Special, 90).pp(15).status(S::Burn, 10),
        SkillData::new("willowisp", "Will-O-Wisp", Type::Fire, Status, 0)
            .accuracy(Some(85))
            .pp(15)
            .target(SkillTarget::Foe)
            .status(S::Burn, 100),
        SkillData::new("watergun", "Water Gun", Type::Water, Special, 40).pp(25),
        SkillData::new("surf", "Surf", Type::Water, Special, 90).pp(15).target(SkillTarget::AllFoes),
        SkillData::new("icebeam", "Ice Beam", Type::Ice, Special, 90).status(S::Freeze, 10),
        SkillData::new("earthquake", "Earthquake", Type::Ground, Physical, 100).target(SkillTarget::AllFoes),
        SkillData::new("rockslide", "Rock Slide", Type::Rock, Physical, 75)
            .accuracy(Some(90))
            .target(SkillTarget::AllFoes)
            .status(S::Flinch, 30),
        SkillData::new("gigadrain", "Giga Drain", Type::Grass, Special, 75).drain(50),
        SkillData::new("sleeppowder", "Sleep Powder", Type::Grass, Status, 0)
            .accuracy(Some(75))
            .pp(15)
            .target(SkillTarget::Foe)
            .status(S::Sleep, 100)
            .powder(),
        SkillData::new("hypnosis", "Hypnosis", Type::Psychic, Status, 0)
            .accuracy(Some(60))
            .pp(20)
            .target(SkillTarget::Foe)
            .status(S::Sleep, 100),
        SkillData::new("toxic", "Toxic", Type::Poison, Status, 0)
            .accuracy(Some(90))
            .target(SkillTarget::Foe)
            .status(S::Toxic, 100),
        SkillData::new("sludgebomb", "Sludge Bomb", Type::Poison, Special, 90).status(S::Poison, 30),
        SkillData::new("confuseray", "Confuse Ray", Type::Ghost, Status, 0)
            .target(SkillTarget::Foe)
            .status(S::Confusion, 100),
        SkillData::new("shadowball", "Shadow Ball", Type::Ghost, Special, 80)
            .pp(15)
            .stats(&[(Stat::Dfs, -1)], 20),
        SkillData::new("swordsdance", "Swords Dance", Type::Normal, Status, 0)
            .accuracy(None)
            .pp(20)
            .self_stats(&[(Stat::Atk, 2)]),
        SkillData::new("agility", "Agility", Type::Psychic, Status, 0)
            .accuracy(None)
            .pp(30)
            .self_stats(&[(Stat::Spd, 2)]),
        SkillData::new("growl", "Growl", Type::Normal, Status, 0)
            .pp(40)
            .target(SkillTarget::AllFoes)
            .stats(&[(Stat::Atk, -1)], 100),
        SkillData::new("focuspunch", "Focus Punch", Type::Fighting, Physical, 150)
            .pp(20)
            .priority(-3)
            .pre_attack()
            .contact(),
        SkillData::new("pursuit", "Pursuit", Type::Dark, Physical, 40).pp(20).punishes_switch().contact(),
        SkillData::new("uturn", "U-turn", Type::Bug, Physical, 70)
            .pp(20)
            .procedure(P::SelfSwitch)
            .contact(),
        SkillData::new("roar", "Roar", Type::Normal, Status, 0)
            .accuracy(None)
            .pp(20)
            .priority(-6)
            .target(SkillTarget::Foe)
            .procedure(P::ForceSwitch),
        SkillData::new("raindance", "Rain Dance", Type::Water, Status, 0)
            .accuracy(None)
            .pp(5)
            .target(SkillTarget::Field)
            .procedure(P::Weather(Weather::Rain)),
        SkillData::new("sunnyday", "Sunny Day", Type::Fire, Status, 0)
            .accuracy(None)
            .pp(5)
            .target(SkillTarget::Field)
            .procedure(P::Weather(Weather::Sun)),
        SkillData::new("sandstorm", "Sandstorm", Type::Rock, Status, 0)
            .accuracy(None)
            .pp(10)
            .target(SkillTarget::Field)
            .procedure(P::Weather(Weather::Sand)),
        SkillData::new("hail", "Hail", Type::Ice, Status, 0)
            .accuracy(None)
            .pp(10)
            .target(SkillTarget::Field)
            .procedure(P::Weather(Weather::Hail)),
        SkillData::new("electricterrain", "Electric Terrain", Type::Electric, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Field)
            .procedure(P::FieldTerrain(FieldTerrain::Electric)),
        SkillData::new("grassyterrain", "Grassy Terrain", Type::Grass, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Field)
            .procedure(P::FieldTerrain(FieldTerrain::Grassy)),
        SkillData::new("mistyterrain", "Misty Terrain", Type::Fairy, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Field)
            .procedure(P::FieldTerrain(FieldTerrain::Misty)),
        SkillData::new("transform", "Transform", Type::Normal, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Foe)
            .procedure(P::Transform),
        SkillData::new("skillswap", "Skill Swap", Type::Psychic, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Foe)
            .procedure(P::SkillSwap),
        SkillData::new("roleplay", "Role Play", Type::Psychic, Status, 0)
            .accuracy(None)
            .target(SkillTarget::Foe)
            .procedure(P::RolePlay),
        SkillData::new("meanlook", "Mean Look", Type::Normal, Status, 0)
            .accuracy(None)
            .pp(5)
            .target(SkillTarget::Foe)
            .procedure(P::Trap),
        SkillData::new("wrap", "Wrap", Type::Normal, Physical, 15)
            .accuracy(Some(90))
            .pp(20)
            .procedure(P::Bind)
            .contact(),
        SkillData::new("reflect", "Reflect", Type::Psychic, Status, 0)
            .accuracy(None)
            .pp(20)
            .target(SkillTarget::Field)
            .procedure(P::SideCondition(SideCondition::Reflect)),
        SkillData::new("lightscreen", "Light Screen", Type::Psychic, Status, 0)
            .accuracy(None)
            .pp(30)
            .target(SkillTarget::Field)
            .procedure(P::SideCondition(SideCondition::LightScreen)),
        SkillData::new("safeguard", "Safeguard", Type::Normal, Status, 0)
            .accuracy(None)
            .pp(25)
            .target(SkillTarget::Field)
            .procedure(P::SideCondition(SideCondition::Safeguard)),
        SkillData::new("mist", "Mist", Type::Ice, Status, 0)
            .accuracy(None)
            .pp(30)
            .target(SkillTarget::Field)
            .procedure(P::SideCondition(SideCondition::Mist)),
        SkillData::new("tailwind", "Tailwind", Type::Flying, Status, 0)
            .accuracy(None)
            .pp(15)
            .target(SkillTarget::Field)
            .procedure(P::SideCondition(SideCondition::Tailwind)),
        SkillData::new("trickroom", "Trick Room", Type::Psychic, Status, 0)
            .accuracy(None)
            .pp(5)
            .priority(-7)
            .target(SkillTarget::Field)
            .procedure(P::TrickRoom),
        SkillData::new("healblock", "Heal Block", Type::Psychic, Status, 0)
            .pp(15)
            .target(SkillTarget::Foe)
            .procedure(P::HealBlock),
        SkillData::new("recover", "Recover", Type::Normal, Status, 0)
            .accuracy(None)
            .pp(5)
            .procedure(P::Heal(50)),
    ]
}

static CATALOG: Lazy<HashMap<&'static str, SkillData>> =
    Lazy::new(|| build_catalog().into_iter().map(|skill| (skill.id, skill)).collect());

static STRUGGLE: Lazy<SkillData> = Lazy::new(|| {
    SkillData::new("struggle", "Struggle", Type::Normal, Category::Physical, 50)
        .accuracy(None)
        .pp(1)
        .contact()
});

/// Looks a skill up by name or id.
pub fn get(id: &str) -> Option<&'static SkillData> {
    let id = crate::normalize_id(id);
    if id == STRUGGLE.id {
        return Some(struggle());
    }
    CATALOG.get(id.as_str())
}

pub fn struggle() -> &'static SkillData {
    &STRUGGLE
}

pub fn catalog() -> impl Iterator<Item = &'static SkillData> {
    CATALOG.values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_display_names() {
        assert_eq!(get("Quick Attack").map(|s| s.priority), Some(1));
        assert_eq!(get("U-turn").map(|s| s.procedure), Some(Procedure::SelfSwitch));
        assert!(get("hyperbeam").is_none());
    }

    #[test]
    fn status_skills_default_to_self_target() {
        let dance = get("swordsdance").unwrap();
        assert_eq!(dance.target, SkillTarget::User);
        assert!(!dance.is_damaging());
    }

    #[test]
    fn flags_are_set_where_expected() {
        assert!(get("focuspunch").unwrap().flags.pre_attack);
        assert!(get("pursuit").unwrap().flags.punishes_switch);
        assert!(get("sleeppowder").unwrap().flags.powder);
    }
}
