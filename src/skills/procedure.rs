use super::damage::{self, DamageModifiers};
use super::{Category, Procedure, SideCondition, SkillData};
use crate::battler::{accuracy_stage_multiplier, stage_multiplier, BattlerId, Stat, MAX_STAGE, MIN_STAGE};
use crate::creature::Status;
use crate::effects::{Effect, EffectKind, Scope};
use crate::env::{FieldTerrain, Weather};
use crate::handlers::ability::can_copy;
use crate::handlers::damage::HpChange;
use crate::handlers::field_terrain::DEFAULT_TERRAIN_TURNS;
use crate::handlers::stat::StatChange;
use crate::handlers::status::StatusAttempt;
use crate::handlers::switch::SwitchReason;
use crate::handlers::weather::DEFAULT_WEATHER_TURNS;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::logic::Logic;
use crate::rng::Stream;
use crate::types::{effectiveness_dual, Type};
use std::ops::ControlFlow;

const SIDE_CONDITION_TURNS: u32 = 5;
const TAILWIND_TURNS: u32 = 4;
const TRICK_ROOM_TURNS: u32 = 5;
const HEAL_BLOCK_TURNS: u32 = 5;
const SCREEN_SINGLE: f64 = 0.5;
const SCREEN_MULTI: f64 = 2732.0 / 4096.0;
const SPREAD: f64 = 0.75;
const TERRAIN_BOOST: f64 = 5325.0 / 4096.0;

/// One use of a skill slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillUse {
    pub launcher: BattlerId,
    pub slot: usize,
    pub targets: Vec<BattlerId>,
    /// The target was marked as switching out when the turn was sorted.
    pub pursuit: bool,
}

#[derive(Clone, Debug)]
pub struct MoveAttempt {
    pub launcher: BattlerId,
    pub skill: &'static SkillData,
    pub targets: Vec<BattlerId>,
}

hook_point!(
    /// Runs before PP is spent: sleep, freeze, paralysis, flinch, confusion...
    MovePrevention: "skill" / "move_prevention", MoveAttempt => Prevented
);

/// Runs a skill from announcement to its last side effect.
pub fn use_skill(logic: &mut Logic, usage: SkillUse) {
    let SkillUse {
        launcher,
        slot,
        targets,
        pursuit,
    } = usage;
    let (skill, struggling) = {
        let slot = &logic.get(launcher).skills[slot];
        if slot.pp == 0 {
            (super::struggle(), true)
        } else {
            (slot.data(), false)
        }
    };
    let mut attempt = MoveAttempt {
        launcher,
        skill,
        targets,
    };
    if let ControlFlow::Break(prevented) = exec_hooks::<MovePrevention>(logic, &mut attempt) {
        prevented.play(logic);
        logic.get_mut(launcher).last_skill = None;
        return;
    }
    let targets = attempt.targets;

    let battler = logic.get_mut(launcher);
    if !struggling {
        battler.skills[slot].pp = battler.skills[slot].pp.saturating_sub(1);
    }
    battler.last_skill = Some(skill.id.to_string());
    let name = battler.name.clone();
    let ident = logic.ident(launcher);
    let target_ident = targets.first().map(|t| logic.ident(*t)).unwrap_or_default();
    logic.logger_mut().log_move(&ident, skill.name, &target_ident);
    logic.display_message(&format!("{name} used {}!", skill.name));

    if skill.targets_foe() && targets.is_empty() {
        logic.display_message("But there was no target...");
        return;
    }

    let spread = targets.len() > 1;
    let mut landed = false;
    for target in targets {
        if logic.get(target).dead() {
            continue;
        }
        if target != launcher && !accuracy_check(logic, launcher, target, skill) {
            let target_name = logic.get(target).name.clone();
            logic.display_message(&format!("{target_name} avoided the attack!"));
            continue;
        }
        let hit = if skill.is_damaging() {
            strike(logic, launcher, target, skill, pursuit, spread)
        } else {
            apply_status_effects(logic, launcher, target, skill);
            true
        };
        if hit {
            landed = true;
            target_procedure(logic, launcher, target, skill);
        }
    }
    if skill.targets_foe() && !landed {
        return;
    }
    for &(stat, power) in skill.self_stat_changes {
        let change = StatChange::new(stat, power, launcher).by(launcher, Some(skill.id));
        logic.stat_change_handler().stat_change_with_process(change);
    }
    field_procedure(logic, launcher, skill);
    if struggling {
        recoil(logic, launcher);
    }
}

fn accuracy_check(logic: &mut Logic, launcher: BattlerId, target: BattlerId, skill: &SkillData) -> bool {
    let Some(accuracy) = skill.accuracy else {
        return true;
    };
    let stage = (logic.get(launcher).stat_stage(Stat::Acc) - logic.get(target).stat_stage(Stat::Eva))
        .clamp(MIN_STAGE, MAX_STAGE);
    let chance = accuracy as f64 * accuracy_stage_multiplier(stage);
    logic.rng_mut().accuracy_roll() < chance
}

fn raw_stat(logic: &Logic, id: BattlerId, stat: Stat) -> u32 {
    let stats = logic.get(id).stats;
    let raw = match stat {
        Stat::Atk => stats.atk,
        Stat::Dfe => stats.dfe,
        Stat::Ats => stats.ats,
        Stat::Dfs => stats.dfs,
        _ => stats.spd,
    };
    raw.into()
}

fn weather_modifier(weather: Option<Weather>, kind: Type) -> f64 {
    match (weather, kind) {
        (Some(Weather::Rain), Type::Water) | (Some(Weather::Sun), Type::Fire) => 1.5,
        (Some(Weather::Rain), Type::Fire) | (Some(Weather::Sun), Type::Water) => 0.5,
        _ => 1.0,
    }
}

fn terrain_boosts(terrain: Option<FieldTerrain>, kind: Type) -> bool {
    matches!(
        (terrain, kind),
        (Some(FieldTerrain::Electric), Type::Electric)
            | (Some(FieldTerrain::Grassy), Type::Grass)
            | (Some(FieldTerrain::Psychic), Type::Psychic)
    )
}

/// One damaging hit on one target. Returns whether HP was actually removed.
fn strike(
    logic: &mut Logic,
    launcher: BattlerId,
    target: BattlerId,
    skill: &'static SkillData,
    pursuit: bool,
    spread: bool,
) -> bool {
    let defender = logic.get(target);
    let target_name = defender.name.clone();
    let mut effectiveness = effectiveness_dual(skill.kind, defender.types);
    if skill.kind == Type::Ground && !defender.grounded() {
        effectiveness = 0.0;
    }
    if effectiveness == 0.0 {
        logic.display_message(&format!("It doesn't affect {target_name}..."));
        return false;
    }
    let critical = logic
        .rng_mut()
        .critical_hit(damage::critical_chance(skill.critical_stage));

    let physical = skill.category == Category::Physical;
    let (atk_stat, def_stat) = if physical {
        (Stat::Atk, Stat::Dfe)
    } else {
        (Stat::Ats, Stat::Dfs)
    };
    let attacker = logic.get(launcher);
    let mut atk_stage = attacker.stat_stage(atk_stat);
    let mut def_stage = logic.get(target).stat_stage(def_stat);
    if critical {
        atk_stage = atk_stage.max(0);
        def_stage = def_stage.min(0);
    }
    let attack = (raw_stat(logic, launcher, atk_stat) as f64 * stage_multiplier(atk_stage)) as u32;
    let defense = (raw_stat(logic, target, def_stat) as f64 * stage_multiplier(def_stage)) as u32;
    let burn = if physical && attacker.status == Some(Status::Burn) && !attacker.has_ability("guts") {
        0.5
    } else {
        1.0
    };
    let stab = attacker.has_type(skill.kind);
    let level = attacker.level;
    let attacker_grounded = attacker.grounded();

    let mut other = 1.0;
    if !critical {
        let screen = if physical {
            EffectKind::Reflect
        } else {
            EffectKind::LightScreen
        };
        if logic.has_effect(&[target], &screen) {
            let factor = if logic.info().vs_type > 1 {
                SCREEN_MULTI
            } else {
                SCREEN_SINGLE
            };
            other = damage::chain(other, factor);
        }
    }
    if pursuit && skill.flags.punishes_switch && logic.is_switching(target) {
        other = damage::chain(other, 2.0);
    }
    if spread {
        other = damage::chain(other, SPREAD);
    }
    if attacker_grounded && terrain_boosts(logic.env().field_terrain, skill.kind) {
        other = damage::chain(other, TERRAIN_BOOST);
    }
    let mods = DamageModifiers {
        weather: weather_modifier(logic.env().weather, skill.kind),
        critical,
        stab,
        burn,
        other,
    };
    let roll = logic.rng_mut().damage_roll();
    let amount = damage::compute(level, attack, defense, skill.power, effectiveness, roll, mods);
    tracing::trace!(skill = skill.id, amount, critical, effectiveness, "damage computed");

    let change = HpChange::new(amount, target).by(launcher, Some(skill));
    let permit = match logic.damage_handler().damage_appliable(change) {
        Ok(permit) => permit,
        Err(prevented) => {
            prevented.play(logic);
            return false;
        }
    };
    if critical {
        logic.display_message("A critical hit!");
    }
    if effectiveness > 1.0 {
        logic.display_message("It's super effective!");
    } else if effectiveness < 1.0 {
        logic.display_message("It's not very effective...");
    }
    let change = *permit.ctx();
    let dealt = logic.damage_handler().damage_change(permit);
    if let Some(percent) = skill.drain {
        logic.damage_handler().drain(change, dealt, percent);
    }
    if dealt == 0 {
        return false;
    }
    if logic.get(target).alive() {
        secondary_effects(logic, launcher, target, skill);
    }
    true
}

fn secondary_effects(logic: &mut Logic, launcher: BattlerId, target: BattlerId, skill: &'static SkillData) {
    if skill.status.is_none() && skill.stat_changes.is_empty() {
        return;
    }
    if !logic.rng_mut().generic_chance(skill.effect_chance.into()) {
        return;
    }
    if let Some(status) = skill.status {
        let attempt = StatusAttempt::new(status, target).by(launcher, Some(skill));
        logic.status_change_handler().status_change_silently(attempt);
    }
    for &(stat, power) in skill.stat_changes {
        let change = StatChange::new(stat, power, target).by(launcher, Some(skill.id));
        logic.stat_change_handler().stat_change_with_process(change);
    }
}

fn apply_status_effects(logic: &mut Logic, launcher: BattlerId, target: BattlerId, skill: &'static SkillData) {
    if let Some(status) = skill.status {
        let attempt = StatusAttempt::new(status, target).by(launcher, Some(skill));
        logic.status_change_handler().status_change_with_process(attempt);
    }
    for &(stat, power) in skill.stat_changes {
        let change = StatChange::new(stat, power, target).by(launcher, Some(skill.id));
        logic.stat_change_handler().stat_change_with_process(change);
    }
}

/// Procedures acting on one target after the hit landed.
fn target_procedure(logic: &mut Logic, launcher: BattlerId, target: BattlerId, skill: &SkillData) {
    let target_name = logic.get(target).name.clone();
    match skill.procedure {
        Procedure::Transform => {
            logic.transform_handler().transform_with_process(launcher, target);
        }
        Procedure::SkillSwap => {
            logic.ability_swap_handler().swap_with_process(launcher, target);
        }
        Procedure::RolePlay => {
            let ability = logic.get(target).ability.clone();
            if can_copy(&ability) {
                logic
                    .ability_change_handler()
                    .ability_change_with_process(launcher, &ability, Some(launcher));
            } else {
                logic.display_message("But it failed!");
            }
        }
        Procedure::Trap => {
            let trapped = logic
                .effects()
                .find(Scope::Battler(target), |e| matches!(e.kind, EffectKind::Trapped { .. }))
                .is_some();
            if trapped || logic.get(target).dead() {
                logic.display_message("But it failed!");
            } else {
                logic.effects_mut().add(Effect::permanent(
                    EffectKind::Trapped { by: launcher },
                    Scope::Battler(target),
                ));
                logic.display_message(&format!("{target_name} can no longer escape!"));
            }
        }
        Procedure::Bind => {
            let bound = logic
                .effects()
                .find(Scope::Battler(target), |e| matches!(e.kind, EffectKind::Bind { .. }))
                .is_some();
            if !bound && logic.get(target).alive() {
                let turns = logic.rng_mut().generic_range(4, 5);
                logic.effects_mut().add(Effect::new(
                    EffectKind::Bind { by: launcher },
                    Scope::Battler(target),
                    turns,
                ));
                let name = logic.get(launcher).name.clone();
                logic.display_message(&format!("{target_name} was squeezed by {name}!"));
            }
        }
        Procedure::HealBlock => {
            let added = logic.effects_mut().add_unique(Effect::new(
                EffectKind::HealBlock,
                Scope::Battler(target),
                HEAL_BLOCK_TURNS,
            ));
            if added {
                logic.display_message(&format!("{target_name} was prevented from healing!"));
            } else {
                logic.display_message("But it failed!");
            }
        }
        Procedure::ForceSwitch => drag_out(logic, target),
        Procedure::SelfSwitch => pivot(logic, launcher),
        _ => {}
    }
}

fn drag_out(logic: &mut Logic, target: BattlerId) {
    let battler = logic.get(target);
    if battler.dead() || !battler.on_field() {
        return;
    }
    let reserves = logic.reserves(target);
    if reserves.is_empty() {
        logic.display_message("But it failed!");
        return;
    }
    let pick = logic.rng_mut().rand(Stream::Generic, reserves.len() as u32) as usize;
    let with = reserves[pick];
    logic.switch_handler().execute_switch(Some(target), with, false);
    let name = logic.get(with).name.clone();
    logic.display_message(&format!("{name} was dragged out!"));
}

fn pivot(logic: &mut Logic, launcher: BattlerId) {
    let battler = logic.get(launcher);
    if battler.dead() || !battler.on_field() || !logic.has_reserve(launcher) {
        return;
    }
    if let Err(prevented) = logic.switch_handler().can_switch(launcher, SwitchReason::Pivot) {
        prevented.play(logic);
        return;
    }
    if let Some(with) = logic.choose_replacement(launcher) {
        logic.switch_handler().execute_switch(Some(launcher), with, false);
    }
}

/// Procedures that act on the field or the user once per use.
fn field_procedure(logic: &mut Logic, launcher: BattlerId, skill: &'static SkillData) {
    match skill.procedure {
        Procedure::Weather(weather) => {
            let check = logic.weather_change_handler().weather_appliable(
                Some(weather),
                Some(DEFAULT_WEATHER_TURNS),
                Some(launcher),
            );
            match check {
                Ok(permit) => logic.weather_change_handler().weather_change(permit),
                Err(prevented) => play_or_fail(logic, prevented),
            }
        }
        Procedure::FieldTerrain(terrain) => {
            let check = logic.field_terrain_change_handler().field_terrain_appliable(
                Some(terrain),
                Some(DEFAULT_TERRAIN_TURNS),
                Some(launcher),
            );
            match check {
                Ok(permit) => logic.field_terrain_change_handler().field_terrain_change(permit),
                Err(prevented) => play_or_fail(logic, prevented),
            }
        }
        Procedure::SideCondition(condition) => side_condition(logic, launcher, condition),
        Procedure::TrickRoom => {
            if logic
                .effects_mut()
                .remove(Scope::Global, &EffectKind::TrickRoom)
                .is_some()
            {
                logic.display_message("The twisted dimensions returned to normal!");
            } else {
                logic
                    .effects_mut()
                    .add(Effect::new(EffectKind::TrickRoom, Scope::Global, TRICK_ROOM_TURNS));
                let name = logic.get(launcher).name.clone();
                logic.display_message(&format!("{name} twisted the dimensions!"));
            }
        }
        Procedure::Heal(percent) => {
            let battler = logic.get(launcher);
            let name = battler.name.clone();
            if battler.hp >= battler.max_hp {
                logic.display_message(&format!("{name}'s HP is full!"));
                return;
            }
            let amount = ((battler.max_hp as u32 * percent as u32) / 100).max(1) as u16;
            let change = HpChange::new(amount, launcher).by(launcher, Some(skill));
            if logic.damage_handler().heal_with_process(change) > 0 {
                logic.display_message(&format!("{name} had its HP restored."));
            }
        }
        _ => {}
    }
}

fn play_or_fail(logic: &mut Logic, prevented: Prevented) {
    if prevented.reason.is_some() {
        prevented.play(logic);
    } else {
        logic.display_message("But it failed!");
    }
}

fn side_condition(logic: &mut Logic, launcher: BattlerId, condition: SideCondition) {
    let (kind, turns, text) = match condition {
        SideCondition::Reflect => (
            EffectKind::Reflect,
            SIDE_CONDITION_TURNS,
            "Reflect made your team stronger against physical moves!",
        ),
        SideCondition::LightScreen => (
            EffectKind::LightScreen,
            SIDE_CONDITION_TURNS,
            "Light Screen made your team stronger against special moves!",
        ),
        SideCondition::Safeguard => (
            EffectKind::Safeguard,
            SIDE_CONDITION_TURNS,
            "Your team became cloaked in a mystical veil!",
        ),
        SideCondition::Mist => (EffectKind::Mist, SIDE_CONDITION_TURNS, "Your team became shrouded in mist!"),
        SideCondition::Tailwind => (
            EffectKind::Tailwind,
            TAILWIND_TURNS,
            "The Tailwind blew from behind your team!",
        ),
    };
    let scope = Scope::Bank(launcher.bank);
    if logic.effects_mut().add_unique(Effect::new(kind, scope, turns)) {
        logic.display_message(text);
    } else {
        logic.display_message("But it failed!");
    }
}

fn recoil(logic: &mut Logic, launcher: BattlerId) {
    let battler = logic.get(launcher);
    if battler.dead() {
        return;
    }
    let amount = (battler.max_hp / 4).max(1);
    let name = battler.name.clone();
    logic.display_message(&format!("{name} is damaged by recoil!"));
    logic
        .damage_handler()
        .damage_change_with_process(HpChange::new(amount, launcher));
}
