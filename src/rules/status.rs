use crate::effects::EffectKind;
use crate::env::FieldTerrain;
use crate::handlers::ability::ability_display;
use crate::handlers::status::{PostStatusChange, StatusAttempt, StatusChange, StatusPrevention};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use crate::types::Type;
use phf::phf_map;
use std::ops::ControlFlow;

use StatusChange as S;

const PRIMARY: &[StatusChange] = &[S::Poison, S::Toxic, S::Paralysis, S::Burn, S::Sleep, S::Freeze];

/// Abilities shielding their holder (or allies, for the veils) from statuses.
static ABILITY_IMMUNITIES: phf::Map<&'static str, &'static [StatusChange]> = phf_map! {
    "limber" => &[S::Paralysis],
    "insomnia" => &[S::Sleep],
    "vitalspirit" => &[S::Sleep],
    "sweetveil" => &[S::Sleep],
    "immunity" => &[S::Poison, S::Toxic],
    "pastelveil" => &[S::Poison, S::Toxic],
    "waterveil" => &[S::Burn],
    "waterbubble" => &[S::Burn],
    "magmaarmor" => &[S::Freeze],
    "owntempo" => &[S::Confusion],
    "oblivious" => &[S::Confusion],
    "innerfocus" => &[S::Flinch],
    "comatose" => PRIMARY,
    "purifyingsalt" => PRIMARY,
};

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<StatusPrevention, _>("type immunity", type_immunity);
    registry.register::<StatusPrevention, _>("ability immunity", ability_immunity);
    registry.register::<StatusPrevention, _>("safeguard", safeguard);
    registry.register::<StatusPrevention, _>("misty terrain", misty_terrain);
    registry.register::<StatusPrevention, _>("electric terrain", electric_terrain);
    registry.register::<PostStatusChange, _>("lum berry", lum_berry);
}

fn type_immunity(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<Prevented> {
    let target = logic.get(attempt.target);
    let electric_status_skill = attempt
        .skill
        .is_some_and(|s| s.kind == Type::Electric && !s.is_damaging());
    let immune = match attempt.status {
        S::Paralysis => target.has_type(Type::Electric) || (electric_status_skill && target.has_type(Type::Ground)),
        S::Burn => target.has_type(Type::Fire),
        S::Poison | S::Toxic => target.has_type(Type::Poison) || target.has_type(Type::Steel),
        S::Freeze => target.has_type(Type::Ice),
        _ => false,
    };
    let powder = attempt.skill.is_some_and(|s| s.flags.powder) && target.has_type(Type::Grass);
    if immune || powder {
        return veto(format!("It doesn't affect {}...", target.name));
    }
    ControlFlow::Continue(())
}

fn ability_immunity(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<Prevented> {
    let status = attempt.status;
    let found = logic.each_effects(&[attempt.target], |effect| match &effect.kind {
        EffectKind::Ability(ability) => ABILITY_IMMUNITIES
            .get(ability.as_str())
            .filter(|covered| covered.contains(&status))
            .map(|_| ability.clone()),
        _ => None,
    });
    let leaf_guard = logic.get(attempt.target).has_ability("leafguard")
        && logic.env().weather == Some(crate::env::Weather::Sun)
        && status.primary().is_some();
    let ability = match (found, leaf_guard) {
        (Some(ability), _) => ability,
        (None, true) => "leafguard".to_string(),
        (None, false) => return ControlFlow::Continue(()),
    };
    if status == S::Flinch {
        return ControlFlow::Break(Prevented::silent());
    }
    let name = logic.get(attempt.target).name.clone();
    veto(format!("{name} is protected by {}!", ability_display(&ability)))
}

fn safeguard(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<Prevented> {
    let guarded = matches!(attempt.status, S::Confusion) || attempt.status.primary().is_some();
    if !guarded || !attempt.from_foe_skill() {
        return ControlFlow::Continue(());
    }
    if logic.has_effect(&[attempt.target], &EffectKind::Safeguard) {
        let name = logic.get(attempt.target).name.clone();
        return veto(format!("{name} is protected by Safeguard!"));
    }
    ControlFlow::Continue(())
}

fn misty_terrain(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<Prevented> {
    let target = logic.get(attempt.target);
    let covered = attempt.status.primary().is_some() || attempt.status == S::Confusion;
    if covered && target.grounded() && logic.env().field_terrain == Some(FieldTerrain::Misty) {
        return veto(format!("{} surrounds itself with a protective mist!", target.name));
    }
    ControlFlow::Continue(())
}

fn electric_terrain(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<Prevented> {
    let target = logic.get(attempt.target);
    if attempt.status == S::Sleep
        && target.grounded()
        && logic.env().field_terrain == Some(FieldTerrain::Electric)
    {
        return veto(format!("{} surrounds itself with electrified terrain!", target.name));
    }
    ControlFlow::Continue(())
}

fn lum_berry(logic: &mut Logic, attempt: &mut StatusAttempt) -> ControlFlow<()> {
    let covered = attempt.status.primary().is_some() || attempt.status == S::Confusion;
    let target = attempt.target;
    let holds_lum = logic.get(target).item.as_deref().and_then(held_item) == Some(HeldItem::LumBerry);
    if !covered || !holds_lum {
        return ControlFlow::Continue(());
    }
    logic.item_change_handler().consume_item(target);
    logic.status_change_handler().cure(target);
    logic.status_change_handler().confuse_cure(target);
    ControlFlow::Continue(())
}
