use super::fraction;
use crate::battler::BattlerId;
use crate::effects::EffectKind;
use crate::handlers::damage::{DamagePrevention, DrainPrevention, HealPrevention, HpChange, PostDamage, PostDamageDeath};
use crate::handlers::status::{StatusAttempt, StatusChange};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use std::ops::ControlFlow;

const CONTACT_ABILITY_CHANCE: u32 = 30;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<DamagePrevention, _>("magic guard", magic_guard);
    registry.register::<DamagePrevention, _>("endure at full hp", endure_at_full_hp);
    registry.register::<PostDamage, _>("contact ability", contact_ability);
    registry.register::<PostDamage, _>("sitrus berry", sitrus_berry);
    registry.register::<PostDamage, _>("shell bell", shell_bell);
    registry.register::<PostDamageDeath, _>("aftermath", aftermath);
    registry.register::<PostDamageDeath, _>("shell bell", shell_bell);
    registry.register::<DrainPrevention, _>("liquid ooze", liquid_ooze);
    registry.register::<HealPrevention, _>("heal block", heal_block);
}

/// A hit landed by another battler's skill.
fn skill_hit(change: &HpChange) -> bool {
    change.skill.is_some() && change.launcher.is_some_and(|l| l != change.target)
}

fn held(logic: &Logic, id: BattlerId) -> Option<HeldItem> {
    logic.get(id).item.as_deref().and_then(held_item)
}

fn magic_guard(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<Prevented> {
    if change.launcher.is_none() && logic.get(change.target).has_ability("magicguard") {
        return ControlFlow::Break(Prevented::silent());
    }
    ControlFlow::Continue(())
}

fn endure_at_full_hp(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<Prevented> {
    if !skill_hit(change) {
        return ControlFlow::Continue(());
    }
    let target = logic.get(change.target);
    if target.hp != target.max_hp || change.hp < target.hp {
        return ControlFlow::Continue(());
    }
    let name = target.name.clone();
    let hp = target.hp;
    if target.has_ability("sturdy") {
        change.hp = hp - 1;
        logic.display_message(&format!("{name} endured the hit!"));
    } else if held(logic, change.target) == Some(HeldItem::FocusSash) {
        change.hp = hp - 1;
        logic.display_message(&format!("{name} hung on using its Focus Sash!"));
        logic.item_change_handler().change_item(change.target, None, false);
    }
    ControlFlow::Continue(())
}

fn contact_ability(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<()> {
    let (Some(launcher), Some(skill)) = (change.launcher, change.skill) else {
        return ControlFlow::Continue(());
    };
    if !skill.flags.contact || launcher == change.target || logic.get(launcher).dead() {
        return ControlFlow::Continue(());
    }
    let status = match logic.get(change.target).ability.as_str() {
        "static" => StatusChange::Paralysis,
        "flamebody" => StatusChange::Burn,
        "poisonpoint" => StatusChange::Poison,
        _ => return ControlFlow::Continue(()),
    };
    if logic.rng_mut().generic_chance(CONTACT_ABILITY_CHANCE) {
        let attempt = StatusAttempt::new(status, launcher).by(change.target, None);
        logic.status_change_handler().status_change_silently(attempt);
    }
    ControlFlow::Continue(())
}

fn sitrus_berry(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<()> {
    let target = change.target;
    let battler = logic.get(target);
    if battler.hp * 2 > battler.max_hp || held(logic, target) != Some(HeldItem::SitrusBerry) {
        return ControlFlow::Continue(());
    }
    let amount = fraction(logic, target, 4);
    logic.item_change_handler().consume_item(target);
    logic.damage_handler().heal_with_process(HpChange::new(amount, target));
    ControlFlow::Continue(())
}

fn shell_bell(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<()> {
    let Some(launcher) = change.launcher.filter(|_| skill_hit(change)) else {
        return ControlFlow::Continue(());
    };
    if logic.get(launcher).dead() || held(logic, launcher) != Some(HeldItem::ShellBell) {
        return ControlFlow::Continue(());
    }
    let amount = (change.hp / 8).max(1);
    let name = logic.get(launcher).name.clone();
    if logic.damage_handler().heal_with_process(HpChange::new(amount, launcher)) > 0 {
        logic.display_message(&format!("{name} restored a little HP using its Shell Bell!"));
    }
    ControlFlow::Continue(())
}

fn aftermath(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<()> {
    let (Some(launcher), Some(skill)) = (change.launcher, change.skill) else {
        return ControlFlow::Continue(());
    };
    if !skill.flags.contact || launcher == change.target || !logic.get(change.target).has_ability("aftermath") {
        return ControlFlow::Continue(());
    }
    let amount = fraction(logic, launcher, 4);
    let name = logic.get(launcher).name.clone();
    logic.display_message(&format!("{name} was caught in the aftermath!"));
    logic
        .damage_handler()
        .damage_change_with_process(HpChange::new(amount, launcher));
    ControlFlow::Continue(())
}

fn liquid_ooze(logic: &mut Logic, drain: &mut HpChange) -> ControlFlow<Prevented> {
    let Some(drained) = drain.launcher else {
        return ControlFlow::Continue(());
    };
    if !logic.get(drained).has_ability("liquidooze") {
        return ControlFlow::Continue(());
    }
    let (healer, amount) = (drain.target, drain.hp);
    ControlFlow::Break(Prevented::with(move |logic: &mut Logic| {
        let name = logic.get(healer).name.clone();
        logic.display_message(&format!("{name} sucked up the liquid ooze!"));
        logic
            .damage_handler()
            .damage_change_with_process(HpChange::new(amount, healer));
    }))
}

fn heal_block(logic: &mut Logic, change: &mut HpChange) -> ControlFlow<Prevented> {
    if logic.has_effect(&[change.target], &EffectKind::HealBlock) {
        let name = logic.get(change.target).name.clone();
        return veto(format!("{name} was prevented from healing!"));
    }
    ControlFlow::Continue(())
}
