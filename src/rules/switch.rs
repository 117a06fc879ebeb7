use crate::effects::{EffectKind, Scope};
use crate::handlers::ability::ability_display;
use crate::handlers::switch::{SwitchCheck, SwitchPassthrough, SwitchPrevention, SwitchReason};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use crate::types::Type;
use std::ops::ControlFlow;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<SwitchPassthrough, _>("shed shell", shed_shell);
    registry.register::<SwitchPassthrough, _>("ghost type", ghost_type);
    registry.register::<SwitchPrevention, _>("trapped", trapped);
    registry.register::<SwitchPrevention, _>("trapping ability", trapping_ability);
}

fn shed_shell(logic: &mut Logic, check: &mut SwitchCheck) -> ControlFlow<()> {
    let holder = logic.get(check.who);
    if holder.item.as_deref().and_then(held_item) == Some(HeldItem::ShedShell) {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

fn ghost_type(logic: &mut Logic, check: &mut SwitchCheck) -> ControlFlow<()> {
    if logic.get(check.who).has_type(Type::Ghost) {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

fn trapped(logic: &mut Logic, check: &mut SwitchCheck) -> ControlFlow<Prevented> {
    if check.reason == SwitchReason::Pivot {
        return ControlFlow::Continue(());
    }
    let held = logic
        .effects()
        .find(Scope::Battler(check.who), |e| {
            matches!(e.kind, EffectKind::Trapped { .. } | EffectKind::Bind { .. })
        })
        .is_some();
    if held {
        let name = logic.get(check.who).name.clone();
        return veto(format!("{name} can't escape!"));
    }
    ControlFlow::Continue(())
}

fn trapping_ability(logic: &mut Logic, check: &mut SwitchCheck) -> ControlFlow<Prevented> {
    if check.reason == SwitchReason::Pivot {
        return ControlFlow::Continue(());
    }
    let who = logic.get(check.who);
    for foe in logic.foes_of(check.who) {
        let foe = logic.get(foe);
        let traps = match foe.ability.as_str() {
            "shadowtag" => !who.has_ability("shadowtag"),
            "arenatrap" => who.grounded(),
            "magnetpull" => who.has_type(Type::Steel),
            _ => false,
        };
        if traps {
            return veto(format!(
                "{}'s {} prevents escape!",
                foe.name,
                ability_display(&foe.ability)
            ));
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::battler::BattlerId;
    use crate::effects::{Effect, EffectKind, Scope};
    use crate::handlers::switch::SwitchReason;
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn shadow_tag_traps_and_shed_shell_escapes() {
        let mut logic = logic_with(vec![pikachu(), onix()], vec![onix().with_ability("shadowtag")]);
        let who = BattlerId::new(0, 0);
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Voluntary).is_err());
        logic.item_change_handler().change_item(who, Some("shedshell"), false);
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Voluntary).is_ok());
    }

    #[test]
    fn pivoting_ignores_bind() {
        let mut logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let who = BattlerId::new(0, 0);
        logic.effects_mut().add(Effect::new(
            EffectKind::Bind {
                by: BattlerId::new(1, 0),
            },
            Scope::Battler(who),
            4,
        ));
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Voluntary).is_err());
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Pivot).is_ok());
    }

    #[test]
    fn arena_trap_spares_flying_types() {
        let mut logic = logic_with(vec![onix()], vec![onix().with_ability("arenatrap")]);
        let who = BattlerId::new(0, 0);
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Flee).is_err());
        logic.get_mut(who).ability = "levitate".to_string();
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Flee).is_ok());
    }
}
