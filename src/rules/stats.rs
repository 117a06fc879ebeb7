use super::covering_ability;
use crate::battler::Stat;
use crate::effects::EffectKind;
use crate::handlers::ability::ability_display;
use crate::handlers::stat::{PostStatChange, StatChange, StatChangePrevention};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::logic::Logic;
use crate::types::Type;
use phf::phf_map;
use std::ops::ControlFlow;

/// Abilities that keep a single stat from being lowered by foes.
static GUARDED_STAT: phf::Map<&'static str, Stat> = phf_map! {
    "hypercutter" => Stat::Atk,
    "keeneye" => Stat::Acc,
    "bigpecks" => Stat::Dfe,
};

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<StatChangePrevention, _>("contrary", contrary);
    registry.register::<StatChangePrevention, _>("simple", simple);
    registry.register::<StatChangePrevention, _>("mist", mist);
    registry.register::<StatChangePrevention, _>("clear body", clear_body);
    registry.register::<StatChangePrevention, _>("flower veil", flower_veil);
    registry.register::<StatChangePrevention, _>("single stat guard", single_stat_guard);
    registry.register::<PostStatChange, _>("defiant", defiant);
}

/// A drop inflicted by someone other than the target.
fn foe_drop(change: &StatChange) -> bool {
    change.power < 0 && change.launcher.is_some_and(|l| l != change.target)
}

fn contrary(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if logic.get(change.target).has_ability("contrary") {
        change.power = change.power.saturating_neg();
    }
    ControlFlow::Continue(())
}

fn simple(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if logic.get(change.target).has_ability("simple") {
        change.power = change.power.saturating_mul(2);
    }
    ControlFlow::Continue(())
}

fn mist(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if foe_drop(change) && logic.has_effect(&[change.target], &EffectKind::Mist) {
        let name = logic.get(change.target).name.clone();
        return veto(format!("{name} is protected by the mist!"));
    }
    ControlFlow::Continue(())
}

fn clear_body(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if !foe_drop(change) {
        return ControlFlow::Continue(());
    }
    let target = logic.get(change.target);
    let guard = ["clearbody", "whitesmoke", "fullmetalbody"]
        .into_iter()
        .find(|ability| target.has_ability(ability));
    match guard {
        Some(ability) => veto(format!(
            "{}'s {} prevents stat loss!",
            target.name,
            ability_display(ability)
        )),
        None => ControlFlow::Continue(()),
    }
}

fn flower_veil(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if !foe_drop(change) || !logic.get(change.target).has_type(Type::Grass) {
        return ControlFlow::Continue(());
    }
    if covering_ability(logic, change.target, &["flowerveil"]).is_some() {
        let name = logic.get(change.target).name.clone();
        return veto(format!("{name} is protected by Flower Veil!"));
    }
    ControlFlow::Continue(())
}

fn single_stat_guard(logic: &mut Logic, change: &mut StatChange) -> ControlFlow<Prevented> {
    if !foe_drop(change) {
        return ControlFlow::Continue(());
    }
    let target = logic.get(change.target);
    if GUARDED_STAT.get(target.ability.as_str()) == Some(&change.stat) {
        return veto(format!(
            "{}'s {} prevents {} loss!",
            target.name,
            ability_display(&target.ability),
            change.stat.display()
        ));
    }
    ControlFlow::Continue(())
}

fn defiant(logic: &mut Logic, (change, applied): &mut (StatChange, i8)) -> ControlFlow<()> {
    if *applied >= 0 || !change.launcher.is_some_and(|l| l.bank != change.target.bank) {
        return ControlFlow::Continue(());
    }
    let target = logic.get(change.target);
    let stat = if target.has_ability("defiant") {
        Stat::Atk
    } else if target.has_ability("competitive") {
        Stat::Ats
    } else {
        return ControlFlow::Continue(());
    };
    logic
        .stat_change_handler()
        .stat_change_with_process(StatChange::new(stat, 2, change.target));
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::battler::{BattlerId, Stat};
    use crate::effects::{Effect, EffectKind, Scope};
    use crate::handlers::stat::StatChange;
    use crate::test_support::{duel, onix, pikachu};

    fn growl(from: BattlerId, to: BattlerId) -> StatChange {
        StatChange::new(Stat::Atk, -1, to).by(from, Some("growl"))
    }

    #[test]
    fn mist_blocks_foe_drops_but_not_self_drops() {
        let mut logic = duel(pikachu(), onix());
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        logic.effects_mut().add(Effect::new(EffectKind::Mist, Scope::Bank(1), 5));
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(a, b)), 0);
        assert!(logic.logger().messages().any(|m| m == "Onix is protected by the mist!"));
        let own = StatChange::new(Stat::Atk, -1, b).by(b, None);
        assert_eq!(logic.stat_change_handler().stat_change_with_process(own), -1);
    }

    #[test]
    fn contrary_inverts_and_simple_doubles() {
        let mut logic = duel(pikachu().with_ability("Contrary"), onix().with_ability("Simple"));
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(b, a)), 1);
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(a, b)), -2);
    }

    #[test]
    fn stage_cap_applies_to_the_inverted_change() {
        let mut logic = duel(pikachu().with_ability("Contrary"), onix());
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        logic.get_mut(a).set_stat_stage(Stat::Atk, -6);
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(b, a)), 1);
        assert_eq!(logic.get(a).stat_stage(Stat::Atk), -5);

        logic.get_mut(a).set_stat_stage(Stat::Atk, 6);
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(b, a)), 0);
        assert_eq!(logic.get(a).stat_stage(Stat::Atk), 6);
        assert!(logic
            .logger()
            .messages()
            .any(|m| m == "Pikachu's Attack won't go any higher!"));
    }

    #[test]
    fn hyper_cutter_only_guards_attack() {
        let mut logic = duel(pikachu(), onix().with_ability("hypercutter"));
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        assert_eq!(logic.stat_change_handler().stat_change_with_process(growl(a, b)), 0);
        let screech = StatChange::new(Stat::Dfe, -2, b).by(a, Some("screech"));
        assert_eq!(logic.stat_change_handler().stat_change_with_process(screech), -2);
    }

    #[test]
    fn defiant_answers_a_foe_drop() {
        let mut logic = duel(pikachu(), onix().with_ability("defiant"));
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        logic.stat_change_handler().stat_change_with_process(growl(a, b));
        assert_eq!(logic.get(b).stat_stage(Stat::Atk), 1);
    }
}
