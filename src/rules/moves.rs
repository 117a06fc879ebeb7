use crate::battler::Stat;
use crate::creature::Status;
use crate::effects::EffectKind;
use crate::handlers::damage::HpChange;
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::logic::Logic;
use crate::skills::damage::{self, DamageModifiers};
use crate::skills::{MoveAttempt, MovePrevention, Procedure};
use crate::types::Type;
use std::ops::ControlFlow;

const THAW_CHANCE: u32 = 20;
const FULL_PARALYSIS_CHANCE: u32 = 25;
const CONFUSION_HIT_CHANCE: u32 = 33;
const CONFUSION_HIT_POWER: u16 = 40;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<MovePrevention, _>("sleep", sleep);
    registry.register::<MovePrevention, _>("freeze", freeze);
    registry.register::<MovePrevention, _>("flinch", flinch);
    registry.register::<MovePrevention, _>("confusion", confusion);
    registry.register::<MovePrevention, _>("paralysis", paralysis);
    registry.register::<MovePrevention, _>("heal block", heal_block);
    registry.register::<MovePrevention, _>("focus lost", focus_lost);
}

fn sleep(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    let battler = logic.get_mut(attempt.launcher);
    if battler.status != Some(Status::Sleep) {
        return ControlFlow::Continue(());
    }
    if battler.status_count == 0 {
        logic.status_change_handler().cure(attempt.launcher);
        return ControlFlow::Continue(());
    }
    battler.status_count -= 1;
    veto(format!("{} is fast asleep.", battler.name))
}

fn freeze(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    if logic.get(attempt.launcher).status != Some(Status::Freeze) {
        return ControlFlow::Continue(());
    }
    let thawing_skill = attempt.skill.kind == Type::Fire && attempt.skill.is_damaging();
    if thawing_skill || logic.rng_mut().generic_chance(THAW_CHANCE) {
        logic.status_change_handler().cure(attempt.launcher);
        return ControlFlow::Continue(());
    }
    veto(format!("{} is frozen solid!", logic.get(attempt.launcher).name))
}

fn flinch(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    let battler = logic.get_mut(attempt.launcher);
    if !battler.flinch {
        return ControlFlow::Continue(());
    }
    battler.flinch = false;
    veto(format!("{} flinched and couldn't move!", battler.name))
}

fn confusion(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    let id = attempt.launcher;
    let battler = logic.get_mut(id);
    match battler.confusion {
        0 => return ControlFlow::Continue(()),
        1 => {
            logic.status_change_handler().confuse_cure(id);
            return ControlFlow::Continue(());
        }
        _ => battler.confusion -= 1,
    }
    let name = battler.name.clone();
    logic.display_message(&format!("{name} is confused!"));
    if !logic.rng_mut().generic_chance(CONFUSION_HIT_CHANCE) {
        return ControlFlow::Continue(());
    }
    ControlFlow::Break(Prevented::with(move |logic: &mut Logic| {
        let battler = logic.get(id);
        let (level, attack, defense) = (
            battler.level,
            battler.staged_stat(Stat::Atk) as u32,
            battler.staged_stat(Stat::Dfe) as u32,
        );
        let roll = logic.rng_mut().damage_roll();
        let amount = damage::compute(
            level,
            attack,
            defense,
            CONFUSION_HIT_POWER,
            1.0,
            roll,
            DamageModifiers::default(),
        );
        logic.display_message("It hurt itself in its confusion!");
        logic
            .damage_handler()
            .damage_change_with_process(HpChange::new(amount, id).by(id, None));
    }))
}

fn paralysis(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    if logic.get(attempt.launcher).status != Some(Status::Paralysis) {
        return ControlFlow::Continue(());
    }
    if logic.rng_mut().generic_chance(FULL_PARALYSIS_CHANCE) {
        let name = logic.get(attempt.launcher).name.clone();
        return veto(format!("{name} is paralyzed! It can't move!"));
    }
    ControlFlow::Continue(())
}

fn heal_block(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    let heals = matches!(attempt.skill.procedure, Procedure::Heal(_));
    if heals && logic.has_effect(&[attempt.launcher], &EffectKind::HealBlock) {
        let name = logic.get(attempt.launcher).name.clone();
        return veto(format!(
            "{name} can't use {} because of Heal Block!",
            attempt.skill.name
        ));
    }
    ControlFlow::Continue(())
}

fn focus_lost(logic: &mut Logic, attempt: &mut MoveAttempt) -> ControlFlow<Prevented> {
    if !attempt.skill.flags.pre_attack {
        return ControlFlow::Continue(());
    }
    let turn = logic.turn();
    let battler = logic.get(attempt.launcher);
    if battler
        .last_hit_by
        .is_some_and(|hit| hit.turn == turn && hit.damage > 0)
    {
        return veto(format!("{} lost its focus and couldn't move!", battler.name));
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::actions::Action;
    use crate::battler::BattlerId;
    use crate::creature::Status;
    use crate::skills::{use_skill, SkillUse};
    use crate::test_support::{duel, onix, pikachu};

    fn tackle_use(logic: &crate::logic::Logic) -> SkillUse {
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let slot = logic.get(a).skills.iter().position(|s| s.id == "quickattack").unwrap_or(0);
        SkillUse {
            launcher: a,
            slot,
            targets: vec![b],
            pursuit: false,
        }
    }

    #[test]
    fn sleeping_battler_wakes_after_its_counter() {
        let mut player = pikachu();
        player.status = Some(Status::Sleep);
        let mut logic = duel(player, onix());
        let a = BattlerId::new(0, 0);
        assert_eq!(logic.get(a).status_count, 2);
        let usage = tackle_use(&logic);
        use_skill(&mut logic, usage.clone());
        use_skill(&mut logic, usage.clone());
        assert_eq!(logic.get(a).status, Some(Status::Sleep));
        assert_eq!(logic.logger().messages().filter(|m| *m == "Pikachu is fast asleep.").count(), 2);
        use_skill(&mut logic, usage);
        assert_eq!(logic.get(a).status, None);
        assert!(logic.logger().messages().any(|m| m == "Pikachu used Quick Attack!"));
    }

    #[test]
    fn flinch_is_spent_by_the_blocked_move() {
        let mut logic = duel(pikachu(), onix());
        let a = BattlerId::new(0, 0);
        logic.get_mut(a).flinch = true;
        let usage = tackle_use(&logic);
        let pp = logic.get(a).skills[usage.slot].pp;
        use_skill(&mut logic, usage.clone());
        assert!(!logic.get(a).flinch);
        assert_eq!(logic.get(a).skills[usage.slot].pp, pp);
    }

    #[test]
    fn focus_punch_fails_after_taking_a_hit() {
        let mut logic = duel(pikachu().with_skills(&["focuspunch", "tackle"]), onix());
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let actions = vec![Action::attack(a, 0, b, &logic), Action::attack(b, 0, a, &logic)];
        logic.add_actions(actions);
        logic.sort_actions();
        while logic.perform_next_action() {}
        assert!(logic
            .logger()
            .messages()
            .any(|m| m == "Pikachu lost its focus and couldn't move!"));
    }
}
