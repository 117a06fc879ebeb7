use super::{Check, DamageHandler, Permit};
use crate::battler::{BattlerId, LastHit};
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::skills::SkillData;
use std::ops::ControlFlow;

/// HP amount moving between battlers. Prevention callbacks may rewrite `hp`.
#[derive(Clone, Copy, Debug)]
pub struct HpChange {
    pub hp: u16,
    pub target: BattlerId,
    pub launcher: Option<BattlerId>,
    pub skill: Option<&'static SkillData>,
}

impl HpChange {
    pub fn new(hp: u16, target: BattlerId) -> Self {
        Self {
            hp,
            target,
            launcher: None,
            skill: None,
        }
    }

    pub fn by(mut self, launcher: BattlerId, skill: Option<&'static SkillData>) -> Self {
        self.launcher = Some(launcher);
        self.skill = skill;
        self
    }
}

hook_point!(DamagePrevention: "damage" / "damage_prevention", HpChange => Prevented);
hook_point!(PostDamage: "damage" / "post_damage", HpChange => ());
hook_point!(PostDamageDeath: "damage" / "post_damage_death", HpChange => ());
hook_point!(
    /// `target` is the battler healed by the drain, `launcher` the one drained.
    DrainPrevention: "damage" / "drain_prevention", HpChange => Prevented
);
hook_point!(HealPrevention: "damage" / "heal_prevention", HpChange => Prevented);
hook_point!(PostHeal: "damage" / "post_heal", HpChange => ());

impl DamageHandler<'_> {
    pub fn damage_appliable(&mut self, mut change: HpChange) -> Check<HpChange> {
        let target = self.logic.get(change.target);
        if target.dead() || change.hp == 0 {
            return Err(Prevented::silent());
        }
        if let ControlFlow::Break(prevented) = exec_hooks::<DamagePrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        if change.hp == 0 {
            return Err(Prevented::silent());
        }
        Ok(Permit::new(change))
    }

    /// Removes HP and returns the amount actually lost.
    pub fn damage_change(&mut self, permit: Permit<HpChange>) -> u16 {
        let mut change = permit.into_inner();
        let turn = self.logic.turn();
        let target = self.logic.get_mut(change.target);
        let before = target.hp;
        let lost = change.hp.min(before);
        target.hp = before - lost;
        let after = target.hp;
        let max_hp = target.max_hp;
        if let Some(launcher) = change.launcher.filter(|l| *l != change.target) {
            target.last_hit_by = Some(LastHit {
                launcher,
                turn,
                damage: lost,
            });
        }
        change.hp = lost;
        self.logic.visual().hp_animation(change.target, before, after);
        let ident = self.logic.ident(change.target);
        self.logic.logger_mut().log_damage(&ident, after, max_hp);
        if after == 0 {
            self.faint(change.target);
            let _ = exec_hooks::<PostDamageDeath>(self.logic, &mut change);
        } else {
            let _ = exec_hooks::<PostDamage>(self.logic, &mut change);
        }
        lost
    }

    pub fn damage_change_with_process(&mut self, change: HpChange) -> u16 {
        match self.damage_appliable(change) {
            Ok(permit) => self.damage_change(permit),
            Err(prevented) => {
                prevented.play(self.logic);
                0
            }
        }
    }

    fn faint(&mut self, id: BattlerId) {
        let battler = self.logic.get_mut(id);
        battler.ko_count += 1;
        battler.status = None;
        battler.confusion = 0;
        let name = battler.name.clone();
        let ident = self.logic.ident(id);
        self.logic.logger_mut().log_faint(&ident);
        self.logic.display_message(&format!("{name} fainted!"));
        self.logic.request_exp(id);
        tracing::debug!(bank = id.bank, index = id.index, "battler fainted");
    }

    /// Deals damage then restores `percent` of it to the launcher.
    pub fn drain_with_process(&mut self, change: HpChange, percent: u8) -> u16 {
        let dealt = self.damage_change_with_process(change);
        self.drain(change, dealt, percent);
        dealt
    }

    /// Restores `percent` of `dealt` to the launcher of an already applied hit.
    pub fn drain(&mut self, change: HpChange, dealt: u16, percent: u8) {
        let Some(launcher) = change.launcher else {
            return;
        };
        if dealt == 0 || self.logic.get(launcher).dead() {
            return;
        }
        let amount = ((dealt as u32 * percent as u32) / 100).max(1) as u16;
        let mut drain = HpChange {
            hp: amount,
            target: launcher,
            launcher: Some(change.target),
            skill: change.skill,
        };
        if let ControlFlow::Break(prevented) = exec_hooks::<DrainPrevention>(self.logic, &mut drain) {
            prevented.play(self.logic);
            return;
        }
        let target_name = self.logic.get(change.target).name.clone();
        if self.heal_with_process(drain) > 0 {
            self.logic
                .display_message(&format!("{target_name} had its energy drained!"));
        }
    }

    pub fn heal_appliable(&mut self, mut change: HpChange) -> Check<HpChange> {
        let target = self.logic.get(change.target);
        if target.dead() || target.hp >= target.max_hp {
            return Err(Prevented::silent());
        }
        if let ControlFlow::Break(prevented) = exec_hooks::<HealPrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        Ok(Permit::new(change))
    }

    /// Restores HP and returns the amount actually healed.
    pub fn heal_change(&mut self, permit: Permit<HpChange>) -> u16 {
        let mut change = permit.into_inner();
        let target = self.logic.get_mut(change.target);
        let before = target.hp;
        target.hp = before.saturating_add(change.hp).min(target.max_hp);
        let after = target.hp;
        let max_hp = target.max_hp;
        change.hp = after - before;
        self.logic.visual().hp_animation(change.target, before, after);
        let ident = self.logic.ident(change.target);
        self.logic.logger_mut().log_heal(&ident, after, max_hp);
        let _ = exec_hooks::<PostHeal>(self.logic, &mut change);
        change.hp
    }

    pub fn heal_with_process(&mut self, change: HpChange) -> u16 {
        match self.heal_appliable(change) {
            Ok(permit) => self.heal_change(permit),
            Err(prevented) => {
                prevented.play(self.logic);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn damage_is_capped_at_current_hp_and_records_the_hit() {
        let mut logic = duel(pikachu(), onix());
        let attacker = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        let hp = logic.get(target).hp;
        let dealt = logic
            .damage_handler()
            .damage_change_with_process(HpChange::new(hp + 50, target).by(attacker, None));
        assert_eq!(dealt, hp);
        let onix = logic.get(target);
        assert!(onix.dead());
        assert_eq!(onix.ko_count, 1);
        assert_eq!(onix.last_hit_by.map(|h| h.launcher), Some(attacker));
        assert!(logic.logger().messages().any(|m| m == "Onix fainted!"));
    }

    #[test]
    fn heal_stops_at_max_hp() {
        let mut logic = duel(pikachu(), onix());
        let target = BattlerId::new(0, 0);
        let max = logic.get(target).max_hp;
        logic.get_mut(target).hp = max - 10;
        let healed = logic.damage_handler().heal_with_process(HpChange::new(100, target));
        assert_eq!(healed, 10);
        assert_eq!(logic.damage_handler().heal_with_process(HpChange::new(5, target)), 0);
    }

    #[test]
    fn drain_restores_part_of_the_damage() {
        let mut logic = duel(pikachu(), onix());
        let attacker = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        let max = logic.get(attacker).max_hp;
        logic.get_mut(attacker).hp = max / 2;
        let dealt = logic
            .damage_handler()
            .drain_with_process(HpChange::new(20, target).by(attacker, None), 50);
        assert_eq!(dealt, 20);
        assert_eq!(logic.get(attacker).hp, max / 2 + 10);
    }
}
