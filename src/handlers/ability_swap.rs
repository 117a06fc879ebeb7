use super::ability::{can_copy, can_overwrite};
use super::{AbilitySwapHandler, Check, Permit};
use crate::battler::BattlerId;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AbilitySwap {
    pub launcher: BattlerId,
    pub target: BattlerId,
}

hook_point!(AbilitySwapPrevention: "ability_swap" / "ability_swap_prevention", AbilitySwap => Prevented);

impl AbilitySwapHandler<'_> {
    pub fn swap_appliable(&mut self, launcher: BattlerId, target: BattlerId) -> Check<AbilitySwap> {
        let a = self.logic.get(launcher);
        let b = self.logic.get(target);
        let swappable = |ability: &str| can_copy(ability) && can_overwrite(ability);
        if a.dead() || b.dead() || !swappable(&a.ability) || !swappable(&b.ability) {
            return Err(Prevented::message("But it failed!"));
        }
        let mut swap = AbilitySwap { launcher, target };
        if let ControlFlow::Break(prevented) = exec_hooks::<AbilitySwapPrevention>(self.logic, &mut swap) {
            return Err(prevented);
        }
        Ok(Permit::new(swap))
    }

    pub fn swap(&mut self, permit: Permit<AbilitySwap>) {
        let AbilitySwap { launcher, target } = permit.into_inner();
        let launcher_ability = self.logic.get(launcher).ability.clone();
        let target_ability = self.logic.get(target).ability.clone();
        for (id, ability) in [(launcher, target_ability), (target, launcher_ability)] {
            let battler = self.logic.get_mut(id);
            battler.ability = ability;
            battler.refresh_ability_effect();
        }
        let name = self.logic.get(launcher).name.clone();
        self.logic
            .display_message(&format!("{name} swapped Abilities with its target!"));
        self.logic.ability_change_handler().on_entry(launcher);
        self.logic.ability_change_handler().on_entry(target);
    }

    pub fn swap_with_process(&mut self, launcher: BattlerId, target: BattlerId) -> bool {
        match self.swap_appliable(launcher, target) {
            Ok(permit) => {
                self.swap(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }
}
