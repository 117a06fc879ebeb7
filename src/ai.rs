//! Decision sources for the banks that are not driven from outside.

use crate::actions::Action;
use crate::battler::BattlerId;
use crate::logic::Logic;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait BattleAI {
    /// Actions for every battler of `bank` currently on the field.
    fn choose_actions(&mut self, logic: &Logic, bank: usize) -> Vec<Action>;

    /// Who should replace `who`; `None` leaves the pick to the battle.
    fn choose_replacement(&mut self, logic: &Logic, who: BattlerId) -> Option<BattlerId>;
}

/// Picks uniformly among usable skills and alive foes.
pub struct RandomAI {
    rng: SmallRng,
}

impl RandomAI {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn choose_attack(&mut self, logic: &Logic, launcher: BattlerId) -> Option<Action> {
        let battler = logic.get(launcher);
        let usable: Vec<usize> = battler
            .skills
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pp > 0)
            .map(|(i, _)| i)
            .collect();
        // Out of PP everywhere: slot 0 turns into struggle.
        let slot = if usable.is_empty() {
            0
        } else {
            usable[self.rng.gen_range(0..usable.len())]
        };
        let skill = battler.skills[slot].data();
        let target = if skill.targets_foe() || usable.is_empty() {
            let foes = logic.foes_of(launcher);
            if foes.is_empty() {
                return None;
            }
            foes[self.rng.gen_range(0..foes.len())]
        } else {
            launcher
        };
        Some(Action::attack(launcher, slot, target, logic))
    }
}

impl BattleAI for RandomAI {
    fn choose_actions(&mut self, logic: &Logic, bank: usize) -> Vec<Action> {
        let mut active: Vec<&crate::battler::Battler> = logic
            .roster(bank)
            .iter()
            .filter(|b| b.alive() && b.on_field())
            .collect();
        active.sort_by_key(|b| b.position);
        let launchers: Vec<BattlerId> = active.into_iter().map(|b| b.id).collect();
        launchers
            .into_iter()
            .filter_map(|launcher| self.choose_attack(logic, launcher))
            .collect()
    }

    fn choose_replacement(&mut self, logic: &Logic, who: BattlerId) -> Option<BattlerId> {
        let reserves = logic.reserves(who);
        if reserves.is_empty() {
            return None;
        }
        Some(reserves[self.rng.gen_range(0..reserves.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn attacks_target_an_alive_foe() {
        let logic = logic_with(vec![pikachu().with_skills(&["tackle"])], vec![onix()]);
        let mut ai = RandomAI::new(3);
        let actions = ai.choose_actions(&logic, 0);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::Attack(a) if a.target_bank == 1 && a.skill_index == 0));
    }

    #[test]
    fn self_targeting_skills_aim_at_the_user() {
        let logic = logic_with(vec![pikachu().with_skills(&["swordsdance"])], vec![onix()]);
        let mut ai = RandomAI::new(3);
        let actions = ai.choose_actions(&logic, 0);
        assert!(matches!(&actions[0], Action::Attack(a) if a.target_bank == 0));
    }

    #[test]
    fn replacement_comes_from_the_bench() {
        let logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let mut ai = RandomAI::new(9);
        assert_eq!(
            ai.choose_replacement(&logic, BattlerId::new(0, 0)),
            Some(BattlerId::new(0, 1))
        );
        assert_eq!(ai.choose_replacement(&logic, BattlerId::new(1, 0)), None);
    }
}
