//! Turn actions and their validity rules.

mod execute;
mod sorter;

pub(crate) use execute::execute;
pub use execute::can_mega_evolve;
pub(crate) use sorter::sort;
pub use sorter::effective_speed;

use crate::battler::BattlerId;
use crate::items::{item_kind, ItemKind};
use crate::logic::Logic;
use crate::skills::SkillData;

#[derive(Clone, Debug, PartialEq)]
pub struct AttackAction {
    pub launcher: BattlerId,
    pub skill_index: usize,
    pub target_bank: usize,
    pub target_position: usize,
    /// Set when a priority trigger moved the launcher to the front of its tier.
    pub ignore_speed: bool,
    /// Set when the target is switching out this turn.
    pub pursuit_enabled: bool,
}

impl AttackAction {
    pub fn new(launcher: BattlerId, skill_index: usize, target_bank: usize, target_position: usize) -> Self {
        Self {
            launcher,
            skill_index,
            target_bank,
            target_position,
            ignore_speed: false,
            pursuit_enabled: false,
        }
    }

    /// The skill in the slot, struggle once its PP ran out.
    pub fn skill(&self, logic: &Logic) -> &'static SkillData {
        let slot = &logic.get(self.launcher).skills[self.skill_index];
        if slot.pp == 0 {
            crate::skills::struggle()
        } else {
            slot.data()
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PriorityTrigger {
    QuickDraw,
    QuickClaw,
    CustapBerry,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Attack(AttackAction),
    /// Announcements run before everything else (focus punch charging).
    PreAttack { attacks: Vec<AttackAction> },
    /// Injected by the sorter; announces the trigger that sped `holder` up.
    HighPriorityItem { holder: BattlerId, trigger: PriorityTrigger },
    Switch { who: BattlerId, with: BattlerId },
    /// Bag item used by the trainer of `user` on `target`.
    Item { user: BattlerId, item: String, target: BattlerId },
    Flee { target: BattlerId },
    Mega { user: BattlerId },
}

impl Action {
    pub fn attack(launcher: BattlerId, skill_index: usize, target: BattlerId, logic: &Logic) -> Self {
        let position = logic.get(target).position.unwrap_or(0);
        Action::Attack(AttackAction::new(launcher, skill_index, target.bank, position))
    }

    /// The battler the action belongs to.
    pub fn actor(&self) -> Option<BattlerId> {
        match self {
            Action::Attack(attack) => Some(attack.launcher),
            Action::PreAttack { .. } => None,
            Action::HighPriorityItem { holder, .. } => Some(*holder),
            Action::Switch { who, .. } => Some(*who),
            Action::Item { user, .. } => Some(*user),
            Action::Flee { target } => Some(*target),
            Action::Mega { user } => Some(*user),
        }
    }

    pub fn valid(&self, logic: &Logic) -> bool {
        let active = |id: BattlerId| logic.try_get(id).is_some_and(|b| b.alive() && b.on_field());
        match self {
            Action::Attack(attack) => {
                active(attack.launcher)
                    && attack.skill_index < logic.get(attack.launcher).skills.len()
                    && attack.target_bank < logic.bank_count()
            }
            Action::PreAttack { attacks } => !attacks.is_empty(),
            Action::HighPriorityItem { holder, .. } => active(*holder),
            Action::Switch { who, with } => {
                who.bank == with.bank
                    && active(*who)
                    && logic
                        .try_get(*with)
                        .is_some_and(|entering| entering.alive() && !entering.on_field())
            }
            Action::Item { user, item, target } => {
                active(*user)
                    && logic.bag_count(*user, item) > 0
                    && match item_kind(item) {
                        Some(ItemKind::Ball(_)) => target.bank != user.bank && active(*target),
                        Some(ItemKind::Held(_) | ItemKind::MegaStone) | None => false,
                        Some(_) => {
                            target.bank == user.bank && logic.try_get(*target).is_some_and(|b| b.alive())
                        }
                    }
            }
            Action::Flee { target } => active(*target) && target.bank == 0,
            Action::Mega { user } => can_mega_evolve(logic, *user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn switch_needs_a_benched_partner() {
        let logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let who = BattlerId::new(0, 0);
        assert!(Action::Switch {
            who,
            with: BattlerId::new(0, 1)
        }
        .valid(&logic));
        assert!(!Action::Switch { who, with: who }.valid(&logic));
        assert!(!Action::Switch {
            who,
            with: BattlerId::new(1, 0)
        }
        .valid(&logic));
    }

    #[test]
    fn unknown_switch_partner_is_invalid() {
        let logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let who = BattlerId::new(0, 0);
        for with in [BattlerId::new(1, 5), BattlerId::new(0, 9), BattlerId::new(7, 0)] {
            assert!(!Action::Switch { who, with }.valid(&logic));
        }
        assert!(!Action::Switch {
            who: BattlerId::new(3, 0),
            with: BattlerId::new(3, 1)
        }
        .valid(&logic));
    }

    #[test]
    fn items_need_stock() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        let user = BattlerId::new(0, 0);
        let potion = Action::Item {
            user,
            item: "potion".to_string(),
            target: user,
        };
        assert!(!potion.valid(&logic));
        assert_eq!(logic.add_actions(vec![potion]), 0);
    }

    #[test]
    fn out_of_range_skill_is_invalid() {
        let logic = logic_with(vec![pikachu()], vec![onix()]);
        let action = Action::Attack(AttackAction::new(BattlerId::new(0, 0), 9, 1, 0));
        assert!(!action.valid(&logic));
    }
}
