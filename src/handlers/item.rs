use super::{Check, ItemChangeHandler, Permit};
use crate::battler::BattlerId;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::items::item_name;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ItemLoss {
    pub target: BattlerId,
    pub launcher: Option<BattlerId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemChange {
    pub target: BattlerId,
    pub previous: Option<String>,
    pub item: Option<String>,
    /// Whether the persistent item was replaced too.
    pub overwrite: bool,
}

hook_point!(CanLoseItem: "item_change" / "can_lose_item", ItemLoss => Prevented);
hook_point!(PostItemChange: "item_change" / "post_item_change", ItemChange => ());

impl ItemChangeHandler<'_> {
    pub fn can_lose_item(&mut self, target: BattlerId, launcher: Option<BattlerId>) -> Check<ItemLoss> {
        if self.logic.get(target).item.is_none() {
            return Err(Prevented::silent());
        }
        let mut loss = ItemLoss { target, launcher };
        if let ControlFlow::Break(prevented) = exec_hooks::<CanLoseItem>(self.logic, &mut loss) {
            return Err(prevented);
        }
        Ok(Permit::new(loss))
    }

    /// Replaces an item whose loss was allowed by [`Self::can_lose_item`].
    pub fn lose_item(&mut self, permit: Permit<ItemLoss>, item: Option<&str>, overwrite: bool) {
        let loss = permit.into_inner();
        self.change_item(loss.target, item, overwrite);
    }

    /// Sets the held item. With `overwrite` the persistent creature keeps the
    /// new item after the battle; otherwise the change is battle-scoped.
    /// Callers outside the engine go through [`Self::change_item_with_process`].
    pub(crate) fn change_item(&mut self, target: BattlerId, item: Option<&str>, overwrite: bool) {
        let item = item.map(crate::normalize_id);
        let battler = self.logic.get_mut(target);
        let previous = std::mem::replace(&mut battler.item, item.clone());
        if overwrite {
            battler.original_item = item.clone();
        }
        battler.refresh_item_effect();
        if let Some(new) = item.as_deref() {
            let ident = self.logic.ident(target);
            self.logic.logger_mut().log_item(&ident, new);
        }
        self.logic.visual().refresh_info_bar(target);
        let mut change = ItemChange {
            target,
            previous,
            item,
            overwrite,
        };
        let _ = exec_hooks::<PostItemChange>(self.logic, &mut change);
    }

    /// Replaces the item, asking the target's permission first when someone
    /// else takes an item away from it.
    pub fn change_item_with_process(
        &mut self,
        target: BattlerId,
        item: Option<&str>,
        overwrite: bool,
        launcher: Option<BattlerId>,
    ) -> bool {
        let losing = self.logic.get(target).item.is_some() && launcher.is_some_and(|l| l != target);
        if !losing {
            self.change_item(target, item, overwrite);
            return true;
        }
        match self.can_lose_item(target, launcher) {
            Ok(permit) => {
                self.lose_item(permit, item, overwrite);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }

    /// Uses up the held item for the rest of the battle.
    pub fn consume_item(&mut self, target: BattlerId) -> Option<String> {
        let item = self.logic.get(target).item.clone()?;
        let name = self.logic.get(target).name.clone();
        self.logic
            .display_message(&format!("{name} used its {}!", item_name(&item)));
        self.change_item(target, None, false);
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle_info::BattleInfo;
    use crate::hooks::veto;
    use crate::logic::Logic;
    use crate::rng::RngSeeds;
    use crate::rules::default_registry;
    use crate::scene::HeadlessScene;
    use crate::test_support::{duel, onix, pikachu};

    fn sticky_logic() -> Logic {
        let mut registry = default_registry();
        registry.register::<CanLoseItem, _>("sticky hold", |logic, loss| {
            if logic.get(loss.target).has_ability("stickyhold") {
                return veto("The item is stuck fast!");
            }
            ControlFlow::Continue(())
        });
        let info = BattleInfo::wild(
            vec![pikachu().with_item("Leftovers").with_ability("Sticky Hold")],
            onix().with_item("Leftovers"),
        );
        let mut logic = Logic::new(
            info,
            registry.freeze(),
            Box::new(HeadlessScene::new()),
            RngSeeds::from_master(4),
        )
        .unwrap();
        logic.battle_phase_start();
        logic
    }

    #[test]
    fn foes_cannot_take_a_guarded_item() {
        let mut logic = sticky_logic();
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        assert!(!logic.item_change_handler().change_item_with_process(a, None, false, Some(b)));
        assert_eq!(logic.get(a).item.as_deref(), Some("leftovers"));
        let shown = logic
            .logger()
            .messages()
            .filter(|m| *m == "The item is stuck fast!")
            .count();
        assert_eq!(shown, 1);

        assert!(logic.item_change_handler().change_item_with_process(b, None, false, Some(a)));
        assert!(logic.get(b).item.is_none());
    }

    #[test]
    fn permit_is_needed_to_take_an_item() {
        let mut logic = sticky_logic();
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        assert!(logic.item_change_handler().can_lose_item(a, Some(b)).is_err());
        let permit = logic.item_change_handler().can_lose_item(b, Some(a)).unwrap();
        logic.item_change_handler().lose_item(permit, Some("Quick Claw"), false);
        assert_eq!(logic.get(b).item.as_deref(), Some("quickclaw"));
        assert!(logic.item_change_handler().can_lose_item(a, None).is_err());
    }

    #[test]
    fn battle_scoped_change_keeps_original() {
        let mut logic = duel(pikachu().with_item("Leftovers"), onix());
        let target = BattlerId::new(0, 0);
        logic.item_change_handler().change_item(target, Some("Quick Claw"), false);
        let battler = logic.get(target);
        assert_eq!(battler.item.as_deref(), Some("quickclaw"));
        assert_eq!(battler.original_item.as_deref(), Some("leftovers"));
    }

    #[test]
    fn consuming_clears_the_battle_item() {
        let mut logic = duel(pikachu().with_item("Sitrus Berry"), onix());
        let target = BattlerId::new(0, 0);
        assert_eq!(logic.item_change_handler().consume_item(target).as_deref(), Some("sitrusberry"));
        assert!(logic.get(target).item.is_none());
        assert!(logic.item_change_handler().consume_item(target).is_none());
    }
}
