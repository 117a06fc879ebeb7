use super::{Check, Permit, SwitchHandler};
use crate::battler::BattlerId;
use crate::effects::{EffectKind, Scope};
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchReason {
    Voluntary,
    /// Replacing a fainted battler or being dragged out.
    Forced,
    /// Self-switching skill.
    Pivot,
    Flee,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchCheck {
    pub who: BattlerId,
    pub reason: SwitchReason,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchEvent {
    pub who: Option<BattlerId>,
    pub with: BattlerId,
    /// Entrance at battle start.
    pub initial: bool,
}

hook_point!(
    /// Breaking lets the switch through no matter what the prevention chain says.
    SwitchPassthrough: "switch" / "switch_passthrough", SwitchCheck => ()
);
hook_point!(SwitchPrevention: "switch" / "switch_prevention", SwitchCheck => Prevented);
hook_point!(PreSwitchEvent: "switch" / "pre_switch_event", SwitchEvent => ());
hook_point!(SwitchEventHook: "switch" / "switch_event", SwitchEvent => ());

impl SwitchHandler<'_> {
    pub fn can_switch(&mut self, who: BattlerId, reason: SwitchReason) -> Check<SwitchCheck> {
        let mut check = SwitchCheck { who, reason };
        if reason == SwitchReason::Forced || self.logic.get(who).dead() {
            return Ok(Permit::new(check));
        }
        if exec_hooks::<SwitchPassthrough>(self.logic, &mut check).is_break() {
            return Ok(Permit::new(check));
        }
        if let ControlFlow::Break(prevented) = exec_hooks::<SwitchPrevention>(self.logic, &mut check) {
            return Err(prevented);
        }
        Ok(Permit::new(check))
    }

    /// Puts `with` in the slot of `who` (or in its own pre-assigned slot at
    /// battle start) and fires the entrance chains. Initial entrances leave
    /// entry abilities to the caller, which runs them once everyone is out.
    pub fn execute_switch(&mut self, who: Option<BattlerId>, with: BattlerId, initial: bool) {
        let mut event = SwitchEvent { who, with, initial };
        let _ = exec_hooks::<PreSwitchEvent>(self.logic, &mut event);

        let mut position = self.logic.get(with).position;
        if let Some(out) = who {
            position = self.logic.get(out).position.or(position);
            self.withdraw(out);
        }
        let Some(position) = position else {
            tracing::debug!(?with, "switch without a free position ignored");
            return;
        };
        let turn = self.logic.turn();
        let entering = self.logic.get_mut(with);
        entering.position = Some(position);
        entering.last_sent_turn = Some(turn);
        entering.turn_count = 0;
        entering.attack_order = None;
        let name = entering.name.clone();
        let species = entering.species.clone();
        let (hp, max_hp) = (entering.hp, entering.max_hp);
        self.logic.remove_switching(with);
        let ident = self.logic.ident(with);
        self.logic.logger_mut().log_switch(&ident, &species, hp, max_hp);
        let text = if with.bank == 0 {
            format!("Go! {name}!")
        } else {
            format!("{name} was sent out!")
        };
        self.logic.display_message(&text);
        self.logic.visual().switch_animation(who, with);
        self.logic.register_encounters(with);

        let _ = exec_hooks::<SwitchEventHook>(self.logic, &mut event);
        if !initial {
            self.logic.ability_change_handler().on_entry(with);
        }
    }

    fn withdraw(&mut self, out: BattlerId) {
        let battler = self.logic.get_mut(out);
        let alive = battler.alive();
        battler.position = None;
        battler.reset_volatile();
        let name = battler.name.clone();
        self.logic.effects_mut().remove_where(|effect| {
            effect.scope == Scope::Battler(out)
                || matches!(effect.kind, EffectKind::Trapped { by } | EffectKind::Bind { by } if by == out)
        });
        self.logic.remove_switching(out);
        if alive {
            let text = if out.bank == 0 {
                format!("{name}, come back!")
            } else {
                format!("{name} was withdrawn!")
            };
            self.logic.display_message(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Stat;
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn switch_takes_the_slot_and_resets_the_outgoing_battler() {
        let mut logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let out = BattlerId::new(0, 0);
        let entering = BattlerId::new(0, 1);
        logic.get_mut(out).set_stat_stage(Stat::Atk, 3);
        logic.switch_handler().execute_switch(Some(out), entering, false);
        assert_eq!(logic.get(out).position, None);
        assert_eq!(logic.get(out).stat_stage(Stat::Atk), 0);
        assert_eq!(logic.get(entering).position, Some(0));
        assert_eq!(logic.battler(0, 0).map(|b| b.id), Some(entering));
    }

    #[test]
    fn forced_switch_ignores_trapping() {
        let mut logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let who = BattlerId::new(0, 0);
        logic.effects_mut().add(crate::effects::Effect::permanent(
            EffectKind::Trapped {
                by: BattlerId::new(1, 0),
            },
            Scope::Battler(who),
        ));
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Voluntary).is_err());
        assert!(logic.switch_handler().can_switch(who, SwitchReason::Forced).is_ok());
    }
}
