use super::{AbilityChangeHandler, Check, Permit};
use crate::battler::BattlerId;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use phf::phf_set;
use std::ops::ControlFlow;

/// Abilities that can never be replaced.
pub static NO_OVERWRITE: phf::Set<&'static str> = phf_set! {
    "multitype",
    "stancechange",
    "schooling",
    "comatose",
    "shieldsdown",
    "disguise",
    "rkssystem",
    "battlebond",
    "powerconstruct",
    "zenmode",
};

/// Abilities that can never be copied onto another battler.
pub static NO_COPY: phf::Set<&'static str> = phf_set! {
    "trace",
    "forecast",
    "flowergift",
    "multitype",
    "illusion",
    "wonderguard",
    "zenmode",
    "imposter",
    "stancechange",
    "powerofalchemy",
    "receiver",
    "disguise",
    "schooling",
    "comatose",
    "shieldsdown",
    "rkssystem",
    "battlebond",
    "powerconstruct",
};

pub fn can_overwrite(ability: &str) -> bool {
    !NO_OVERWRITE.contains(ability)
}

pub fn can_copy(ability: &str) -> bool {
    !ability.is_empty() && !NO_COPY.contains(ability)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbilityChange {
    pub target: BattlerId,
    pub ability: String,
    pub launcher: Option<BattlerId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Entry {
    pub who: BattlerId,
}

hook_point!(AbilityChangePrevention: "ability_change" / "ability_change_prevention", AbilityChange => Prevented);
hook_point!(PostAbilityChange: "ability_change" / "post_ability_change", AbilityChange => ());
hook_point!(
    /// Fired whenever a battler enters the field or gains a new ability.
    OnEntry: "ability_change" / "on_entry", Entry => ()
);

impl AbilityChangeHandler<'_> {
    pub fn ability_change_appliable(
        &mut self,
        target: BattlerId,
        ability: &str,
        launcher: Option<BattlerId>,
    ) -> Check<AbilityChange> {
        let battler = self.logic.get(target);
        let ability = crate::normalize_id(ability);
        if battler.dead() || !can_overwrite(&battler.ability) || battler.ability == ability {
            return Err(Prevented::message("But it failed!"));
        }
        let mut change = AbilityChange {
            target,
            ability,
            launcher,
        };
        if let ControlFlow::Break(prevented) = exec_hooks::<AbilityChangePrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        Ok(Permit::new(change))
    }

    pub fn ability_change(&mut self, permit: Permit<AbilityChange>) {
        let mut change = permit.into_inner();
        let battler = self.logic.get_mut(change.target);
        battler.ability = change.ability.clone();
        battler.refresh_ability_effect();
        let name = battler.name.clone();
        let ident = self.logic.ident(change.target);
        self.logic.logger_mut().log_ability(&ident, &change.ability);
        self.logic.display_message(&format!(
            "{name}'s Ability became {}!",
            ability_display(&change.ability)
        ));
        let _ = exec_hooks::<PostAbilityChange>(self.logic, &mut change);
        self.on_entry(change.target);
    }

    pub fn ability_change_with_process(
        &mut self,
        target: BattlerId,
        ability: &str,
        launcher: Option<BattlerId>,
    ) -> bool {
        match self.ability_change_appliable(target, ability, launcher) {
            Ok(permit) => {
                self.ability_change(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }

    /// Runs the on-entry chain for a battler on the field.
    pub fn on_entry(&mut self, who: BattlerId) {
        let battler = self.logic.get(who);
        if battler.dead() || !battler.on_field() {
            return;
        }
        let _ = exec_hooks::<OnEntry>(self.logic, &mut Entry { who });
    }
}

/// `swiftswim` -> `Swiftswim`; ids carry no word breaks.
pub fn ability_display(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn locked_abilities_cannot_be_replaced() {
        let mut logic = duel(pikachu().with_ability("Disguise"), onix());
        let target = BattlerId::new(0, 0);
        assert!(!logic
            .ability_change_handler()
            .ability_change_with_process(target, "Levitate", None));
        assert!(logic.get(target).has_ability("disguise"));
    }

    #[test]
    fn change_updates_ability_effect() {
        let mut logic = duel(pikachu(), onix());
        let target = BattlerId::new(0, 0);
        assert!(logic
            .ability_change_handler()
            .ability_change_with_process(target, "Levitate", None));
        let battler = logic.get(target);
        assert!(battler.has_ability("levitate"));
        assert!(matches!(
            battler.ability_effect.as_ref().map(|e| &e.kind),
            Some(crate::effects::EffectKind::Ability(id)) if id == "levitate"
        ));
    }

    #[test]
    fn deny_lists() {
        assert!(!can_copy("wonderguard"));
        assert!(can_copy("intimidate"));
        assert!(!can_overwrite("multitype"));
    }
}
