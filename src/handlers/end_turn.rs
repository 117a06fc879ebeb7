use super::EndTurnHandler;
use crate::effects::EffectKind;
use crate::hooks::{exec_hooks, hook_point};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EndTurn {
    pub turn: u32,
}

hook_point!(
    /// Residual effects: weather damage, leftovers, poison, ...
    EndTurnEvent: "end_turn" / "end_turn_event", EndTurn => ()
);

impl EndTurnHandler<'_> {
    /// The end-of-turn sweep. Residuals and replacements are skipped once the
    /// battle has a result; pending exp is always handed out.
    pub fn process(&mut self) {
        let turn = self.logic.turn();
        if self.logic.can_battle_continue() {
            let _ = exec_hooks::<EndTurnEvent>(self.logic, &mut EndTurn { turn });
        }
        self.revert_fainted_megas();
        if self.logic.can_battle_continue() {
            self.request_replacements();
            self.logic.battle_phase_switch();
        }
        self.logic.battle_phase_exp();
        self.decay_effects();
        for battler in self.logic.all_battlers_mut() {
            battler.flinch = false;
            battler.turn_count += 1;
        }
        self.logic.advance_turn();
    }

    fn revert_fainted_megas(&mut self) {
        let fainted: Vec<_> = self
            .logic
            .every_battler()
            .filter(|b| b.dead() && b.mega_evolved)
            .map(|b| b.id)
            .collect();
        for id in fainted {
            let battler = self.logic.get_mut(id);
            battler.mega_evolved = false;
            battler.form = battler.creature().form;
            battler.recalculate_stats();
            let ability = crate::normalize_id(&battler.creature().ability);
            battler.ability = ability.clone();
            battler.original_ability = ability;
            battler.types = battler.creature().type_pair();
            battler.refresh_ability_effect();
            tracing::debug!(?id, "fainted mega reverted");
        }
    }

    fn request_replacements(&mut self) {
        let fainted: Vec<_> = self
            .logic
            .all_battlers()
            .filter(|b| b.dead())
            .map(|b| b.id)
            .collect();
        for id in fainted {
            if self.logic.has_reserve(id) {
                self.logic.request_switch(id, None);
            }
        }
    }

    fn decay_effects(&mut self) {
        let removed = self.logic.effects_mut().decay();
        for effect in removed {
            match effect.kind {
                EffectKind::Weather(_) => self.logic.weather_change_handler().expire(),
                EffectKind::FieldTerrain(_) => self.logic.field_terrain_change_handler().expire(),
                _ => {}
            }
            if let Some(text) = effect.kind.expiry_message() {
                self.logic.display_message(&text);
            }
        }
    }
}
