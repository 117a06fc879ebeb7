use super::{Check, FieldTerrainChangeHandler, Permit};
use crate::battler::BattlerId;
use crate::env::FieldTerrain;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

pub const DEFAULT_TERRAIN_TURNS: u32 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldTerrainChange {
    pub terrain: Option<FieldTerrain>,
    pub turns: Option<u32>,
    pub launcher: Option<BattlerId>,
}

hook_point!(FieldTerrainPrevention: "field_terrain_change" / "field_terrain_prevention", FieldTerrainChange => Prevented);
hook_point!(PostFieldTerrainChange: "field_terrain_change" / "post_field_terrain_change", FieldTerrainChange => ());

fn terrain_text(old: Option<FieldTerrain>, new: Option<FieldTerrain>) -> Option<&'static str> {
    Some(match (old, new) {
        (_, Some(FieldTerrain::Electric)) => "An electric current ran across the battlefield!",
        (_, Some(FieldTerrain::Grassy)) => "Grass grew to cover the battlefield!",
        (_, Some(FieldTerrain::Misty)) => "Mist swirled around the battlefield!",
        (_, Some(FieldTerrain::Psychic)) => "The battlefield got weird!",
        (Some(FieldTerrain::Electric), None) => "The electricity disappeared from the battlefield.",
        (Some(FieldTerrain::Grassy), None) => "The grass disappeared from the battlefield.",
        (Some(FieldTerrain::Misty), None) => "The mist disappeared from the battlefield.",
        (Some(FieldTerrain::Psychic), None) => "The weirdness disappeared from the battlefield!",
        (None, None) => return None,
    })
}

impl FieldTerrainChangeHandler<'_> {
    pub fn field_terrain_appliable(
        &mut self,
        terrain: Option<FieldTerrain>,
        turns: Option<u32>,
        launcher: Option<BattlerId>,
    ) -> Check<FieldTerrainChange> {
        if self.logic.env().field_terrain == terrain {
            return Err(Prevented::silent());
        }
        let mut change = FieldTerrainChange {
            terrain,
            turns,
            launcher,
        };
        if let ControlFlow::Break(prevented) = exec_hooks::<FieldTerrainPrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        Ok(Permit::new(change))
    }

    pub fn field_terrain_change(&mut self, permit: Permit<FieldTerrainChange>) {
        let mut change = permit.into_inner();
        let old = std::mem::replace(&mut self.logic.env_mut().field_terrain, change.terrain);
        self.logic
            .effects_mut()
            .set_field_terrain(change.terrain, change.turns);
        self.logic
            .logger_mut()
            .log_field(change.terrain.map(FieldTerrain::name).unwrap_or("none"));
        if let Some(text) = terrain_text(old, change.terrain) {
            self.logic.display_message(text);
        }
        let _ = exec_hooks::<PostFieldTerrainChange>(self.logic, &mut change);
    }

    pub fn field_terrain_change_with_process(
        &mut self,
        terrain: Option<FieldTerrain>,
        turns: Option<u32>,
        launcher: Option<BattlerId>,
    ) -> bool {
        match self.field_terrain_appliable(terrain, turns, launcher) {
            Ok(permit) => {
                self.field_terrain_change(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }

    pub(crate) fn expire(&mut self) {
        self.logic.env_mut().field_terrain = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn terrain_change_rebuilds_the_singleton() {
        let mut logic = duel(pikachu(), onix());
        assert!(logic.field_terrain_change_handler().field_terrain_change_with_process(
            Some(FieldTerrain::Grassy),
            Some(DEFAULT_TERRAIN_TURNS),
            None
        ));
        assert!(logic.field_terrain_change_handler().field_terrain_change_with_process(
            Some(FieldTerrain::Electric),
            Some(3),
            None
        ));
        let effect = logic.effects().field_terrain().unwrap();
        assert_eq!(effect.kind, crate::effects::EffectKind::FieldTerrain(FieldTerrain::Electric));
        assert_eq!(effect.counter(), Some(3));
        assert!(!logic.field_terrain_change_handler().field_terrain_change_with_process(
            Some(FieldTerrain::Electric),
            Some(3),
            None
        ));
    }
}
