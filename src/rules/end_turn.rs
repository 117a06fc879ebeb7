use super::{by_speed, fraction};
use crate::battler::{BattlerId, Stat};
use crate::creature::Status;
use crate::effects::{EffectKind, Scope};
use crate::env::{FieldTerrain, Weather};
use crate::handlers::damage::HpChange;
use crate::handlers::end_turn::{EndTurn, EndTurnEvent};
use crate::handlers::stat::StatChange;
use crate::hooks::HookRegistry;
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use crate::types::Type;
use std::ops::ControlFlow;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<EndTurnEvent, _>("weather", weather);
    registry.register::<EndTurnEvent, _>("grassy terrain", grassy_terrain);
    registry.register::<EndTurnEvent, _>("held item", held_items);
    registry.register::<EndTurnEvent, _>("status damage", status_damage);
    registry.register::<EndTurnEvent, _>("bind", bind);
    registry.register::<EndTurnEvent, _>("speed boost", speed_boost);
}

/// Residual damage of `max_hp / divisor`.
fn hurt(logic: &mut Logic, id: BattlerId, divisor: u16, text: String) {
    let amount = fraction(logic, id, divisor);
    logic.display_message(&text);
    logic
        .damage_handler()
        .damage_change_with_process(HpChange::new(amount, id));
}

fn restore(logic: &mut Logic, id: BattlerId, divisor: u16, text: String) {
    let amount = fraction(logic, id, divisor);
    if logic.damage_handler().heal_with_process(HpChange::new(amount, id)) > 0 {
        logic.display_message(&text);
    }
}

/// Alive battlers in speed order, re-checked as the sweep goes.
fn sweep(logic: &mut Logic, mut each: impl FnMut(&mut Logic, BattlerId)) {
    for id in by_speed(logic) {
        if logic.get(id).alive() && logic.get(id).on_field() {
            each(logic, id);
        }
    }
}

fn weather(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    let Some(weather) = logic.env().weather else {
        return ControlFlow::Continue(());
    };
    sweep(logic, |logic, id| {
        let battler = logic.get(id);
        let name = battler.name.clone();
        let ability = battler.ability.clone();
        let rock_solid = [Type::Rock, Type::Ground, Type::Steel].iter().any(|t| battler.has_type(*t));
        let icy = battler.has_type(Type::Ice);
        match (weather, ability.as_str()) {
            (Weather::Rain, "raindish") => restore(logic, id, 16, format!("{name} restored HP using its Rain Dish!")),
            (Weather::Rain, "dryskin") => restore(logic, id, 8, format!("{name} restored HP using its Dry Skin!")),
            (Weather::Sun, "dryskin") => hurt(logic, id, 8, format!("{name} is hurt by its Dry Skin!")),
            (Weather::Hail, "icebody") => restore(logic, id, 16, format!("{name} restored HP using its Ice Body!")),
            (Weather::Sand, "sandveil" | "sandrush" | "sandforce" | "overcoat") => {}
            (Weather::Hail, "snowcloak" | "overcoat") => {}
            (Weather::Sand, _) if !rock_solid => {
                hurt(logic, id, 16, format!("{name} is buffeted by the sandstorm!"))
            }
            (Weather::Hail, _) if !icy => hurt(logic, id, 16, format!("{name} is buffeted by the hail!")),
            _ => {}
        }
    });
    ControlFlow::Continue(())
}

fn grassy_terrain(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    if logic.env().field_terrain != Some(FieldTerrain::Grassy) {
        return ControlFlow::Continue(());
    }
    sweep(logic, |logic, id| {
        if logic.get(id).grounded() {
            let name = logic.get(id).name.clone();
            restore(logic, id, 16, format!("{name}'s HP was restored."));
        }
    });
    ControlFlow::Continue(())
}

fn held_items(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    sweep(logic, |logic, id| {
        let battler = logic.get(id);
        let name = battler.name.clone();
        let poison_type = battler.has_type(Type::Poison);
        match battler.item.as_deref().and_then(held_item) {
            Some(HeldItem::Leftovers) => restore(
                logic,
                id,
                16,
                format!("{name} restored a little HP using its Leftovers!"),
            ),
            Some(HeldItem::BlackSludge) if poison_type => restore(
                logic,
                id,
                16,
                format!("{name} restored a little HP using its Black Sludge!"),
            ),
            Some(HeldItem::BlackSludge) => hurt(logic, id, 8, format!("{name} is hurt by its Black Sludge!")),
            _ => {}
        }
    });
    ControlFlow::Continue(())
}

fn status_damage(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    sweep(logic, |logic, id| {
        let battler = logic.get(id);
        let name = battler.name.clone();
        let poison_heal = battler.has_ability("poisonheal");
        match battler.status {
            Some(Status::Poison | Status::Toxic) if poison_heal => {
                restore(logic, id, 8, format!("{name} restored HP using its Poison Heal!"))
            }
            Some(Status::Burn) => hurt(logic, id, 16, format!("{name} is hurt by its burn!")),
            Some(Status::Poison) => hurt(logic, id, 8, format!("{name} is hurt by poison!")),
            Some(Status::Toxic) => {
                let battler = logic.get_mut(id);
                battler.status_count = battler.status_count.saturating_add(1).min(15);
                let amount = ((battler.max_hp as u32 * battler.status_count as u32) / 16).max(1) as u16;
                logic.display_message(&format!("{name} is hurt by poison!"));
                logic
                    .damage_handler()
                    .damage_change_with_process(HpChange::new(amount, id));
            }
            _ => {}
        }
    });
    ControlFlow::Continue(())
}

fn bind(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    sweep(logic, |logic, id| {
        let bound = logic
            .effects()
            .find(Scope::Battler(id), |e| matches!(e.kind, EffectKind::Bind { .. }))
            .is_some();
        if bound {
            let name = logic.get(id).name.clone();
            hurt(logic, id, 8, format!("{name} is hurt by Bind!"));
        }
    });
    ControlFlow::Continue(())
}

fn speed_boost(logic: &mut Logic, _: &mut EndTurn) -> ControlFlow<()> {
    sweep(logic, |logic, id| {
        let battler = logic.get(id);
        if battler.has_ability("speedboost") && battler.turn_count > 0 {
            logic
                .stat_change_handler()
                .stat_change_with_process(StatChange::new(Stat::Spd, 1, id));
        }
    });
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::battler::{BattlerId, Stat};
    use crate::creature::Status;
    use crate::env::Weather;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn sandstorm_spares_rock_types() {
        let mut logic = duel(pikachu(), onix().with_ability("sandstream"));
        assert_eq!(logic.env().weather, Some(Weather::Sand));
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let (hp_a, hp_b) = (logic.get(a).hp, logic.get(b).hp);
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).hp, hp_a - logic.get(a).max_hp / 16);
        assert_eq!(logic.get(b).hp, hp_b);
    }

    #[test]
    fn toxic_damage_grows_each_turn() {
        let mut player = pikachu();
        player.status = Some(Status::Toxic);
        let mut logic = duel(player, onix());
        let a = BattlerId::new(0, 0);
        let max = logic.get(a).max_hp;
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).hp, max - max / 16);
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).hp, max - max / 16 - max * 2 / 16);
    }

    #[test]
    fn leftovers_heal_a_sixteenth() {
        let mut player = pikachu().with_item("leftovers");
        player.hp = Some(20);
        let mut logic = duel(player, onix());
        let a = BattlerId::new(0, 0);
        let max = logic.get(a).max_hp;
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).hp, 20 + max / 16);
    }

    #[test]
    fn speed_boost_waits_one_turn_on_the_field() {
        let mut logic = duel(pikachu().with_ability("speedboost"), onix());
        let a = BattlerId::new(0, 0);
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).stat_stage(Stat::Spd), 0);
        logic.battle_phase_end_turn();
        assert_eq!(logic.get(a).stat_stage(Stat::Spd), 1);
    }
}
