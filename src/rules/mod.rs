//! Built-in rule pack. Each group appends its callbacks to the hook chains;
//! the load order below is the execution order inside every chain.

mod battle_end;
mod catch;
mod damage;
mod end_turn;
mod entry;
mod flee;
mod moves;
mod stats;
mod status;
mod switch;

use crate::battler::BattlerId;
use crate::effects::EffectKind;
use crate::hooks::HookRegistry;
use crate::logic::Logic;

pub fn default_registry() -> HookRegistry {
    let mut registry = HookRegistry::new();
    status::register(&mut registry);
    stats::register(&mut registry);
    damage::register(&mut registry);
    switch::register(&mut registry);
    entry::register(&mut registry);
    end_turn::register(&mut registry);
    moves::register(&mut registry);
    flee::register(&mut registry);
    catch::register(&mut registry);
    battle_end::register(&mut registry);
    registry
}

/// The first ability in `abilities` covering `id`, its own or an ally's.
fn covering_ability(logic: &Logic, id: BattlerId, abilities: &[&'static str]) -> Option<&'static str> {
    logic.each_effects(&[id], |effect| match &effect.kind {
        EffectKind::Ability(ability) => abilities.iter().copied().find(|a| *a == ability.as_str()),
        _ => None,
    })
}

/// Alive battlers on the field, fastest first.
fn by_speed(logic: &Logic) -> Vec<BattlerId> {
    let mut ids: Vec<BattlerId> = logic.all_alive_battlers().map(|b| b.id).collect();
    ids.sort_by_key(|id| std::cmp::Reverse(logic.effective_speed(*id)));
    ids
}

/// `max_hp / divisor`, at least 1.
fn fraction(logic: &Logic, id: BattlerId, divisor: u16) -> u16 {
    (logic.get(id).max_hp / divisor).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::status::StatusPrevention;

    #[test]
    fn status_chain_starts_with_type_immunity() {
        let registry = default_registry();
        let reasons = registry.reasons::<StatusPrevention>();
        assert_eq!(reasons.first().copied(), Some("type immunity"));
        assert!(reasons.contains(&"safeguard"));
    }
}
