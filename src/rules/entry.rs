use crate::battler::Stat;
use crate::env::{FieldTerrain, Weather};
use crate::handlers::ability::{can_copy, Entry, OnEntry};
use crate::handlers::field_terrain::DEFAULT_TERRAIN_TURNS;
use crate::handlers::stat::StatChange;
use crate::handlers::weather::DEFAULT_WEATHER_TURNS;
use crate::hooks::HookRegistry;
use crate::logic::Logic;
use crate::rng::Stream;
use phf::phf_map;
use std::ops::ControlFlow;

static WEATHER_SETTERS: phf::Map<&'static str, Weather> = phf_map! {
    "drizzle" => Weather::Rain,
    "drought" => Weather::Sun,
    "sandstream" => Weather::Sand,
    "snowwarning" => Weather::Hail,
};

static SURGES: phf::Map<&'static str, FieldTerrain> = phf_map! {
    "electricsurge" => FieldTerrain::Electric,
    "grassysurge" => FieldTerrain::Grassy,
    "mistysurge" => FieldTerrain::Misty,
    "psychicsurge" => FieldTerrain::Psychic,
};

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<OnEntry, _>("trace", trace);
    registry.register::<OnEntry, _>("intimidate", intimidate);
    registry.register::<OnEntry, _>("weather setter", weather_setter);
    registry.register::<OnEntry, _>("surge", surge);
    registry.register::<OnEntry, _>("download", download);
}

fn trace(logic: &mut Logic, entry: &mut Entry) -> ControlFlow<()> {
    if !logic.get(entry.who).has_ability("trace") {
        return ControlFlow::Continue(());
    }
    let copyable: Vec<String> = logic
        .adjacent_foes_of(entry.who)
        .into_iter()
        .map(|foe| logic.get(foe).ability.clone())
        .filter(|ability| can_copy(ability))
        .collect();
    if copyable.is_empty() {
        return ControlFlow::Continue(());
    }
    let pick = logic.rng_mut().rand(Stream::Generic, copyable.len() as u32) as usize;
    let name = logic.get(entry.who).name.clone();
    logic.display_message(&format!("{name} traced its foe's Ability!"));
    logic
        .ability_change_handler()
        .ability_change_with_process(entry.who, &copyable[pick], Some(entry.who));
    // The traced ability already ran its own entrance.
    ControlFlow::Break(())
}

fn intimidate(logic: &mut Logic, entry: &mut Entry) -> ControlFlow<()> {
    if !logic.get(entry.who).has_ability("intimidate") {
        return ControlFlow::Continue(());
    }
    let foes = logic.adjacent_foes_of(entry.who);
    if foes.is_empty() {
        return ControlFlow::Continue(());
    }
    let name = logic.get(entry.who).name.clone();
    logic.display_message(&format!("{name}'s Intimidate!"));
    for foe in foes {
        let change = StatChange::new(Stat::Atk, -1, foe).by(entry.who, None);
        logic.stat_change_handler().stat_change_with_process(change);
    }
    ControlFlow::Continue(())
}

fn weather_setter(logic: &mut Logic, entry: &mut Entry) -> ControlFlow<()> {
    let Some(&weather) = WEATHER_SETTERS.get(logic.get(entry.who).ability.as_str()) else {
        return ControlFlow::Continue(());
    };
    logic
        .weather_change_handler()
        .weather_change_with_process(Some(weather), Some(DEFAULT_WEATHER_TURNS), Some(entry.who));
    ControlFlow::Continue(())
}

fn surge(logic: &mut Logic, entry: &mut Entry) -> ControlFlow<()> {
    let Some(&terrain) = SURGES.get(logic.get(entry.who).ability.as_str()) else {
        return ControlFlow::Continue(());
    };
    logic.field_terrain_change_handler().field_terrain_change_with_process(
        Some(terrain),
        Some(DEFAULT_TERRAIN_TURNS),
        Some(entry.who),
    );
    ControlFlow::Continue(())
}

/// Raises whichever attacking stat hits the foes' weaker defense.
fn download(logic: &mut Logic, entry: &mut Entry) -> ControlFlow<()> {
    if !logic.get(entry.who).has_ability("download") {
        return ControlFlow::Continue(());
    }
    let foes = logic.foes_of(entry.who);
    if foes.is_empty() {
        return ControlFlow::Continue(());
    }
    let (def, spdef) = foes.iter().fold((0.0, 0.0), |(def, spdef), &foe| {
        let foe = logic.get(foe);
        (def + foe.staged_stat(Stat::Dfe), spdef + foe.staged_stat(Stat::Dfs))
    });
    let stat = if def < spdef { Stat::Atk } else { Stat::Ats };
    logic
        .stat_change_handler()
        .stat_change_with_process(StatChange::new(stat, 1, entry.who));
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::battler::{BattlerId, Stat};
    use crate::env::Weather;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn intimidate_lowers_the_foe_on_entry() {
        let logic = duel(pikachu(), onix().with_ability("intimidate"));
        assert_eq!(logic.get(BattlerId::new(0, 0)).stat_stage(Stat::Atk), -1);
    }

    #[test]
    fn drizzle_starts_five_turns_of_rain() {
        let logic = duel(pikachu().with_ability("drizzle"), onix());
        assert_eq!(logic.env().weather, Some(Weather::Rain));
        let rain = logic.effects().weather().and_then(|e| e.counter());
        assert_eq!(rain, Some(5));
    }

    #[test]
    fn trace_copies_the_foe_ability() {
        let logic = duel(pikachu().with_ability("trace"), onix().with_ability("intimidate"));
        let player = logic.get(BattlerId::new(0, 0));
        assert!(player.has_ability("intimidate"));
    }
}
