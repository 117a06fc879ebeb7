use crate::battler::BattlerId;
use crate::handlers::battle_end::{BattleEnd, BattleEndHardcore, BattleEndNature, BattleEndNoDefeat, BattleEndReport};
use crate::hooks::HookRegistry;
use crate::items::{held_item, HeldItem};
use crate::logic::{BattleOutcome, Logic};
use crate::rng::Stream;
use std::ops::ControlFlow;

const PICKUP_CHANCE: u32 = 10;
const PICKUP_ITEMS: &[&str] = &["potion", "superpotion", "antidote", "fullheal", "greatball", "ultraball", "leftovers"];

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<BattleEnd, _>("natural cure", natural_cure);
    registry.register::<BattleEnd, _>("form recalibration", form_recalibration);
    registry.register::<BattleEndNoDefeat, _>("pickup", pickup);
    registry.register::<BattleEndNoDefeat, _>("prize money", prize_money);
    registry.register::<BattleEndNoDefeat, _>("evolution", evolution);
    registry.register::<BattleEndHardcore, _>("permadeath", permadeath);
    registry.register::<BattleEndNature, _>("dex", dex);
}

fn natural_cure(logic: &mut Logic, _: &mut BattleEndReport) -> ControlFlow<()> {
    let cured: Vec<BattlerId> = logic
        .every_battler()
        .filter(|b| b.alive() && b.status.is_some() && b.has_ability("naturalcure"))
        .map(|b| b.id)
        .collect();
    for id in cured {
        let battler = logic.get_mut(id);
        battler.status = None;
        battler.status_count = 0;
    }
    ControlFlow::Continue(())
}

/// Mega and other battle forms go back to the persistent form.
fn form_recalibration(logic: &mut Logic, _: &mut BattleEndReport) -> ControlFlow<()> {
    let changed: Vec<BattlerId> = logic
        .every_battler()
        .filter(|b| b.mega_evolved || b.form != b.creature().form)
        .map(|b| b.id)
        .collect();
    for id in changed {
        let battler = logic.get_mut(id);
        battler.mega_evolved = false;
        battler.form = battler.creature().form;
        battler.types = battler.creature().type_pair();
        battler.recalculate_stats();
    }
    ControlFlow::Continue(())
}

fn pickup(logic: &mut Logic, report: &mut BattleEndReport) -> ControlFlow<()> {
    let pickers: Vec<BattlerId> = logic
        .roster(0)
        .iter()
        .filter(|b| b.from_party && b.alive() && b.original_item.is_none() && b.has_ability("pickup"))
        .map(|b| b.id)
        .collect();
    for id in pickers {
        if !logic.rng_mut().generic_chance(PICKUP_CHANCE) {
            continue;
        }
        let pick = logic.rng_mut().rand(Stream::Generic, PICKUP_ITEMS.len() as u32) as usize;
        let item = PICKUP_ITEMS[pick].to_string();
        let battler = logic.get_mut(id);
        battler.item = Some(item.clone());
        battler.original_item = Some(item.clone());
        report.pickups.push((id, item));
    }
    ControlFlow::Continue(())
}

fn prize_money(logic: &mut Logic, report: &mut BattleEndReport) -> ControlFlow<()> {
    if report.outcome != BattleOutcome::Victory || !logic.info().trainer_battle() {
        return ControlFlow::Continue(());
    }
    let mut money = 0u32;
    for (bank, parties) in logic.info().base_money.iter().enumerate().skip(1) {
        for (party, base) in parties.iter().enumerate() {
            let top_level = logic
                .roster(bank)
                .iter()
                .filter(|b| b.party_id == party)
                .map(|b| b.level as u32)
                .max()
                .unwrap_or(0);
            money = money.saturating_add(base.saturating_mul(top_level));
        }
    }
    let amulet = logic
        .roster(0)
        .iter()
        .any(|b| b.from_party && b.item.as_deref().and_then(held_item) == Some(HeldItem::Amulet));
    if amulet {
        money = money.saturating_mul(2);
    }
    if money == 0 {
        return ControlFlow::Continue(());
    }
    let env = logic.env_mut();
    env.money = env.money.saturating_add(money);
    report.money = money;
    let player = logic.info().names[0].first().cloned().unwrap_or_else(|| "You".to_string());
    logic.display_message(&format!("{player} got ${money} for winning!"));
    ControlFlow::Continue(())
}

fn evolution(logic: &mut Logic, report: &mut BattleEndReport) -> ControlFlow<()> {
    let requests = logic.evolve_requests().to_vec();
    for id in requests {
        let battler = logic.get(id);
        let Some(into) = battler.creature().evolution.as_ref().map(|e| e.into.clone()) else {
            continue;
        };
        if battler.dead() {
            continue;
        }
        let name = battler.name.clone();
        let battler = logic.get_mut(id);
        let creature = battler.creature_mut();
        creature.species = into.clone();
        creature.evolution = None;
        battler.species = into.clone();
        if battler.creature().nickname.is_none() {
            battler.name = into.clone();
        }
        logic.display_message(&format!("Congratulations! Your {name} evolved into {into}!"));
        report.evolutions.push((id, into));
    }
    ControlFlow::Continue(())
}

fn permadeath(logic: &mut Logic, report: &mut BattleEndReport) -> ControlFlow<()> {
    let fallen = logic
        .roster(0)
        .iter()
        .filter(|b| b.from_party && b.dead())
        .map(|b| b.id);
    for id in fallen {
        if !report.removed.contains(&id) {
            report.removed.push(id);
        }
    }
    ControlFlow::Continue(())
}

fn dex(logic: &mut Logic, _: &mut BattleEndReport) -> ControlFlow<()> {
    let seen: Vec<String> = logic
        .every_battler()
        .filter(|b| b.id.bank != 0 && b.last_sent_turn.is_some())
        .map(|b| b.species.clone())
        .collect();
    logic.env_mut().seen_species.extend(seen);
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::battle_info::BattleInfo;
    use crate::creature::Evolution;
    use crate::logic::{BattleOutcome, Logic};
    use crate::test_support::{onix, pikachu};

    fn won_trainer_battle(player: crate::creature::Creature) -> Logic {
        let mut info = BattleInfo::trainer(vec![player], "Brock", "Leader", vec![onix()], 40);
        info.env.hardcore = true;
        let mut logic = Logic::with_defaults(info, 5).unwrap();
        logic.battle_phase_start();
        logic.set_battle_result(BattleOutcome::Victory);
        logic
    }

    #[test]
    fn victory_pays_base_money_times_top_level() {
        let mut logic = won_trainer_battle(pikachu());
        let report = logic.battle_phase_end();
        assert_eq!(report.money, 40 * 40);
        assert_eq!(logic.env().money, 1600);
    }

    #[test]
    fn amulet_coin_doubles_the_prize() {
        let mut logic = won_trainer_battle(pikachu().with_item("amuletcoin"));
        assert_eq!(logic.battle_phase_end().money, 3200);
    }

    #[test]
    fn requested_evolution_changes_the_species() {
        let mut player = pikachu();
        player.evolution = Some(Evolution {
            level: 50,
            into: "Raichu".to_string(),
        });
        let mut logic = won_trainer_battle(player);
        logic.request_evolve(crate::battler::BattlerId::new(0, 0));
        let report = logic.battle_phase_end();
        assert_eq!(report.evolutions.len(), 1);
        assert_eq!(report.party[0].species, "Raichu");
    }

    #[test]
    fn hardcore_drops_fainted_members() {
        let mut logic = won_trainer_battle(pikachu());
        logic.get_mut(crate::battler::BattlerId::new(0, 0)).hp = 0;
        let report = logic.battle_phase_end();
        assert_eq!(report.removed.len(), 1);
        assert!(report.party.is_empty());
    }
}
