use super::ExpHandler;
use crate::battler::BattlerId;
use crate::creature::exp_for_level;

impl ExpHandler<'_> {
    /// Exp yielded by a fainted foe before it is shared.
    pub fn exp_yield(&self, fainted: BattlerId) -> u32 {
        let foe = self.logic.get(fainted);
        let mut total = foe.creature().base_exp as u32 * foe.level as u32 / 7;
        if self.logic.info().trainer_battle() {
            total = total * 3 / 2;
        }
        total.max(1)
    }

    /// Shares the exp of `fainted` among the player's party members that
    /// faced it, levelling them up as needed.
    pub fn distribute(&mut self, fainted: BattlerId) {
        if fainted.bank == 0 {
            return;
        }
        let participants: Vec<BattlerId> = self
            .logic
            .roster(0)
            .iter()
            .filter(|b| b.from_party && b.alive() && b.encountered.contains(&fainted))
            .map(|b| b.id)
            .collect();
        if participants.is_empty() {
            return;
        }
        let share = (self.exp_yield(fainted) / participants.len() as u32).max(1);
        let max_level = self.logic.info().max_level;
        let mut gains = Vec::with_capacity(participants.len());
        for id in participants {
            let battler = self.logic.get_mut(id);
            if battler.level >= max_level {
                continue;
            }
            let cap = exp_for_level(max_level);
            let before = battler.exp;
            battler.exp = (battler.exp + share).min(cap);
            let gained = battler.exp - before;
            let name = battler.name.clone();
            gains.push((id, gained));
            self.logic
                .display_message(&format!("{name} gained {gained} Exp. Points!"));
            self.level_up(id, max_level);
        }
        self.logic.visual().exp_distribution(&gains);
    }

    fn level_up(&mut self, id: BattlerId, max_level: u8) {
        loop {
            let battler = self.logic.get_mut(id);
            if battler.level >= max_level || battler.exp < exp_for_level(battler.level + 1) {
                break;
            }
            battler.level += 1;
            battler.recalculate_stats();
            let (name, level) = (battler.name.clone(), battler.level);
            let evolves = battler
                .creature()
                .evolution
                .as_ref()
                .is_some_and(|evolution| evolution.level <= level);
            self.logic.visual().refresh_info_bar(id);
            self.logic
                .display_message(&format!("{name} grew to Lv. {level}!"));
            if evolves {
                self.logic.request_evolve(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Evolution;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn participants_level_up_and_queue_evolution() {
        let mut young = pikachu();
        young.level = 5;
        young.evolution = Some(Evolution {
            level: 6,
            into: "raichu".to_string(),
        });
        let mut foe = onix();
        foe.base_exp = 255;
        foe.level = 30;
        let mut logic = duel(young, foe);
        let fainted = BattlerId::new(1, 0);
        logic.exp_handler().distribute(fainted);
        let pika = logic.get(BattlerId::new(0, 0));
        assert!(pika.level > 5);
        assert_eq!(logic.evolve_requests(), &[BattlerId::new(0, 0)]);
    }

    #[test]
    fn max_level_caps_exp() {
        let mut logic = duel(pikachu(), onix());
        let max = logic.info().max_level;
        let id = BattlerId::new(0, 0);
        logic.get_mut(id).level = max;
        let exp = logic.get(id).exp;
        logic.exp_handler().distribute(BattlerId::new(1, 0));
        assert_eq!(logic.get(id).exp, exp);
    }
}
