use super::BattleEndHandler;
use crate::battler::BattlerId;
use crate::creature::Creature;
use crate::hooks::{exec_hooks, hook_point};
use crate::logic::BattleOutcome;
use serde::Serialize;

/// What the battle left behind once every end stage ran.
#[derive(Clone, Debug, Serialize)]
pub struct BattleEndReport {
    pub outcome: BattleOutcome,
    pub turns: u32,
    pub money: u32,
    pub pickups: Vec<(BattlerId, String)>,
    pub evolutions: Vec<(BattlerId, String)>,
    /// Fainted creatures removed from the party in hardcore mode.
    pub removed: Vec<BattlerId>,
    pub caught: Option<Creature>,
    /// The player's party after copy-back, in party order.
    pub party: Vec<Creature>,
}

hook_point!(BattleEnd: "battle_end" / "battle_end", BattleEndReport => ());
hook_point!(
    /// Skipped when the player lost.
    BattleEndNoDefeat: "battle_end" / "battle_end_no_defeat", BattleEndReport => ()
);
hook_point!(
    /// Only runs in hardcore mode, after copy-back.
    BattleEndHardcore: "battle_end" / "battle_end_hardcore", BattleEndReport => ()
);
hook_point!(BattleEndNature: "battle_end" / "battle_end_nature", BattleEndReport => ());

impl BattleEndHandler<'_> {
    pub fn process(&mut self) -> BattleEndReport {
        let outcome = self.logic.battle_result().unwrap_or(BattleOutcome::Draw);
        let mut report = BattleEndReport {
            outcome,
            turns: self.logic.turn(),
            money: 0,
            pickups: Vec::new(),
            evolutions: Vec::new(),
            removed: Vec::new(),
            caught: None,
            party: Vec::new(),
        };
        let _ = exec_hooks::<BattleEnd>(self.logic, &mut report);
        if outcome != BattleOutcome::Defeat {
            let _ = exec_hooks::<BattleEndNoDefeat>(self.logic, &mut report);
        }
        self.copy_back(&mut report);
        if self.logic.env().hardcore {
            let _ = exec_hooks::<BattleEndHardcore>(self.logic, &mut report);
        }
        let _ = exec_hooks::<BattleEndNature>(self.logic, &mut report);

        report.party = self
            .logic
            .roster(0)
            .iter()
            .filter(|b| b.from_party && !report.removed.contains(&b.id))
            .map(|b| b.creature().clone())
            .collect();
        tracing::info!(?outcome, turns = report.turns, money = report.money, "battle ended");
        report
    }

    fn copy_back(&mut self, report: &mut BattleEndReport) {
        let ids: Vec<_> = self.logic.every_battler().map(|b| b.id).collect();
        for id in ids {
            self.logic.get_mut(id).copy_back();
        }
        if let Some(caught) = self.logic.caught() {
            report.caught = Some(self.logic.get(caught).creature().clone());
        }
    }
}
