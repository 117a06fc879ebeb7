//! Drives a `Logic` from start to result with AI decision sources.

use crate::ai::RandomAI;
use crate::battle_info::BattleInfo;
use crate::handlers::battle_end::BattleEndReport;
use crate::logic::{BattleOutcome, Logic};
use crate::rng::RngSeeds;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Clone, Copy, Debug)]
pub struct BattleOptions {
    /// Turns after which the battle is called a draw.
    pub max_turns: u32,
    pub seed: u64,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            max_turns: 500,
            seed: 0,
        }
    }
}

/// Everything needed to replay or inspect a finished battle.
#[derive(Clone, Debug, Serialize)]
pub struct BattleRecord {
    pub seeds: RngSeeds,
    pub outcome: BattleOutcome,
    pub turns: u32,
    pub report: BattleEndReport,
    pub log: Vec<String>,
}

pub struct Battle {
    logic: Logic,
    options: BattleOptions,
}

impl Battle {
    /// Headless battle where every bank is played by a seeded `RandomAI`.
    pub fn new(info: BattleInfo, options: BattleOptions) -> anyhow::Result<Self> {
        let logic = Logic::with_defaults(info, options.seed)?;
        Ok(Self::from_logic(logic, options))
    }

    /// Wraps an existing logic and seats a `RandomAI` on every bank.
    pub fn from_logic(mut logic: Logic, options: BattleOptions) -> Self {
        for bank in 0..logic.bank_count() {
            let seed = options.seed ^ ((bank as u64 + 1) << 48);
            logic.set_ai(bank, Box::new(RandomAI::new(seed)));
        }
        Self { logic, options }
    }

    pub fn logic(&self) -> &Logic {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut Logic {
        &mut self.logic
    }

    /// One full turn; false once the battle has a result.
    pub fn run_turn(&mut self) -> bool {
        let actions = self.logic.collect_ai_actions();
        self.logic.add_actions(actions);
        self.logic.sort_actions();
        while self.logic.perform_next_action() {}
        self.logic.battle_phase_end_turn();
        self.logic.can_battle_continue()
    }

    pub fn run(mut self) -> BattleRecord {
        let seeds = self.logic.rng_seeds();
        self.logic.battle_phase_start();
        while self.logic.can_battle_continue() {
            if self.logic.turn() >= self.options.max_turns {
                tracing::debug!(turns = self.logic.turn(), "turn limit reached");
                self.logic.set_battle_result(BattleOutcome::Draw);
                break;
            }
            if !self.run_turn() {
                break;
            }
        }
        let report = self.logic.battle_phase_end();
        BattleRecord {
            seeds,
            outcome: report.outcome,
            turns: report.turns,
            log: self.logic.logger().log_lines().to_vec(),
            report,
        }
    }
}

/// Runs `count` independent battles of the same encounter in parallel.
/// Battle seeds are drawn from `options.seed`, so a batch is reproducible.
pub fn run_batch(info: &BattleInfo, count: usize, options: &BattleOptions) -> anyhow::Result<Vec<BattleRecord>> {
    info.validate()?;
    let mut master = SmallRng::seed_from_u64(options.seed);
    let seeds: Vec<u64> = (0..count).map(|_| master.gen()).collect();
    seeds
        .par_iter()
        .map(|&seed| -> anyhow::Result<BattleRecord> {
            let options = BattleOptions { seed, ..*options };
            Ok(Battle::new(info.clone(), options)?.run())
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
    pub battles: usize,
    pub victories: usize,
    pub defeats: usize,
    pub draws: usize,
    /// Fled or caught.
    pub other: usize,
}

impl BatchSummary {
    pub fn from_records(records: &[BattleRecord]) -> Self {
        let mut summary = Self {
            battles: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.outcome {
                BattleOutcome::Victory => summary.victories += 1,
                BattleOutcome::Defeat => summary.defeats += 1,
                BattleOutcome::Draw => summary.draws += 1,
                BattleOutcome::Fled | BattleOutcome::Caught => summary.other += 1,
            }
        }
        summary
    }

    /// Victories plus half the draws, over all battles.
    pub fn win_rate(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        (self.victories as f64 + 0.5 * self.draws as f64) / self.battles as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{onix, pikachu};

    #[test]
    fn battle_runs_to_a_result() {
        let info = BattleInfo::wild(vec![pikachu()], onix());
        let record = Battle::new(info, BattleOptions::default()).unwrap().run();
        assert!(record.turns <= 500);
        assert!(record.log.iter().any(|line| line == "|turn|1"));
        assert_eq!(record.report.outcome, record.outcome);
    }

    #[test]
    fn turn_limit_is_a_draw() {
        let info = BattleInfo::wild(vec![pikachu().with_skills(&["growl"])], onix().with_skills(&["growl"]));
        let options = BattleOptions { max_turns: 3, seed: 1 };
        let record = Battle::new(info, options).unwrap().run();
        assert_eq!(record.outcome, BattleOutcome::Draw);
        assert_eq!(record.turns, 3);
    }

    #[test]
    fn summary_counts_half_draws() {
        let summary = BatchSummary {
            battles: 4,
            victories: 1,
            defeats: 1,
            draws: 2,
            other: 0,
        };
        assert!((summary.win_rate() - 0.5).abs() < 1e-9);
    }
}
