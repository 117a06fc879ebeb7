pub mod actions;
pub mod ai;
pub mod battle;
pub mod battle_info;
pub mod battle_logger;
pub mod battler;
pub mod creature;
pub mod effects;
pub mod env;
pub mod handlers;
pub mod hooks;
pub mod items;
pub mod logic;
pub mod rng;
pub mod rules;
pub mod scene;
pub mod skills;
pub mod types;

use crate::battle::{run_batch, Battle, BattleOptions, BatchSummary};
use crate::battle_info::BattleInfo;
use crate::logic::Logic;
use crate::rng::RngSeeds;
use crate::scene::HeadlessScene;
use anyhow::Context;
use std::path::PathBuf;

/// Lowercase alphanumeric form used for skill, ability and item ids
/// ("Quick Attack" -> "quickattack").
pub fn normalize_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub battle_path: PathBuf,
    pub battles: usize,
    pub seed: u64,
    pub max_turns: u32,
    pub output_path: Option<PathBuf>,
    /// Print every battle message while running a single battle.
    pub echo: bool,
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.battles == 0 {
        anyhow::bail!("--battles must be > 0");
    }
    let info = BattleInfo::from_json_file(&opts.battle_path)?;
    let options = BattleOptions {
        max_turns: opts.max_turns,
        seed: opts.seed,
    };
    if opts.battles == 1 {
        let scene = if opts.echo {
            HeadlessScene::echoing()
        } else {
            HeadlessScene::new()
        };
        let logic = Logic::new(
            info,
            hooks::default_hooks(),
            Box::new(scene),
            RngSeeds::from_master(opts.seed),
        )?;
        let record = Battle::from_logic(logic, options).run();
        println!(
            "Battle ended after {} turns: {:?}",
            record.turns,
            record.outcome
        );
        if let Some(path) = &opts.output_path {
            let raw = serde_json::to_string_pretty(&record)?;
            std::fs::write(path, raw)
                .with_context(|| format!("Failed to write battle record to {}", path.display()))?;
            println!("Wrote battle record to {}", path.display());
        }
        return Ok(());
    }

    let records = run_batch(&info, opts.battles, &options)?;
    let summary = BatchSummary::from_records(&records);
    println!(
        "{} battles: {} victories, {} defeats, {} draws, {} other (win rate {:.3})",
        summary.battles,
        summary.victories,
        summary.defeats,
        summary.draws,
        summary.other,
        summary.win_rate()
    );
    if let Some(path) = &opts.output_path {
        let raw = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write battle records to {}", path.display()))?;
        println!("Wrote {} battle records to {}", records.len(), path.display());
    }
    Ok(())
}
