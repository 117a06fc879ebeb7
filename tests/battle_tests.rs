use battle_logic::actions::Action;
use battle_logic::battle::{run_batch, Battle, BattleOptions, BatchSummary};
use battle_logic::battle_info::BattleInfo;
use battle_logic::battler::{BattlerId, Stat, MAX_STAGE};
use battle_logic::creature::{BaseStats, Creature};
use battle_logic::effects::{EffectKind, Scope};
use battle_logic::handlers::stat::StatChange;
use battle_logic::hooks::default_hooks;
use battle_logic::logic::{BattleOutcome, Logic};
use battle_logic::rng::RngSeeds;
use battle_logic::scene::HeadlessScene;
use battle_logic::types::Type;

fn make_creature(species: &str, level: u8, types: &[Type], speed: u16, skills: &[&str]) -> Creature {
    Creature::new(
        species,
        level,
        types,
        BaseStats {
            hp: 60,
            atk: 60,
            dfe: 60,
            ats: 60,
            dfs: 60,
            spd: speed,
        },
    )
    .with_skills(skills)
    .with_ability("runaway")
}

fn pikachu(skills: &[&str]) -> Creature {
    make_creature("Pikachu", 50, &[Type::Electric], 90, skills)
}

fn rattata(level: u8) -> Creature {
    make_creature("Rattata", level, &[Type::Normal], 72, &["tackle"])
}

fn started(info: BattleInfo, seed: u64) -> Logic {
    let mut logic = Logic::with_defaults(info, seed).unwrap();
    logic.battle_phase_start();
    logic
}

fn position_of(logic: &Logic, text: &str) -> Option<usize> {
    logic.logger().messages().position(|m| m == text)
}

#[test]
fn same_seed_gives_the_same_battle() {
    let info = BattleInfo::wild(vec![pikachu(&["thunderbolt", "quickattack", "growl"])], rattata(48));
    let options = BattleOptions { max_turns: 50, seed: 42 };
    let first = Battle::new(info.clone(), options).unwrap().run();
    let second = Battle::new(info.clone(), options).unwrap().run();
    assert_eq!(first.log, second.log);
    assert_eq!(first.outcome, second.outcome);

    let logic = Logic::new(
        info,
        default_hooks(),
        Box::new(HeadlessScene::new()),
        first.seeds,
    )
    .unwrap();
    let replay = Battle::from_logic(logic, options).run();
    assert_eq!(replay.log, first.log);
}

#[test]
fn seeds_survive_a_reload() {
    let info = BattleInfo::wild(vec![pikachu(&["tackle"])], rattata(10));
    let mut logic = started(info, 5);
    let seeds = logic.rng_seeds();
    logic.load_rng(RngSeeds::from_master(99));
    assert_ne!(logic.rng_seeds(), seeds);
    logic.load_rng(seeds);
    assert_eq!(logic.rng_seeds(), seeds);
}

#[test]
fn priority_tier_beats_speed() {
    let slow = make_creature("Snorlax", 50, &[Type::Normal], 30, &["quickattack"]);
    let info = BattleInfo::wild(vec![slow], pikachu(&["tackle"]));
    let mut logic = started(info, 1);
    let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
    let actions = vec![Action::attack(b, 0, a, &logic), Action::attack(a, 0, b, &logic)];
    assert_eq!(logic.add_actions(actions), 2);
    logic.sort_actions();
    assert!(logic.attack_before(a, b));
    while logic.perform_next_action() {}
    let quick = position_of(&logic, "Snorlax used Quick Attack!").unwrap();
    let tackle = position_of(&logic, "Pikachu used Tackle!").unwrap();
    assert!(quick < tackle);
}

#[test]
fn speed_ties_are_decided_the_same_way_every_time() {
    for seed in 0..5 {
        let info = BattleInfo::wild(vec![pikachu(&["growl"])], pikachu(&["growl"]));
        let mut logic = started(info, seed);
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        logic.add_actions(vec![Action::attack(b, 0, a, &logic), Action::attack(a, 0, b, &logic)]);
        logic.sort_actions();
        assert!(logic.attack_before(a, b));
    }
}

#[test]
fn stages_stay_within_bounds() {
    let info = BattleInfo::wild(vec![pikachu(&["growl"])], rattata(10));
    let mut logic = started(info, 1);
    let id = BattlerId::new(0, 0);
    for _ in 0..10 {
        logic
            .stat_change_handler()
            .stat_change_with_process(StatChange::new(Stat::Spd, 3, id));
    }
    assert_eq!(logic.get(id).stat_stage(Stat::Spd), MAX_STAGE);
    for _ in 0..10 {
        logic
            .stat_change_handler()
            .stat_change_with_process(StatChange::new(Stat::Spd, -4, id));
    }
    assert_eq!(logic.get(id).stat_stage(Stat::Spd), -MAX_STAGE);
}

#[test]
fn reflect_lasts_five_sweeps() {
    let info = BattleInfo::wild(vec![pikachu(&["reflect"])], rattata(5).with_skills(&["growl"]));
    let mut logic = started(info, 3);
    let a = BattlerId::new(0, 0);
    logic.add_actions(vec![Action::attack(a, 0, a, &logic)]);
    logic.sort_actions();
    while logic.perform_next_action() {}
    for _ in 0..4 {
        logic.battle_phase_end_turn();
        assert!(logic.effects().has(Scope::Bank(0), &EffectKind::Reflect));
    }
    logic.battle_phase_end_turn();
    assert!(!logic.effects().has(Scope::Bank(0), &EffectKind::Reflect));
}

#[test]
fn master_ball_from_the_bag_ends_the_battle() {
    let mut info = BattleInfo::wild(vec![pikachu(&["tackle"])], rattata(20));
    info.bags[0][0].insert("masterball".to_string(), 1);
    let mut logic = started(info, 8);
    let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
    let actions = vec![
        Action::Item {
            user: a,
            item: "masterball".to_string(),
            target: b,
        },
        Action::attack(b, 0, a, &logic),
    ];
    logic.add_actions(actions);
    logic.sort_actions();
    while logic.perform_next_action() {}
    assert_eq!(logic.battle_result(), Some(BattleOutcome::Caught));
    assert_eq!(logic.bag_count(a, "masterball"), 0);
    assert!(position_of(&logic, "Rattata used Tackle!").is_none());
    let report = logic.battle_phase_end();
    assert_eq!(report.caught.map(|c| c.species), Some("Rattata".to_string()));
    assert!(logic.env().has_caught("Rattata"));
}

#[test]
fn trainer_battle_ends_when_the_last_creature_faints() {
    let player = make_creature("Mewtwo", 100, &[Type::Psychic], 130, &["thunderbolt"]);
    let info = BattleInfo::trainer(vec![player], "Joey", "Youngster", vec![rattata(3), rattata(4)], 16);
    let record = Battle::new(info, BattleOptions { max_turns: 20, seed: 4 }).unwrap().run();
    assert_eq!(record.outcome, BattleOutcome::Victory);
    assert!(record.turns >= 2);
    assert_eq!(record.report.money, 16 * 4);
    assert!(record.log.iter().any(|line| line == "|win|Player"));
}

#[test]
fn batch_is_reproducible() {
    let info = BattleInfo::wild(vec![pikachu(&["thunderbolt", "tackle"])], rattata(45));
    let options = BattleOptions { max_turns: 100, seed: 11 };
    let first = run_batch(&info, 8, &options).unwrap();
    let second = run_batch(&info, 8, &options).unwrap();
    assert_eq!(first.len(), 8);
    let outcomes = |records: &[battle_logic::battle::BattleRecord]| {
        records.iter().map(|r| (r.outcome, r.turns)).collect::<Vec<_>>()
    };
    assert_eq!(outcomes(&first), outcomes(&second));
    assert_eq!(BatchSummary::from_records(&first).battles, 8);
}

#[test]
fn invalid_battle_info_is_rejected() {
    let info = BattleInfo::wild(vec![pikachu(&["hyperbeam"])], rattata(3));
    assert!(Logic::with_defaults(info.clone(), 0).is_err());
    assert!(run_batch(&info, 2, &BattleOptions::default()).is_err());
}
