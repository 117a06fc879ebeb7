use battle_logic::actions::Action;
use battle_logic::battle_info::BattleInfo;
use battle_logic::battler::{BattlerId, Stat};
use battle_logic::creature::{BaseStats, Creature, Status};
use battle_logic::handlers::stat::{StatChange, StatChangePrevention};
use battle_logic::handlers::status::{StatusAttempt, StatusChange, StatusPrevention};
use battle_logic::hooks::{veto, HookRegistry, Prevented};
use battle_logic::logic::Logic;
use battle_logic::rng::RngSeeds;
use battle_logic::rules::default_registry;
use battle_logic::scene::HeadlessScene;
use battle_logic::skills::MovePrevention;
use battle_logic::types::Type;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn creature(species: &str, types: &[Type]) -> Creature {
    Creature::new(
        species,
        30,
        types,
        BaseStats {
            hp: 70,
            atk: 70,
            dfe: 70,
            ats: 70,
            dfs: 70,
            spd: 70,
        },
    )
    .with_skills(&["tackle", "willowisp"])
    .with_ability("keeneye")
}

fn logic_with_hooks(registry: HookRegistry) -> Logic {
    let info = BattleInfo::wild(
        vec![creature("Pidgey", &[Type::Normal, Type::Flying])],
        creature("Sentret", &[Type::Normal]),
    );
    let mut logic = Logic::new(
        info,
        registry.freeze(),
        Box::new(HeadlessScene::new()),
        RngSeeds::from_master(21),
    )
    .unwrap();
    logic.battle_phase_start();
    logic
}

#[test]
fn vetoed_move_plays_its_reason_once() {
    let plays = Arc::new(AtomicUsize::new(0));
    let mut registry = default_registry();
    let counter = Arc::clone(&plays);
    registry.register::<MovePrevention, _>("taunt", move |logic, attempt| {
        if attempt.launcher.bank != 0 {
            return ControlFlow::Continue(());
        }
        let counter = Arc::clone(&counter);
        let name = logic.get(attempt.launcher).name.clone();
        ControlFlow::Break(Prevented::with(move |logic: &mut Logic| {
            counter.fetch_add(1, Ordering::SeqCst);
            logic.display_message(&format!("{name} can't use {} after the taunt!", "Tackle"));
        }))
    });
    let mut logic = logic_with_hooks(registry);
    let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
    let hp = logic.get(b).hp;
    let pp = logic.get(a).skills[0].pp;
    logic.add_actions(vec![Action::attack(a, 0, b, &logic)]);
    logic.sort_actions();
    while logic.perform_next_action() {}

    assert_eq!(plays.load(Ordering::SeqCst), 1);
    assert_eq!(logic.get(b).hp, hp);
    assert_eq!(logic.get(a).skills[0].pp, pp);
    let shown = logic
        .logger()
        .messages()
        .filter(|m| *m == "Pidgey can't use Tackle after the taunt!")
        .count();
    assert_eq!(shown, 1);
}

#[test]
fn vetoed_stat_rise_leaves_the_stage_and_plays_once() {
    let plays = Arc::new(AtomicUsize::new(0));
    let mut registry = default_registry();
    let counter = Arc::clone(&plays);
    registry.register::<StatChangePrevention, _>("no rises", move |logic, change| {
        if change.power <= 0 {
            return ControlFlow::Continue(());
        }
        let counter = Arc::clone(&counter);
        let name = logic.get(change.target).name.clone();
        ControlFlow::Break(Prevented::with(move |logic: &mut Logic| {
            counter.fetch_add(1, Ordering::SeqCst);
            logic.display_message(&format!("{name} is held back!"));
        }))
    });
    let mut logic = logic_with_hooks(registry);
    let target = BattlerId::new(0, 0);
    let applied = logic
        .stat_change_handler()
        .stat_change_with_process(StatChange::new(Stat::Atk, 1, target));

    assert_eq!(applied, 0);
    assert_eq!(logic.get(target).stat_stage(Stat::Atk), 0);
    assert_eq!(plays.load(Ordering::SeqCst), 1);
    let shown = logic
        .logger()
        .messages()
        .filter(|m| *m == "Pidgey is held back!")
        .count();
    assert_eq!(shown, 1);

    let lowered = logic
        .stat_change_handler()
        .stat_change_with_process(StatChange::new(Stat::Atk, -1, target));
    assert_eq!(lowered, -1);
    assert_eq!(plays.load(Ordering::SeqCst), 1);
}

#[test]
fn chains_run_in_registration_order_and_stop_at_the_first_break() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = HookRegistry::new();
    registry.register::<StatusPrevention, _>("first", |_, _| veto("The first rule said no."));
    let counter = Arc::clone(&calls);
    registry.register::<StatusPrevention, _>("second", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        ControlFlow::Continue(())
    });
    assert_eq!(registry.reasons::<StatusPrevention>(), vec!["first", "second"]);

    let mut logic = logic_with_hooks(registry);
    let target = BattlerId::new(1, 0);
    let applied = logic
        .status_change_handler()
        .status_change_with_process(StatusAttempt::new(StatusChange::Burn, target));
    assert!(!applied);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(logic.get(target).status, None);
    assert!(logic.logger().messages().any(|m| m == "The first rule said no."));
}

#[test]
fn empty_registry_lets_everything_through() {
    let mut logic = logic_with_hooks(HookRegistry::new());
    let target = BattlerId::new(1, 0);
    assert!(logic
        .status_change_handler()
        .status_change_with_process(StatusAttempt::new(StatusChange::Burn, target)));
    assert_eq!(logic.get(target).status, Some(Status::Burn));
}

#[test]
fn default_rules_are_loaded_in_a_fixed_order() {
    let registry = default_registry();
    let reasons = registry.reasons::<StatusPrevention>();
    assert_eq!(reasons.first(), Some(&"type immunity"));
    let again = default_registry();
    assert_eq!(again.reasons::<StatusPrevention>(), reasons);
}
