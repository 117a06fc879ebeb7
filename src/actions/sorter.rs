use super::{Action, AttackAction, PriorityTrigger};
use crate::battler::BattlerId;
use crate::effects::{EffectKind, Scope};
use crate::env::Weather;
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use phf::phf_map;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Abilities doubling speed under a weather.
static WEATHER_SPEED: phf::Map<&'static str, Weather> = phf_map! {
    "swiftswim" => Weather::Rain,
    "chlorophyll" => Weather::Sun,
    "sandrush" => Weather::Sand,
    "slushrush" => Weather::Hail,
};

const QUICK_DRAW_CHANCE: u32 = 30;
const QUICK_CLAW_CHANCE: u32 = 20;

/// Speed after stages, paralysis, held items, weather abilities and tailwind.
pub fn effective_speed(logic: &Logic, id: BattlerId) -> u32 {
    let battler = logic.get(id);
    let mut speed = battler.staged_stat(crate::battler::Stat::Spd);
    if battler.status == Some(crate::creature::Status::Paralysis) {
        speed *= 0.5;
    }
    match battler.item.as_deref().and_then(held_item) {
        Some(HeldItem::ChoiceScarf) => speed *= 1.5,
        Some(HeldItem::IronBall) => speed *= 0.5,
        _ => {}
    }
    if let Some(weather) = WEATHER_SPEED.get(battler.ability.as_str()) {
        if logic.env().weather == Some(*weather) {
            speed *= 2.0;
        }
    }
    if logic.effects().has(Scope::Bank(id.bank), &EffectKind::Tailwind) {
        speed *= 2.0;
    }
    speed as u32
}

struct SpeedOrder {
    speeds: HashMap<BattlerId, u32>,
    trick_room: bool,
}

impl SpeedOrder {
    fn new(logic: &Logic) -> Self {
        let speeds = logic
            .every_battler()
            .map(|b| (b.id, effective_speed(logic, b.id)))
            .collect();
        Self {
            speeds,
            trick_room: logic.trick_room(),
        }
    }

    /// Faster first (slower under trick room); ties go to the lower bank,
    /// then the lower position.
    fn compare(&self, logic: &Logic, a: BattlerId, b: BattlerId) -> Ordering {
        let (sa, sb) = (self.speeds[&a], self.speeds[&b]);
        let by_speed = if self.trick_room { sa.cmp(&sb) } else { sb.cmp(&sa) };
        let position = |id: BattlerId| logic.get(id).position.unwrap_or(usize::MAX);
        by_speed
            .then_with(|| a.bank.cmp(&b.bank))
            .then_with(|| position(a).cmp(&position(b)))
    }

    fn sort_attacks(&self, logic: &Logic, attacks: &mut [AttackAction]) {
        attacks.sort_by(|lhs, rhs| {
            rhs.ignore_speed
                .cmp(&lhs.ignore_speed)
                .then_with(|| self.compare(logic, lhs.launcher, rhs.launcher))
        });
    }
}

/// Rank among non-attack actions; lower runs first.
fn class_rank(action: &Action, logic: &Logic) -> u8 {
    match action {
        Action::PreAttack { .. } => 0,
        Action::Flee { .. } => 1,
        Action::Attack(attack) if attack.pursuit_enabled && attack.skill(logic).flags.punishes_switch => 2,
        Action::Switch { .. } => 3,
        Action::Item { .. } => 4,
        Action::Mega { .. } => 5,
        Action::HighPriorityItem { .. } => 6,
        Action::Attack(_) => 7,
    }
}

fn trigger_for(logic: &mut Logic, id: BattlerId) -> Option<PriorityTrigger> {
    let battler = logic.get(id);
    let quick_draw = battler.has_ability("quickdraw");
    let item = battler.item.as_deref().and_then(held_item);
    let pinch = battler.hp_rate() <= 0.25;
    if quick_draw && logic.rng_mut().generic_chance(QUICK_DRAW_CHANCE) {
        return Some(PriorityTrigger::QuickDraw);
    }
    match item {
        Some(HeldItem::QuickClaw) if logic.rng_mut().generic_chance(QUICK_CLAW_CHANCE) => {
            Some(PriorityTrigger::QuickClaw)
        }
        Some(HeldItem::CustapBerry) if pinch => Some(PriorityTrigger::CustapBerry),
        _ => None,
    }
}

/// Orders one turn of actions, first to run first.
pub(crate) fn sort(logic: &mut Logic, submitted: Vec<Action>) -> Vec<Action> {
    if submitted.is_empty() {
        return submitted;
    }
    let (mut others, attacks): (Vec<Action>, Vec<Action>) = submitted
        .into_iter()
        .partition(|action| !matches!(action, Action::Attack(_)));

    let switching: Vec<BattlerId> = others
        .iter()
        .filter_map(|action| match action {
            Action::Switch { who, .. } => Some(*who),
            _ => None,
        })
        .collect();
    logic.set_switching(switching.clone());

    let mut tiers: BTreeMap<i8, Vec<AttackAction>> = BTreeMap::new();
    for action in attacks {
        let Action::Attack(mut attack) = action else {
            continue;
        };
        let departing = logic
            .battler(attack.target_bank, attack.target_position)
            .is_some_and(|target| switching.contains(&target.id));
        attack.pursuit_enabled = departing;
        let skill = attack.skill(logic);
        if departing && skill.flags.punishes_switch {
            others.push(Action::Attack(attack));
            continue;
        }
        tiers.entry(skill.priority).or_default().push(attack);
    }

    let order = SpeedOrder::new(logic);
    let mut sorted_attacks: Vec<AttackAction> = Vec::new();
    for (_, mut tier) in tiers.into_iter().rev() {
        order.sort_attacks(logic, &mut tier);
        for index in 1..tier.len() {
            let Some(trigger) = trigger_for(logic, tier[index].launcher) else {
                continue;
            };
            let mut fast = tier.remove(index);
            fast.ignore_speed = true;
            others.push(Action::HighPriorityItem {
                holder: fast.launcher,
                trigger,
            });
            tier.insert(0, fast);
            break;
        }
        sorted_attacks.extend(tier);
    }
    let logic: &Logic = logic;

    let charging: Vec<AttackAction> = sorted_attacks
        .iter()
        .filter(|attack| attack.skill(logic).flags.pre_attack)
        .cloned()
        .collect();
    if !charging.is_empty() {
        others.push(Action::PreAttack { attacks: charging });
    }

    others.sort_by(|lhs, rhs| {
        class_rank(lhs, logic).cmp(&class_rank(rhs, logic)).then_with(|| {
            match (lhs.actor(), rhs.actor()) {
                (Some(a), Some(b)) => order.compare(logic, a, b),
                _ => Ordering::Equal,
            }
        })
    });
    others.extend(sorted_attacks.into_iter().map(Action::Attack));
    others
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logic_with, onix, pikachu};

    fn attack(logic: &Logic, launcher: BattlerId, skill: usize) -> Action {
        Action::attack(launcher, skill, BattlerId::new(1 - launcher.bank, 0), logic)
    }

    fn launchers(actions: &[Action]) -> Vec<Option<BattlerId>> {
        actions.iter().map(Action::actor).collect()
    }

    #[test]
    fn higher_tier_moves_first_regardless_of_speed() {
        let mut logic = logic_with(vec![onix().with_skills(&["tackle", "quickattack"])], vec![pikachu()]);
        let slow = BattlerId::new(0, 0);
        let fast = BattlerId::new(1, 0);
        let actions = vec![attack(&logic, fast, 0), attack(&logic, slow, 1)];
        let sorted = sort(&mut logic, actions);
        assert_eq!(launchers(&sorted), vec![Some(slow), Some(fast)]);
    }

    #[test]
    fn speed_ties_go_to_the_lower_bank() {
        let mut logic = logic_with(vec![pikachu()], vec![pikachu()]);
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let actions = vec![attack(&logic, b, 0), attack(&logic, a, 0)];
        let sorted = sort(&mut logic, actions);
        assert_eq!(launchers(&sorted), vec![Some(a), Some(b)]);
    }

    #[test]
    fn trick_room_reverses_speed() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        logic.effects_mut().add(crate::effects::Effect::new(
            EffectKind::TrickRoom,
            Scope::Global,
            5,
        ));
        let (fast, slow) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let actions = vec![attack(&logic, fast, 0), attack(&logic, slow, 0)];
        let sorted = sort(&mut logic, actions);
        assert_eq!(launchers(&sorted), vec![Some(slow), Some(fast)]);
    }

    #[test]
    fn switches_run_before_attacks_and_pursuit_before_switches() {
        let mut logic = logic_with(
            vec![onix().with_skills(&["pursuit"])],
            vec![pikachu(), onix()],
        );
        let hunter = BattlerId::new(0, 0);
        let runner = BattlerId::new(1, 0);
        let actions = vec![
            Action::Switch {
                who: runner,
                with: BattlerId::new(1, 1),
            },
            attack(&logic, hunter, 0),
        ];
        let sorted = sort(&mut logic, actions);
        assert!(matches!(&sorted[0], Action::Attack(a) if a.pursuit_enabled && a.launcher == hunter));
        assert!(matches!(sorted[1], Action::Switch { .. }));
        assert!(logic.is_switching(runner));
    }

    #[test]
    fn focus_punch_gets_a_leading_announcement() {
        let mut logic = logic_with(vec![pikachu().with_skills(&["focuspunch"])], vec![onix()]);
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let actions = vec![attack(&logic, a, 0), attack(&logic, b, 0)];
        let sorted = sort(&mut logic, actions);
        assert!(matches!(&sorted[0], Action::PreAttack { attacks } if attacks.len() == 1));
        assert_eq!(launchers(&sorted[1..]), vec![Some(b), Some(a)]);
    }

    #[test]
    fn custap_berry_moves_the_holder_to_the_front() {
        let mut logic = logic_with(vec![pikachu()], vec![onix().with_item("custapberry")]);
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        let max = logic.get(b).max_hp;
        logic.get_mut(b).hp = max / 5;
        let actions = vec![attack(&logic, a, 0), attack(&logic, b, 0)];
        let sorted = sort(&mut logic, actions);
        assert!(matches!(
            sorted[0],
            Action::HighPriorityItem {
                trigger: PriorityTrigger::CustapBerry,
                ..
            }
        ));
        assert!(matches!(&sorted[1], Action::Attack(x) if x.launcher == b && x.ignore_speed));
    }
}
