use super::{Action, AttackAction, PriorityTrigger};
use crate::battler::BattlerId;
use crate::creature::StatsSet;
use crate::effects::{Effect, EffectKind, Scope};
use crate::handlers::damage::HpChange;
use crate::handlers::stat::StatChange;
use crate::handlers::switch::SwitchReason;
use crate::items::{item_kind, item_name, ItemKind};
use crate::logic::Logic;
use crate::skills::{self, SkillTarget, SkillUse};

/// Stage boost given by X items.
const X_ITEM_POWER: i8 = 2;

pub(crate) fn execute(logic: &mut Logic, action: Action) {
    tracing::trace!(?action, "executing");
    match action {
        Action::Attack(attack) => attack_with(logic, attack),
        Action::PreAttack { attacks } => {
            for attack in attacks {
                let battler = logic.get(attack.launcher);
                if battler.dead() || !battler.on_field() {
                    continue;
                }
                let name = battler.name.clone();
                logic.effects_mut().add_unique(Effect::new(
                    EffectKind::Focus,
                    Scope::Battler(attack.launcher),
                    1,
                ));
                logic.display_message(&format!("{name} is tightening its focus!"));
            }
        }
        Action::HighPriorityItem { holder, trigger } => {
            if logic.get(holder).dead() {
                return;
            }
            let name = logic.get(holder).name.clone();
            let text = match trigger {
                PriorityTrigger::QuickDraw => format!("{name}'s Quick Draw let it move first!"),
                PriorityTrigger::QuickClaw => format!("{name}'s Quick Claw let it move first!"),
                PriorityTrigger::CustapBerry => {
                    if logic.item_change_handler().consume_item(holder).is_none() {
                        return;
                    }
                    format!("{name} can act faster than normal, thanks to its Custap Berry!")
                }
            };
            logic.display_message(&text);
        }
        Action::Switch { who, with } => {
            let (outgoing, entering) = (logic.get(who), logic.get(with));
            if outgoing.dead() || !outgoing.on_field() || entering.dead() || entering.on_field() {
                return;
            }
            match logic.switch_handler().can_switch(who, SwitchReason::Voluntary) {
                Ok(_) => logic.switch_handler().execute_switch(Some(who), with, false),
                Err(prevented) => prevented.play(logic),
            }
        }
        Action::Item { user, item, target } => use_bag_item(logic, user, &item, target),
        Action::Flee { target } => {
            logic.flee_handler().attempt(target);
        }
        Action::Mega { user } => mega_evolve(logic, user),
    }
}

fn attack_with(logic: &mut Logic, attack: AttackAction) {
    let launcher = logic.get(attack.launcher);
    if launcher.dead() || !launcher.on_field() || attack.skill_index >= launcher.skills.len() {
        return;
    }
    let skill = attack.skill(logic);
    let targets = match skill.target {
        SkillTarget::Foe => {
            let chosen = logic
                .battler(attack.target_bank, attack.target_position)
                .filter(|b| b.alive() && b.id.bank != attack.launcher.bank)
                .map(|b| b.id);
            chosen
                .or_else(|| logic.adjacent_foes_of(attack.launcher).first().copied())
                .into_iter()
                .collect()
        }
        SkillTarget::AllFoes => logic.adjacent_foes_of(attack.launcher),
        SkillTarget::User => vec![attack.launcher],
        SkillTarget::Field => Vec::new(),
    };
    skills::use_skill(
        logic,
        SkillUse {
            launcher: attack.launcher,
            slot: attack.skill_index,
            targets,
            pursuit: attack.pursuit_enabled,
        },
    );
}

fn use_bag_item(logic: &mut Logic, user: BattlerId, item: &str, target: BattlerId) {
    if !logic.take_from_bag(user, item) {
        return;
    }
    let Some(kind) = item_kind(item) else {
        return;
    };
    if let ItemKind::Ball(_) = kind {
        logic.catch_handler().try_to_catch(target, user, item);
        return;
    }
    let trainer = logic
        .info()
        .names
        .get(user.bank)
        .and_then(|names| names.get(logic.get(user).party_id))
        .cloned()
        .unwrap_or_default();
    logic.display_message(&format!("{trainer} used the {}!", item_name(item)));
    let battler = logic.get(target);
    let name = battler.name.clone();
    let missing = battler.max_hp - battler.hp;
    let effective = match kind {
        ItemKind::Heal(amount) => {
            let amount = if amount == 0 { missing } else { amount };
            let healed = logic.damage_handler().heal_with_process(HpChange::new(amount, target));
            if healed > 0 {
                logic.display_message(&format!("{name}'s HP was restored by {healed} point(s)."));
            }
            healed > 0
        }
        ItemKind::FullRestore => {
            let healed = logic.damage_handler().heal_with_process(HpChange::new(missing, target));
            let cured = logic.status_change_handler().cure(target);
            let calmed = logic.status_change_handler().confuse_cure(target);
            healed > 0 || cured || calmed
        }
        ItemKind::StatusCure(wanted) => {
            let current = logic.get(target).status;
            let matches = match (wanted, current) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(wanted), Some(current)) => wanted == current || (wanted.is_poison() && current.is_poison()),
            };
            let cured = matches && logic.status_change_handler().cure(target);
            let calmed = wanted.is_none() && logic.status_change_handler().confuse_cure(target);
            cured || calmed
        }
        ItemKind::XItem(stat) => {
            let change = StatChange::new(stat, X_ITEM_POWER, target);
            logic.stat_change_handler().stat_change_with_process(change) != 0
        }
        ItemKind::Ball(_) | ItemKind::Held(_) | ItemKind::MegaStone => false,
    };
    if !effective {
        logic.display_message("But it had no effect.");
    }
}

/// Alive on the field, holding its own mega stone, and the bank has not mega
/// evolved yet this battle.
pub fn can_mega_evolve(logic: &Logic, id: BattlerId) -> bool {
    let battler = logic.get(id);
    battler.alive()
        && battler.on_field()
        && !battler.mega_evolved
        && !logic.mega_used(id.bank)
        && battler
            .creature()
            .mega
            .as_ref()
            .is_some_and(|mega| battler.item.as_deref() == Some(crate::normalize_id(&mega.stone).as_str()))
}

fn mega_evolve(logic: &mut Logic, id: BattlerId) {
    if !can_mega_evolve(logic, id) {
        return;
    }
    let battler = logic.get_mut(id);
    let Some(mega) = battler.creature().mega.clone() else {
        return;
    };
    let lost = battler.max_hp.saturating_sub(battler.hp);
    let stats = StatsSet::from_base(mega.base_stats, battler.creature().ivs, battler.level);
    battler.stats = stats;
    battler.max_hp = stats.hp;
    battler.hp = stats.hp.saturating_sub(lost).max(1);
    if let Some(types) = mega.types.as_deref() {
        battler.types = match types {
            [only] => [*only, *only],
            [first, second, ..] => [*first, *second],
            [] => battler.types,
        };
    }
    if let Some(ability) = mega.ability.as_deref() {
        let ability = crate::normalize_id(ability);
        battler.ability = ability.clone();
        battler.original_ability = ability;
        battler.refresh_ability_effect();
    }
    battler.mega_evolved = true;
    battler.form = 1;
    let name = battler.name.clone();
    logic.mark_mega_used(id.bank);
    logic.visual().refresh_info_bar(id);
    logic.display_message(&format!("{name} has Mega Evolved!"));
    logic.ability_change_handler().on_entry(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{BaseStats, MegaData, Status};
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn potion_heals_and_spends_stock() {
        let mut player = pikachu();
        player.hp = Some(10);
        let mut logic = logic_with(vec![player], vec![onix()]);
        logic.info_mut().bags[0][0].insert("potion".to_string(), 1);
        let user = BattlerId::new(0, 0);
        execute(
            &mut logic,
            Action::Item {
                user,
                item: "potion".to_string(),
                target: user,
            },
        );
        assert_eq!(logic.get(user).hp, 30);
        assert_eq!(logic.bag_count(user, "potion"), 0);
    }

    #[test]
    fn antidote_does_not_cure_a_burn() {
        let mut player = pikachu();
        player.status = Some(Status::Burn);
        let mut logic = logic_with(vec![player], vec![onix()]);
        logic.info_mut().bags[0][0].insert("antidote".to_string(), 1);
        let user = BattlerId::new(0, 0);
        execute(
            &mut logic,
            Action::Item {
                user,
                item: "antidote".to_string(),
                target: user,
            },
        );
        assert_eq!(logic.get(user).status, Some(Status::Burn));
        assert!(logic.logger().messages().any(|m| m == "But it had no effect."));
    }

    #[test]
    fn mega_evolution_is_once_per_bank() {
        let mut gengar = pikachu().with_item("gengarite");
        gengar.mega = Some(MegaData {
            stone: "gengarite".to_string(),
            base_stats: BaseStats {
                hp: 60,
                atk: 65,
                dfe: 80,
                ats: 170,
                dfs: 95,
                spd: 130,
            },
            ability: Some("shadowtag".to_string()),
            types: None,
        });
        let mut logic = logic_with(vec![gengar], vec![onix()]);
        let user = BattlerId::new(0, 0);
        assert!(can_mega_evolve(&logic, user));
        execute(&mut logic, Action::Mega { user });
        let battler = logic.get(user);
        assert!(battler.mega_evolved);
        assert!(battler.has_ability("shadowtag"));
        assert!(!can_mega_evolve(&logic, user));
    }
}
