use super::{Check, Permit, StatChangeHandler};
use crate::battler::{BattlerId, Stat, MAX_STAGE, MIN_STAGE};
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatChange {
    pub stat: Stat,
    pub power: i8,
    pub target: BattlerId,
    pub launcher: Option<BattlerId>,
    pub skill: Option<&'static str>,
}

impl StatChange {
    pub fn new(stat: Stat, power: i8, target: BattlerId) -> Self {
        Self {
            stat,
            power,
            target,
            launcher: None,
            skill: None,
        }
    }

    pub fn by(mut self, launcher: BattlerId, skill: Option<&'static str>) -> Self {
        self.launcher = Some(launcher);
        self.skill = skill;
        self
    }
}

hook_point!(
    /// May veto or rewrite `power`.
    StatChangePrevention: "stat_change" / "stat_change_prevention", StatChange => Prevented
);
hook_point!(
    /// Runs after a stage moved; the second field is the amount actually applied.
    PostStatChange: "stat_change" / "post_stat_change", (StatChange, i8) => ()
);

fn change_text(power: i8) -> &'static str {
    match power {
        i8::MIN..=-3 => "severely fell",
        -2 => "harshly fell",
        -1 => "fell",
        0 => "didn't change",
        1 => "rose",
        2 => "rose sharply",
        _ => "rose drastically",
    }
}

impl StatChangeHandler<'_> {
    pub fn stat_change_appliable(&mut self, mut change: StatChange) -> Check<StatChange> {
        let target = self.logic.get(change.target);
        if target.dead() {
            return Err(Prevented::silent());
        }
        if let ControlFlow::Break(prevented) = exec_hooks::<StatChangePrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        // The chain may have flipped or scaled the power.
        let target = self.logic.get(change.target);
        let stage = target.stat_stage(change.stat);
        let name = target.name.clone();
        if change.power > 0 && stage >= MAX_STAGE {
            return Err(Prevented::message(format!(
                "{name}'s {} won't go any higher!",
                change.stat.display()
            )));
        }
        if change.power < 0 && stage <= MIN_STAGE {
            return Err(Prevented::message(format!(
                "{name}'s {} won't go any lower!",
                change.stat.display()
            )));
        }
        Ok(Permit::new(change))
    }

    /// Applies the change and returns the stage delta actually applied.
    pub fn stat_change(&mut self, permit: Permit<StatChange>) -> i8 {
        let change = permit.into_inner();
        let target = self.logic.get_mut(change.target);
        let before = target.stat_stage(change.stat);
        let after = (before as i16 + change.power as i16).clamp(MIN_STAGE as i16, MAX_STAGE as i16) as i8;
        target.set_stat_stage(change.stat, after);
        let applied = after - before;
        let name = target.name.clone();
        self.logic
            .visual()
            .stat_animation(change.target, change.stat, applied);
        let ident = self.logic.ident(change.target);
        self.logic.logger_mut().log_boost(&ident, change.stat.id(), applied);
        self.logic.display_message(&format!(
            "{name}'s {} {}!",
            change.stat.display(),
            change_text(applied)
        ));
        let mut done = (change, applied);
        let _ = exec_hooks::<PostStatChange>(self.logic, &mut done);
        applied
    }

    /// Check then apply; a veto plays its reason and yields 0.
    pub fn stat_change_with_process(&mut self, change: StatChange) -> i8 {
        match self.stat_change_appliable(change) {
            Ok(permit) => self.stat_change(permit),
            Err(prevented) => {
                prevented.play(self.logic);
                0
            }
        }
    }

    pub fn reset_stats(&mut self, target: BattlerId) {
        let battler = self.logic.get_mut(target);
        battler.reset_stages();
        let name = battler.name.clone();
        self.logic.visual().refresh_info_bar(target);
        self.logic
            .display_message(&format!("{name}'s stat changes were removed!"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, pikachu};

    #[test]
    fn stages_clamp_at_six() {
        let mut logic = duel(pikachu(), pikachu());
        let target = BattlerId::new(0, 0);
        let mut total = 0;
        for _ in 0..4 {
            total += logic
                .stat_change_handler()
                .stat_change_with_process(StatChange::new(Stat::Atk, 2, target));
        }
        assert_eq!(total, 6);
        assert_eq!(logic.get(target).stat_stage(Stat::Atk), MAX_STAGE);
        assert!(logic
            .logger()
            .messages()
            .any(|m| m == "Pikachu's Attack won't go any higher!"));
    }

    #[test]
    fn applied_amount_can_be_smaller_than_requested() {
        let mut logic = duel(pikachu(), pikachu());
        let target = BattlerId::new(1, 0);
        logic.get_mut(target).set_stat_stage(Stat::Dfe, -5);
        let applied = logic
            .stat_change_handler()
            .stat_change_with_process(StatChange::new(Stat::Dfe, -2, target));
        assert_eq!(applied, -1);
        assert_eq!(logic.get(target).stat_stage(Stat::Dfe), MIN_STAGE);
    }

    #[test]
    fn reset_clears_every_stage() {
        let mut logic = duel(pikachu(), pikachu());
        let target = BattlerId::new(0, 0);
        logic.get_mut(target).set_stat_stage(Stat::Spd, 3);
        logic.get_mut(target).set_stat_stage(Stat::Eva, -2);
        logic.stat_change_handler().reset_stats(target);
        assert_eq!(logic.get(target).stages(), [0; 7]);
    }
}
