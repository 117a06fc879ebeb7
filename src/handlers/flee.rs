use super::switch::SwitchReason;
use super::FleeHandler;
use crate::battler::BattlerId;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::logic::BattleOutcome;
use crate::rng::Stream;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FleeAttempt {
    pub who: BattlerId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FleeOutcome {
    /// Fleeing is impossible here; the attempt still counts.
    Blocked,
    Failed,
    Escaped,
}

hook_point!(FleeBlock: "flee" / "flee_block", FleeAttempt => Prevented);
hook_point!(
    /// Breaking guarantees the escape.
    FleePassthrough: "flee" / "flee_passthrough", FleeAttempt => ()
);

/// Escape odds out of 256, `None` meaning a guaranteed escape.
pub fn flee_odds(speed: u32, foe_speed: u32, attempts: u32) -> Option<u32> {
    if speed > foe_speed {
        return None;
    }
    let divisor = (foe_speed / 4).max(1);
    Some(speed * 32 / divisor + 30 * attempts)
}

impl FleeHandler<'_> {
    pub fn attempt(&mut self, who: BattlerId) -> FleeOutcome {
        let mut attempt = FleeAttempt { who };
        let attempts = self.logic.flee_attempts();
        self.logic.count_flee_attempt();
        if let ControlFlow::Break(prevented) = exec_hooks::<FleeBlock>(self.logic, &mut attempt) {
            prevented.play(self.logic);
            return FleeOutcome::Blocked;
        }

        if exec_hooks::<FleePassthrough>(self.logic, &mut attempt).is_break() {
            return self.escape();
        }
        if let Err(prevented) = self.logic.switch_handler().can_switch(who, SwitchReason::Flee) {
            prevented.play(self.logic);
            return FleeOutcome::Failed;
        }
        let speed = self.logic.get(who).stats.spd as u32;
        let foe_speed = self
            .logic
            .foes_of(who)
            .into_iter()
            .map(|foe| self.logic.get(foe).stats.spd as u32)
            .max()
            .unwrap_or(0);
        match flee_odds(speed, foe_speed, attempts) {
            None => self.escape(),
            Some(odds) => {
                if self.logic.rng_mut().rand(Stream::Generic, 256) < odds {
                    self.escape()
                } else {
                    self.logic.display_message("You couldn't get away!");
                    FleeOutcome::Failed
                }
            }
        }
    }

    fn escape(&mut self) -> FleeOutcome {
        self.logic.display_message("You got away safely!");
        self.logic.set_battle_result(BattleOutcome::Fled);
        FleeOutcome::Escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faster_runner_always_escapes() {
        assert_eq!(flee_odds(101, 100, 0), None);
        assert_eq!(flee_odds(100, 100, 0), Some(128));
    }

    #[test]
    fn every_attempt_adds_thirty() {
        assert_eq!(flee_odds(50, 100, 0), Some(64));
        assert_eq!(flee_odds(50, 100, 2), Some(124));
    }
}
