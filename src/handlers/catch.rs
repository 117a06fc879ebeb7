use super::CatchHandler;
use crate::battler::{Battler, BattlerId};
use crate::creature::Status;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::items::{ball_kind, item_name, BallKind};
use crate::logic::{BattleOutcome, Logic};
use crate::rng::Stream;
use crate::types::Type;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatchAttempt {
    pub target: BattlerId,
    pub ally: BattlerId,
    pub ball: BallKind,
}

/// Catch value after the ball was applied; rules may rewrite `value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatchValue {
    pub attempt: CatchAttempt,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatchResult {
    pub caught: bool,
    pub bounces: u8,
    pub critical: bool,
}

hook_point!(BallBlocked: "catch" / "ball_blocked", CatchAttempt => Prevented);
hook_point!(
    /// Last word on the catch value before the capture rolls.
    SpecialCatchRateModifier: "catch" / "special_rate_modifier", CatchValue => ()
);

/// Rate and bonus given by a ball. Master Ball returns `None`: guaranteed.
fn ball_rate(ball: BallKind, logic: &Logic, target: &Battler, ally: &Battler) -> Option<(f64, f64)> {
    let rate = target.creature().rareness as f64;
    let bonus = match ball {
        BallKind::Master => return None,
        BallKind::Poke | BallKind::Premier | BallKind::Snag => 1.0,
        BallKind::Great | BallKind::Safari => 1.5,
        BallKind::Ultra => 2.0,
        BallKind::Net => {
            if target.has_type(Type::Water) || target.has_type(Type::Bug) {
                3.5
            } else {
                1.0
            }
        }
        BallKind::Dive => {
            if logic.env().near_water || logic.env().fishing {
                3.5
            } else {
                1.0
            }
        }
        BallKind::Nest => ((41.0 - target.level as f64) / 10.0).max(1.0),
        BallKind::Repeat => {
            if logic.env().has_caught(&target.species) {
                3.5
            } else {
                1.0
            }
        }
        BallKind::Timer => (1.0 + logic.turn() as f64 * 1229.0 / 4096.0).min(4.0),
        BallKind::Quick => {
            if logic.turn() == 0 {
                5.0
            } else {
                1.0
            }
        }
        BallKind::Dusk => {
            if logic.env().cave_or_night {
                3.0
            } else {
                1.0
            }
        }
        BallKind::Level => {
            let (mine, theirs) = (ally.level as u32, target.level as u32);
            if mine >= theirs * 4 {
                8.0
            } else if mine >= theirs * 2 {
                4.0
            } else if mine > theirs {
                2.0
            } else {
                1.0
            }
        }
        BallKind::Lure => {
            if logic.env().fishing {
                5.0
            } else {
                1.0
            }
        }
        BallKind::Heavy => {
            let weight = target.creature().weight;
            let modifier = if weight < 100.0 {
                -20.0
            } else if weight < 200.0 {
                0.0
            } else if weight < 300.0 {
                20.0
            } else {
                30.0
            };
            return Some(((rate + modifier).max(1.0), 1.0));
        }
        BallKind::Fast => {
            if target.creature().base_stats.spd >= 100 {
                4.0
            } else {
                1.0
            }
        }
    };
    Some((rate, bonus))
}

pub fn status_multiplier(status: Option<Status>) -> f64 {
    match status {
        Some(Status::Sleep | Status::Freeze) => 2.5,
        Some(_) => 1.5,
        None => 1.0,
    }
}

/// `floor(((3M - 2H) * rate * bonus) / (3M) * status)`.
pub fn catch_value(max_hp: u16, hp: u16, rate: f64, bonus: f64, status: f64) -> f64 {
    let max_hp = max_hp.max(1) as f64;
    let hp = hp as f64;
    (((3.0 * max_hp - 2.0 * hp) * rate * bonus) / (3.0 * max_hp) * status).floor()
}

/// Per-bounce success threshold out of 65536.
pub fn bounce_threshold(value: f64) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    (65536.0 / (255.0 / value).powf(0.1875)).floor() as u32
}

pub fn critical_multiplier(unique_captures: u32) -> f64 {
    match unique_captures {
        601.. => 2.5,
        451..=600 => 2.0,
        301..=450 => 1.5,
        151..=300 => 1.0,
        31..=150 => 0.5,
        _ => 0.0,
    }
}

fn bounce_text(bounces: u8) -> &'static str {
    match bounces {
        0 => "Oh no! The creature broke free!",
        1 => "Aww! It appeared to be caught!",
        2 => "Aargh! Almost had it!",
        _ => "Gah! It was so close, too!",
    }
}

impl CatchHandler<'_> {
    /// Throws `ball` at `target`. The ball is consumed by the caller whatever
    /// the outcome.
    pub fn try_to_catch(&mut self, target: BattlerId, ally: BattlerId, ball: &str) -> CatchResult {
        let missed = CatchResult {
            caught: false,
            bounces: 0,
            critical: false,
        };
        let Some(kind) = ball_kind(ball) else {
            return missed;
        };
        let mut attempt = CatchAttempt {
            target,
            ally,
            ball: kind,
        };
        let thrower = self.logic.info().names[ally.bank]
            .first()
            .cloned()
            .unwrap_or_else(|| "You".to_string());
        self.logic
            .display_message(&format!("{thrower} used one {}!", item_name(ball)));
        if let ControlFlow::Break(prevented) = exec_hooks::<BallBlocked>(self.logic, &mut attempt) {
            prevented.play(self.logic);
            return missed;
        }

        let target_battler = self.logic.get(target);
        let value = match ball_rate(kind, self.logic, target_battler, self.logic.get(ally)) {
            Some((rate, bonus)) => catch_value(
                target_battler.max_hp,
                target_battler.hp,
                rate,
                bonus,
                status_multiplier(target_battler.status),
            ),
            None => 255.0,
        };
        let mut value = CatchValue { attempt, value };
        let _ = exec_hooks::<SpecialCatchRateModifier>(self.logic, &mut value);
        let a = value.value.max(0.0);

        // A guaranteed catch always shakes four times and never goes critical.
        let guaranteed = a >= 255.0;
        let critical = !guaranteed && {
            let multiplier = critical_multiplier(self.logic.env().unique_captures);
            let c = (a * multiplier / 6.0).floor() as u32;
            self.logic.rng_mut().rand(Stream::Generic, 255) < c
        };

        let bounces = if guaranteed {
            4
        } else if critical {
            1
        } else {
            let threshold = bounce_threshold(a);
            let mut bounces = 0;
            while bounces < 4 && self.logic.rng_mut().rand(Stream::Generic, 65535) < threshold {
                bounces += 1;
            }
            bounces
        };
        let caught = critical || bounces == 4;
        self.logic
            .visual()
            .catch_animation(target, ball, bounces, caught);
        tracing::debug!(value = a, bounces, critical, caught, "catch attempt");

        if caught {
            self.on_caught(target);
        } else {
            self.logic.display_message(bounce_text(bounces));
        }
        CatchResult {
            caught,
            bounces,
            critical,
        }
    }

    fn on_caught(&mut self, target: BattlerId) {
        let battler = self.logic.get(target);
        let name = battler.name.clone();
        let species = battler.species.clone();
        self.logic
            .display_message(&format!("Gotcha! {name} was caught!"));
        let env = self.logic.env_mut();
        if env.caught_species.insert(species.clone()) {
            env.unique_captures += 1;
        }
        env.seen_species.insert(species);
        self.logic.set_caught(target);
        self.logic.set_battle_result(BattleOutcome::Caught);
    }
}
