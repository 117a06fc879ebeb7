use crate::handlers::catch::{BallBlocked, CatchAttempt, CatchValue, SpecialCatchRateModifier};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::logic::Logic;
use std::ops::ControlFlow;

/// Levels below this get an easier capture.
const LOW_LEVEL_CAP: u8 = 21;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<BallBlocked, _>("catching disabled", catching_disabled);
    registry.register::<BallBlocked, _>("trainer owned", trainer_owned);
    registry.register::<BallBlocked, _>("uncatchable", uncatchable);
    registry.register::<SpecialCatchRateModifier, _>("low level", low_level);
}

fn catching_disabled(logic: &mut Logic, _: &mut CatchAttempt) -> ControlFlow<Prevented> {
    if logic.env().catching_disabled {
        return veto("It's not possible to catch this one!");
    }
    ControlFlow::Continue(())
}

fn trainer_owned(logic: &mut Logic, attempt: &mut CatchAttempt) -> ControlFlow<Prevented> {
    if logic.info().trainer_battle() && !attempt.ball.allows_trainer_catch() {
        return veto("The trainer blocked the ball! Don't be a thief!");
    }
    ControlFlow::Continue(())
}

fn uncatchable(logic: &mut Logic, attempt: &mut CatchAttempt) -> ControlFlow<Prevented> {
    if logic.get(attempt.target).creature().rareness == 0 {
        return veto("It dodged the thrown ball! This creature can't be caught!");
    }
    ControlFlow::Continue(())
}

fn low_level(logic: &mut Logic, value: &mut CatchValue) -> ControlFlow<()> {
    let level = logic.get(value.attempt.target).level;
    if level < LOW_LEVEL_CAP {
        value.value *= f64::from(30 - level) / 10.0;
    }
    ControlFlow::Continue(())
}
