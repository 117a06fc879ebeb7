use crate::handlers::flee::{FleeAttempt, FleeBlock, FleePassthrough};
use crate::hooks::{veto, HookRegistry, Prevented};
use crate::items::{held_item, HeldItem};
use crate::logic::Logic;
use crate::types::Type;
use std::ops::ControlFlow;

pub(super) fn register(registry: &mut HookRegistry) {
    registry.register::<FleeBlock, _>("trainer battle", trainer_battle);
    registry.register::<FleePassthrough, _>("smoke ball", smoke_ball);
    registry.register::<FleePassthrough, _>("run away", run_away);
    registry.register::<FleePassthrough, _>("ghost type", ghost_type);
}

fn trainer_battle(logic: &mut Logic, _: &mut FleeAttempt) -> ControlFlow<Prevented> {
    if logic.info().trainer_battle() {
        return veto("No! There's no running from a trainer battle!");
    }
    ControlFlow::Continue(())
}

fn smoke_ball(logic: &mut Logic, attempt: &mut FleeAttempt) -> ControlFlow<()> {
    let runner = logic.get(attempt.who);
    if runner.item.as_deref().and_then(held_item) == Some(HeldItem::SmokeBall) {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

fn run_away(logic: &mut Logic, attempt: &mut FleeAttempt) -> ControlFlow<()> {
    if logic.get(attempt.who).has_ability("runaway") {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

fn ghost_type(logic: &mut Logic, attempt: &mut FleeAttempt) -> ControlFlow<()> {
    if logic.get(attempt.who).has_type(Type::Ghost) {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}
