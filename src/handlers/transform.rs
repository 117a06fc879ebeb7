use super::{Check, Permit, TransformHandler};
use crate::battler::BattlerId;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transform {
    pub launcher: BattlerId,
    pub target: BattlerId,
}

hook_point!(TransformPrevention: "transform" / "transform_prevention", Transform => Prevented);

impl TransformHandler<'_> {
    pub fn transform_appliable(&mut self, launcher: BattlerId, target: BattlerId) -> Check<Transform> {
        let source = self.logic.get(target);
        let user = self.logic.get(launcher);
        if launcher == target
            || source.dead()
            || !source.on_field()
            || source.transform.is_some()
            || user.transform.is_some()
        {
            return Err(Prevented::message("But it failed!"));
        }
        let mut transform = Transform { launcher, target };
        if let ControlFlow::Break(prevented) = exec_hooks::<TransformPrevention>(self.logic, &mut transform) {
            return Err(prevented);
        }
        Ok(Permit::new(transform))
    }

    /// Copies species, types, stats, stages, ability and skills of the target.
    pub fn transform(&mut self, permit: Permit<Transform>) {
        let Transform { launcher, target } = permit.into_inner();
        let source = self.logic.get(target).clone();
        let user = self.logic.get_mut(launcher);
        user.apply_transform(&source);
        let name = user.name.clone();
        self.logic.visual().refresh_info_bar(launcher);
        self.logic
            .display_message(&format!("{name} transformed into {}!", source.species));
    }

    pub fn transform_with_process(&mut self, launcher: BattlerId, target: BattlerId) -> bool {
        match self.transform_appliable(launcher, target) {
            Ok(permit) => {
                self.transform(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, onix, pikachu};
    use crate::types::Type;

    #[test]
    fn transform_copies_and_cannot_stack() {
        let mut logic = duel(pikachu(), onix());
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        assert!(logic.transform_handler().transform_with_process(user, target));
        let b = logic.get(user);
        assert_eq!(b.types, [Type::Rock, Type::Ground]);
        assert!(b.has_ability("rockhead"));
        assert_ne!(b.hp, 0);
        assert!(!logic.transform_handler().transform_with_process(user, target));
    }
}
