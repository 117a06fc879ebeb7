use super::{Check, Permit, StatusChangeHandler};
use crate::battler::BattlerId;
use crate::creature::Status;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use crate::skills::SkillData;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StatusChange {
    Poison,
    Toxic,
    Paralysis,
    Burn,
    Sleep,
    Freeze,
    Confusion,
    Flinch,
    /// Removes the primary status.
    Cure,
    ConfuseCure,
}

impl StatusChange {
    pub fn primary(self) -> Option<Status> {
        match self {
            StatusChange::Poison => Some(Status::Poison),
            StatusChange::Toxic => Some(Status::Toxic),
            StatusChange::Paralysis => Some(Status::Paralysis),
            StatusChange::Burn => Some(Status::Burn),
            StatusChange::Sleep => Some(Status::Sleep),
            StatusChange::Freeze => Some(Status::Freeze),
            _ => None,
        }
    }

    pub fn is_poison(self) -> bool {
        matches!(self, StatusChange::Poison | StatusChange::Toxic)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StatusAttempt {
    pub status: StatusChange,
    pub target: BattlerId,
    pub launcher: Option<BattlerId>,
    pub skill: Option<&'static SkillData>,
}

impl StatusAttempt {
    pub fn new(status: StatusChange, target: BattlerId) -> Self {
        Self {
            status,
            target,
            launcher: None,
            skill: None,
        }
    }

    pub fn by(mut self, launcher: BattlerId, skill: Option<&'static SkillData>) -> Self {
        self.launcher = Some(launcher);
        self.skill = skill;
        self
    }

    /// Whether the attempt comes from another battler's skill.
    pub fn from_foe_skill(&self) -> bool {
        self.skill.is_some() && self.launcher.is_some_and(|l| l != self.target)
    }
}

hook_point!(StatusPrevention: "status_change" / "status_prevention", StatusAttempt => Prevented);
hook_point!(PostStatusChange: "status_change" / "post_status_change", StatusAttempt => ());

impl StatusChangeHandler<'_> {
    pub fn status_appliable(&mut self, mut attempt: StatusAttempt) -> Check<StatusAttempt> {
        let target = self.logic.get(attempt.target);
        if target.dead() {
            return Err(Prevented::silent());
        }
        let name = target.name.clone();
        match attempt.status {
            StatusChange::Cure => {
                if target.status.is_none() {
                    return Err(Prevented::silent());
                }
                return Ok(Permit::new(attempt));
            }
            StatusChange::ConfuseCure => {
                if !target.is_confused() {
                    return Err(Prevented::silent());
                }
                return Ok(Permit::new(attempt));
            }
            StatusChange::Confusion => {
                if target.is_confused() {
                    return Err(Prevented::message(format!("{name} is already confused!")));
                }
            }
            StatusChange::Flinch => {
                let acts_later = attempt
                    .launcher
                    .is_some_and(|launcher| self.logic.attack_after(attempt.target, launcher));
                if target.flinch || !acts_later {
                    return Err(Prevented::silent());
                }
            }
            primary => {
                if let Some(current) = target.status {
                    let text = if primary.primary() == Some(current)
                        || (primary.is_poison() && current.is_poison())
                    {
                        format!("{name} is already {}!", status_adjective(current))
                    } else {
                        "But it failed!".to_string()
                    };
                    return Err(Prevented::message(text));
                }
            }
        }
        if let ControlFlow::Break(prevented) = exec_hooks::<StatusPrevention>(self.logic, &mut attempt) {
            return Err(prevented);
        }
        Ok(Permit::new(attempt))
    }

    pub fn status_change(&mut self, permit: Permit<StatusAttempt>) {
        let mut attempt = permit.into_inner();
        let id = attempt.target;
        let ident = self.logic.ident(id);
        let name = self.logic.get(id).name.clone();
        match attempt.status {
            StatusChange::Confusion => {
                let turns = self.logic.rng_mut().generic_range(2, 5) as u8;
                self.logic.get_mut(id).confusion = turns;
                self.logic.display_message(&format!("{name} became confused!"));
            }
            StatusChange::ConfuseCure => {
                self.logic.get_mut(id).confusion = 0;
                self.logic
                    .display_message(&format!("{name} snapped out of its confusion!"));
            }
            StatusChange::Flinch => {
                self.logic.get_mut(id).flinch = true;
            }
            StatusChange::Cure => {
                let battler = self.logic.get_mut(id);
                let previous = battler.status.take();
                battler.status_count = 0;
                if let Some(previous) = previous {
                    self.logic.logger_mut().log_cure(&ident, previous.name());
                    self.logic.display_message(&cure_text(&name, previous));
                }
                self.logic.visual().status_animation(id, None);
            }
            primary => {
                let Some(status) = primary.primary() else {
                    return;
                };
                let count = match status {
                    Status::Sleep => self.logic.rng_mut().generic_range(2, 4) as u8,
                    _ => 0,
                };
                let battler = self.logic.get_mut(id);
                battler.status = Some(status);
                battler.status_count = count;
                self.logic.logger_mut().log_status(&ident, status.name());
                self.logic.visual().status_animation(id, Some(status));
                self.logic
                    .display_message(&format!("{name} {}", inflict_text(status)));
            }
        }
        self.logic.visual().refresh_info_bar(id);
        let _ = exec_hooks::<PostStatusChange>(self.logic, &mut attempt);
    }

    /// Check then apply; returns whether the status landed.
    pub fn status_change_with_process(&mut self, attempt: StatusAttempt) -> bool {
        match self.status_appliable(attempt) {
            Ok(permit) => {
                self.status_change(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }

    /// Status application that stays quiet on failure (secondary effects).
    pub fn status_change_silently(&mut self, attempt: StatusAttempt) -> bool {
        match self.status_appliable(attempt) {
            Ok(permit) => {
                self.status_change(permit);
                true
            }
            Err(_) => false,
        }
    }

    pub fn cure(&mut self, target: BattlerId) -> bool {
        self.status_change_silently(StatusAttempt::new(StatusChange::Cure, target))
    }

    pub fn confuse_cure(&mut self, target: BattlerId) -> bool {
        self.status_change_silently(StatusAttempt::new(StatusChange::ConfuseCure, target))
    }
}

fn status_adjective(status: Status) -> &'static str {
    match status {
        Status::Poison | Status::Toxic => "poisoned",
        Status::Paralysis => "paralyzed",
        Status::Burn => "burned",
        Status::Sleep => "asleep",
        Status::Freeze => "frozen",
    }
}

fn inflict_text(status: Status) -> &'static str {
    match status {
        Status::Poison => "was poisoned!",
        Status::Toxic => "was badly poisoned!",
        Status::Paralysis => "is paralyzed! It may be unable to move!",
        Status::Burn => "was burned!",
        Status::Sleep => "fell asleep!",
        Status::Freeze => "was frozen solid!",
    }
}

fn cure_text(name: &str, status: Status) -> String {
    match status {
        Status::Poison | Status::Toxic => format!("{name} was cured of its poisoning."),
        Status::Paralysis => format!("{name} was cured of paralysis."),
        Status::Burn => format!("{name}'s burn was healed."),
        Status::Sleep => format!("{name} woke up!"),
        Status::Freeze => format!("{name} thawed out!"),
    }
}
