//! Presentation collaborators. The engine only calls them; it never waits on
//! anything but their return.

use crate::battler::{BattlerId, Stat};
use crate::creature::Status;

/// Animation sink. Every method is a no-op by default.
pub trait Visual {
    fn hp_animation(&mut self, _target: BattlerId, _from: u16, _to: u16) {}
    fn stat_animation(&mut self, _target: BattlerId, _stat: Stat, _amount: i8) {}
    fn status_animation(&mut self, _target: BattlerId, _status: Option<Status>) {}
    fn refresh_info_bar(&mut self, _target: BattlerId) {}
    fn switch_animation(&mut self, _out: Option<BattlerId>, _entering: BattlerId) {}
    fn catch_animation(&mut self, _target: BattlerId, _ball: &str, _bounces: u8, _caught: bool) {}
    fn exp_distribution(&mut self, _gains: &[(BattlerId, u32)]) {}
    fn wait_for_animations(&mut self) {}
}

pub trait Scene {
    fn display_message(&mut self, message: &str);

    /// Shows a message with choices and returns the picked index.
    fn display_message_with_choice(&mut self, message: &str, choices: &[&str]) -> usize;

    fn visual(&mut self) -> &mut dyn Visual;
}

#[derive(Debug, Default)]
pub struct NoVisual;

impl Visual for NoVisual {}

/// Scene for simulations and tests: optionally echoes messages to stdout and
/// always picks the first choice.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    echo: bool,
    visual: NoVisual,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            echo: true,
            visual: NoVisual,
        }
    }
}

impl Scene for HeadlessScene {
    fn display_message(&mut self, message: &str) {
        if self.echo {
            println!("{message}");
        }
    }

    fn display_message_with_choice(&mut self, message: &str, choices: &[&str]) -> usize {
        if self.echo {
            println!("{message} [{}]", choices.join("/"));
        }
        0
    }

    fn visual(&mut self) -> &mut dyn Visual {
        &mut self.visual
    }
}
