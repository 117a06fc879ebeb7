//! Persistent rule state attached to a scope, with a turn counter.

mod handler;

pub use handler::EffectsHandler;

use crate::battler::BattlerId;
use crate::env::{FieldTerrain, Weather};
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Scope {
    Global,
    Bank(usize),
    Position { bank: usize, position: usize },
    Battler(BattlerId),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EffectKind {
    Weather(Weather),
    FieldTerrain(FieldTerrain),
    Ability(String),
    Item(String),
    Reflect,
    LightScreen,
    Mist,
    Safeguard,
    Tailwind,
    TrickRoom,
    Trapped { by: BattlerId },
    Bind { by: BattlerId },
    HealBlock,
    Focus,
    Named(Cow<'static, str>),
}

impl EffectKind {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            EffectKind::Weather(weather) => Cow::Borrowed(weather.name()),
            EffectKind::FieldTerrain(terrain) => Cow::Borrowed(terrain.name()),
            EffectKind::Ability(id) | EffectKind::Item(id) => Cow::Borrowed(id.as_str()),
            EffectKind::Reflect => Cow::Borrowed("Reflect"),
            EffectKind::LightScreen => Cow::Borrowed("Light Screen"),
            EffectKind::Mist => Cow::Borrowed("Mist"),
            EffectKind::Safeguard => Cow::Borrowed("Safeguard"),
            EffectKind::Tailwind => Cow::Borrowed("Tailwind"),
            EffectKind::TrickRoom => Cow::Borrowed("Trick Room"),
            EffectKind::Trapped { .. } => Cow::Borrowed("Trapped"),
            EffectKind::Bind { .. } => Cow::Borrowed("Bind"),
            EffectKind::HealBlock => Cow::Borrowed("Heal Block"),
            EffectKind::Focus => Cow::Borrowed("Focus"),
            EffectKind::Named(name) => Cow::Borrowed(name.as_ref()),
        }
    }

    /// Message shown when the effect runs out, if any.
    pub fn expiry_message(&self) -> Option<String> {
        Some(match self {
            EffectKind::Weather(Weather::Rain) => "The rain stopped.".to_string(),
            EffectKind::Weather(Weather::Sun) => "The sunlight faded.".to_string(),
            EffectKind::Weather(Weather::Sand) => "The sandstorm subsided.".to_string(),
            EffectKind::Weather(Weather::Hail) => "The hail stopped.".to_string(),
            EffectKind::FieldTerrain(terrain) => format!("The {} disappeared.", terrain.name()),
            EffectKind::Reflect
            | EffectKind::LightScreen
            | EffectKind::Mist
            | EffectKind::Safeguard
            | EffectKind::Tailwind => format!("{} wore off!", self.name()),
            EffectKind::TrickRoom => "The twisted dimensions returned to normal!".to_string(),
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub scope: Scope,
    counter: Option<u32>,
}

impl Effect {
    /// Effect removed after exactly `turns` end-of-turn sweeps.
    pub fn new(kind: EffectKind, scope: Scope, turns: u32) -> Self {
        Self {
            kind,
            scope,
            counter: Some(turns),
        }
    }

    pub fn permanent(kind: EffectKind, scope: Scope) -> Self {
        Self {
            kind,
            scope,
            counter: None,
        }
    }

    pub fn counter(&self) -> Option<u32> {
        self.counter
    }

    pub fn set_counter(&mut self, turns: Option<u32>) {
        self.counter = turns;
    }

    pub fn is_expired(&self) -> bool {
        self.counter == Some(0)
    }

    pub(crate) fn tick(&mut self) {
        if let Some(counter) = self.counter.as_mut() {
            *counter = counter.saturating_sub(1);
        }
    }

    pub fn is(&self, kind: &EffectKind) -> bool {
        &self.kind == kind
    }
}
