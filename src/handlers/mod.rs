//! Change handlers: every mutation of battle state goes through one of these.
//!
//! Each handler is a short-lived borrow of the [`Logic`]. Checks return a
//! [`Permit`] that only the handler itself can mint; the matching change
//! method consumes it, so a mutation cannot skip its prevention chain.

pub mod ability;
pub mod ability_swap;
pub mod battle_end;
pub mod catch;
pub mod damage;
pub mod end_turn;
pub mod exp;
pub mod field_terrain;
pub mod flee;
pub mod item;
pub mod stat;
pub mod status;
pub mod switch;
pub mod transform;
pub mod weather;

use crate::hooks::Prevented;
use crate::logic::Logic;

/// Proof that a change passed its checks.
#[derive(Debug)]
pub struct Permit<C> {
    ctx: C,
}

impl<C> Permit<C> {
    fn new(ctx: C) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    fn into_inner(self) -> C {
        self.ctx
    }
}

pub type Check<C> = Result<Permit<C>, Prevented>;

macro_rules! handlers {
    ($($(#[$meta:meta])* $name:ident => $accessor:ident;)*) => {
        $(
            $(#[$meta])*
            pub struct $name<'a> {
                logic: &'a mut Logic,
            }
        )*

        impl Logic {
            $(
                pub fn $accessor(&mut self) -> $name<'_> {
                    $name { logic: self }
                }
            )*
        }
    };
}

handlers! {
    /// Stat stage changes.
    StatChangeHandler => stat_change_handler;
    /// Primary status, confusion and flinch.
    StatusChangeHandler => status_change_handler;
    /// HP loss, drain and heal.
    DamageHandler => damage_handler;
    ItemChangeHandler => item_change_handler;
    SwitchHandler => switch_handler;
    AbilityChangeHandler => ability_change_handler;
    AbilitySwapHandler => ability_swap_handler;
    WeatherChangeHandler => weather_change_handler;
    FieldTerrainChangeHandler => field_terrain_change_handler;
    CatchHandler => catch_handler;
    FleeHandler => flee_handler;
    EndTurnHandler => end_turn_handler;
    BattleEndHandler => battle_end_handler;
    TransformHandler => transform_handler;
    ExpHandler => exp_handler;
}
