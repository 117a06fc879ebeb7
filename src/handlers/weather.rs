use super::{Check, Permit, WeatherChangeHandler};
use crate::battler::BattlerId;
use crate::env::Weather;
use crate::hooks::{exec_hooks, hook_point, Prevented};
use std::ops::ControlFlow;

pub const DEFAULT_WEATHER_TURNS: u32 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeatherChange {
    pub weather: Option<Weather>,
    /// `None` lasts until replaced.
    pub turns: Option<u32>,
    pub launcher: Option<BattlerId>,
}

hook_point!(WeatherPrevention: "weather_change" / "weather_prevention", WeatherChange => Prevented);
hook_point!(PostWeatherChange: "weather_change" / "post_weather_change", WeatherChange => ());

fn weather_text(old: Option<Weather>, new: Option<Weather>) -> Option<&'static str> {
    Some(match (old, new) {
        (_, Some(Weather::Rain)) => "It started to rain!",
        (_, Some(Weather::Sun)) => "The sunlight turned harsh!",
        (_, Some(Weather::Sand)) => "A sandstorm kicked up!",
        (_, Some(Weather::Hail)) => "It started to hail!",
        (Some(Weather::Rain), None) => "The rain stopped.",
        (Some(Weather::Sun), None) => "The sunlight faded.",
        (Some(Weather::Sand), None) => "The sandstorm subsided.",
        (Some(Weather::Hail), None) => "The hail stopped.",
        (None, None) => return None,
    })
}

impl WeatherChangeHandler<'_> {
    pub fn weather_appliable(
        &mut self,
        weather: Option<Weather>,
        turns: Option<u32>,
        launcher: Option<BattlerId>,
    ) -> Check<WeatherChange> {
        if self.logic.env().weather == weather {
            return Err(Prevented::silent());
        }
        let mut change = WeatherChange {
            weather,
            turns,
            launcher,
        };
        if let ControlFlow::Break(prevented) = exec_hooks::<WeatherPrevention>(self.logic, &mut change) {
            return Err(prevented);
        }
        Ok(Permit::new(change))
    }

    pub fn weather_change(&mut self, permit: Permit<WeatherChange>) {
        let mut change = permit.into_inner();
        let old = std::mem::replace(&mut self.logic.env_mut().weather, change.weather);
        self.logic.effects_mut().set_weather(change.weather, change.turns);
        if let Some(weather) = change.weather {
            self.logic.logger_mut().log_weather(weather.name());
        } else {
            self.logic.logger_mut().log_weather("none");
        }
        if let Some(text) = weather_text(old, change.weather) {
            self.logic.display_message(text);
        }
        let _ = exec_hooks::<PostWeatherChange>(self.logic, &mut change);
    }

    pub fn weather_change_with_process(
        &mut self,
        weather: Option<Weather>,
        turns: Option<u32>,
        launcher: Option<BattlerId>,
    ) -> bool {
        match self.weather_appliable(weather, turns, launcher) {
            Ok(permit) => {
                self.weather_change(permit);
                true
            }
            Err(prevented) => {
                prevented.play(self.logic);
                false
            }
        }
    }

    /// Forgets the weather because its duration ran out; the message is
    /// shown by the sweep that removed the effect.
    pub(crate) fn expire(&mut self) {
        self.logic.env_mut().weather = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duel, onix, pikachu};

    #[test]
    fn same_weather_is_a_no_op() {
        let mut logic = duel(pikachu(), onix());
        assert!(logic
            .weather_change_handler()
            .weather_change_with_process(Some(Weather::Rain), Some(5), None));
        assert!(!logic
            .weather_change_handler()
            .weather_change_with_process(Some(Weather::Rain), Some(5), None));
        assert_eq!(
            logic.logger().messages().filter(|m| *m == "It started to rain!").count(),
            1
        );
        assert_eq!(logic.effects().weather().and_then(|e| e.counter()), Some(5));
    }

    #[test]
    fn clearing_uses_the_old_weather_message() {
        let mut logic = duel(pikachu(), onix());
        logic
            .weather_change_handler()
            .weather_change_with_process(Some(Weather::Sun), None, None);
        logic
            .weather_change_handler()
            .weather_change_with_process(None, None, None);
        assert!(logic.logger().messages().any(|m| m == "The sunlight faded."));
        assert!(logic.effects().weather().is_none());
    }
}
