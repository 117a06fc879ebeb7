use super::{Effect, EffectKind, Scope};
use crate::env::{FieldTerrain, Weather};

/// Scope-tagged, insertion-ordered effect arena plus the weather and
/// field terrain singletons.
#[derive(Clone, Debug, Default)]
pub struct EffectsHandler {
    effects: Vec<Effect>,
    weather: Option<Effect>,
    field_terrain: Option<Effect>,
}

impl EffectsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Adds the effect unless one of the same kind already lives in that scope.
    pub fn add_unique(&mut self, effect: Effect) -> bool {
        if self.has(effect.scope, &effect.kind) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    pub fn get(&self, scope: Scope, kind: &EffectKind) -> Option<&Effect> {
        self.effects
            .iter()
            .find(|e| e.scope == scope && &e.kind == kind)
    }

    pub fn get_mut(&mut self, scope: Scope, kind: &EffectKind) -> Option<&mut Effect> {
        self.effects
            .iter_mut()
            .find(|e| e.scope == scope && &e.kind == kind)
    }

    pub fn has(&self, scope: Scope, kind: &EffectKind) -> bool {
        self.get(scope, kind).is_some()
    }

    pub fn find(&self, scope: Scope, mut pred: impl FnMut(&Effect) -> bool) -> Option<&Effect> {
        self.effects.iter().find(|e| e.scope == scope && pred(e))
    }

    pub fn in_scope(&self, scope: Scope) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(move |e| e.scope == scope)
    }

    pub fn remove(&mut self, scope: Scope, kind: &EffectKind) -> Option<Effect> {
        let idx = self
            .effects
            .iter()
            .position(|e| e.scope == scope && &e.kind == kind)?;
        Some(self.effects.remove(idx))
    }

    pub fn remove_where(&mut self, mut pred: impl FnMut(&Effect) -> bool) -> Vec<Effect> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.effects.len());
        for effect in self.effects.drain(..) {
            if pred(&effect) {
                removed.push(effect);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        removed
    }

    pub fn clear_scope(&mut self, scope: Scope) -> Vec<Effect> {
        self.remove_where(|e| e.scope == scope)
    }

    pub fn weather(&self) -> Option<&Effect> {
        self.weather.as_ref()
    }

    pub fn field_terrain(&self) -> Option<&Effect> {
        self.field_terrain.as_ref()
    }

    /// Rebuilds the weather singleton; `None` clears it.
    pub fn set_weather(&mut self, weather: Option<Weather>, turns: Option<u32>) {
        self.weather = weather.map(|w| {
            let mut effect = Effect::permanent(EffectKind::Weather(w), Scope::Global);
            effect.set_counter(turns);
            effect
        });
    }

    pub fn set_field_terrain(&mut self, terrain: Option<FieldTerrain>, turns: Option<u32>) {
        self.field_terrain = terrain.map(|t| {
            let mut effect = Effect::permanent(EffectKind::FieldTerrain(t), Scope::Global);
            effect.set_counter(turns);
            effect
        });
    }

    /// One end-of-turn sweep: every counter goes down by one and expired
    /// effects are removed and returned, singletons included.
    pub fn decay(&mut self) -> Vec<Effect> {
        for effect in self.effects.iter_mut() {
            effect.tick();
        }
        let mut removed = self.remove_where(Effect::is_expired);
        for slot in [&mut self.weather, &mut self.field_terrain] {
            if let Some(effect) = slot.as_mut() {
                effect.tick();
                if effect.is_expired() {
                    removed.extend(slot.take());
                }
            }
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_with_counter_n_survives_n_minus_one_sweeps() {
        let mut effects = EffectsHandler::new();
        effects.add(Effect::new(EffectKind::Reflect, Scope::Bank(0), 5));
        for _ in 0..4 {
            assert!(effects.decay().is_empty());
            assert!(effects.has(Scope::Bank(0), &EffectKind::Reflect));
        }
        let removed = effects.decay();
        assert_eq!(removed.len(), 1);
        assert!(!effects.has(Scope::Bank(0), &EffectKind::Reflect));
    }

    #[test]
    fn permanent_effects_never_expire() {
        let mut effects = EffectsHandler::new();
        effects.add(Effect::permanent(EffectKind::Named("Stealth Rock".into()), Scope::Bank(1)));
        for _ in 0..50 {
            effects.decay();
        }
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn weather_singleton_decays() {
        let mut effects = EffectsHandler::new();
        effects.set_weather(Some(Weather::Rain), Some(2));
        assert!(effects.decay().is_empty());
        let removed = effects.decay();
        assert_eq!(removed[0].kind, EffectKind::Weather(Weather::Rain));
        assert!(effects.weather().is_none());
    }

    #[test]
    fn add_unique_rejects_duplicates_in_the_same_scope() {
        let mut effects = EffectsHandler::new();
        assert!(effects.add_unique(Effect::new(EffectKind::Mist, Scope::Bank(0), 5)));
        assert!(!effects.add_unique(Effect::new(EffectKind::Mist, Scope::Bank(0), 5)));
        assert!(effects.add_unique(Effect::new(EffectKind::Mist, Scope::Bank(1), 5)));
    }
}
