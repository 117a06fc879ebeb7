//! Damage formula with 4096-based fixed point modifiers.

#[derive(Clone, Copy, Debug)]
pub struct DamageModifiers {
    pub weather: f64,
    pub critical: bool,
    pub stab: bool,
    pub burn: f64,
    /// Screens, pursuit and any other final multiplier, already chained.
    pub other: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            weather: 1.0,
            critical: false,
            stab: false,
            burn: 1.0,
            other: 1.0,
        }
    }
}

pub const CRITICAL_MULTIPLIER: f64 = 1.5;

/// Chance of a critical hit at a given critical stage.
pub fn critical_chance(stage: u8) -> f64 {
    match stage {
        0 => 1.0 / 24.0,
        1 => 1.0 / 8.0,
        2 => 0.5,
        _ => 1.0,
    }
}

fn modify(value: u32, modifier: f64) -> u32 {
    if modifier <= 0.0 {
        return 0;
    }
    let modifier = (modifier * 4096.0).floor() as u64;
    ((value as u64 * modifier + 2047) / 4096) as u32
}

pub fn chain(previous: f64, next: f64) -> f64 {
    let previous = (previous * 4096.0).floor() as u64;
    let next = (next * 4096.0).floor() as u64;
    ((previous * next + 2048) >> 12) as f64 / 4096.0
}

pub fn base_damage(level: u8, attack: u32, defense: u32, power: u16) -> u32 {
    let level_factor = 2 * level as u32 / 5 + 2;
    level_factor
        .saturating_mul(power as u32)
        .saturating_mul(attack)
        / defense.max(1)
        / 50
        + 2
}

/// Final damage for one hit. `roll` is the 85..=100 damage-stream percentage.
pub fn compute(
    level: u8,
    attack: u32,
    defense: u32,
    power: u16,
    effectiveness: f32,
    roll: u32,
    mods: DamageModifiers,
) -> u16 {
    if effectiveness == 0.0 || power == 0 {
        return 0;
    }
    let mut damage = base_damage(level, attack, defense, power);
    damage = modify(damage, mods.weather);
    if mods.critical {
        damage = (damage as f64 * CRITICAL_MULTIPLIER).floor() as u32;
    }
    damage = damage.saturating_mul(roll.clamp(85, 100)) / 100;
    if mods.stab {
        damage = modify(damage, 1.5);
    }
    damage = (damage as f64 * effectiveness as f64).floor() as u32;
    damage = modify(damage, mods.burn);
    damage = modify(damage, mods.other);
    damage.clamp(1, u16::MAX as u32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immune_targets_take_nothing() {
        assert_eq!(compute(50, 100, 100, 90, 0.0, 100, DamageModifiers::default()), 0);
    }

    #[test]
    fn minimum_damage_is_one() {
        assert_eq!(compute(1, 5, 500, 10, 0.25, 85, DamageModifiers::default()), 1);
    }

    #[test]
    fn roll_and_stab_scale_damage() {
        let low = compute(50, 120, 100, 90, 1.0, 85, DamageModifiers::default());
        let high = compute(50, 120, 100, 90, 1.0, 100, DamageModifiers::default());
        assert!(low < high);
        let stab = compute(
            50,
            120,
            100,
            90,
            1.0,
            100,
            DamageModifiers {
                stab: true,
                ..DamageModifiers::default()
            },
        );
        assert!(stab > high);
    }

    #[test]
    fn base_damage_matches_hand_computation() {
        // (22 * 90 * 120 / 100) / 50 + 2 = 49
        assert_eq!(base_damage(50, 120, 100, 90), 49);
    }

    #[test]
    fn chain_of_halves_is_a_quarter() {
        assert_eq!(chain(0.5, 0.5), 0.25);
    }
}
