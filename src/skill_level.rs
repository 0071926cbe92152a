//! Level scaling for skill instances.
//!
//! A skill's template is static; the instance level makes it stronger (and
//! more expensive). Every function here is non-decreasing in `level`, and a
//! level of 0 is treated as 1.

/// Power grows by 1/10 of base per level above 1.
const POWER_STEPS: u64 = 10;
/// MP cost grows by 1/20 of base per level above 1.
const MP_COST_STEPS: u64 = 20;
/// Heal amounts and stat-change magnitudes grow by 5% per level above 1.
const EFFECT_PER_LEVEL: f64 = 0.05;

fn levels_above_one(level: u32) -> u64 {
    level.max(1) as u64 - 1
}

/// Floor of `base * (1 + (level - 1) / 10)`, in integer arithmetic.
pub fn effective_power(base_power: u32, level: u32) -> u32 {
    let scaled = base_power as u64 * (POWER_STEPS + levels_above_one(level)) / POWER_STEPS;
    scaled.min(u32::MAX as u64) as u32
}

/// `base * (1 + (level - 1) / 20)`, rounded half up.
pub fn effective_mp_cost(base_cost: u32, level: u32) -> u32 {
    let numerator = base_cost as u64 * (MP_COST_STEPS + levels_above_one(level));
    let scaled = (numerator + MP_COST_STEPS / 2) / MP_COST_STEPS;
    scaled.min(u32::MAX as u64) as u32
}

/// Multiplier applied to heal amounts and stat-change amounts.
pub fn effect_scale(level: u32) -> f64 {
    1.0 + EFFECT_PER_LEVEL * levels_above_one(level) as f64
}
