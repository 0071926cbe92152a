use crate::combatant::Combatant;
use crate::ruleset::Ruleset;
use schema::{StatBlock, StatKind};
use serde::{Deserialize, Serialize};

/// Lowest multiplier a stack of multiplicative debuffs can reach.
const MIN_MULTIPLIER: f64 = 0.1;
/// Defense never drops below this so damage ratios stay finite.
pub const MIN_DEFENSE: f64 = 1.0;

/// A combatant's stats after growth, title, modifiers and statuses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStats {
    pub hp: u32,
    pub mp: u32,
    pub max_hp: u32,
    pub max_mp: u32,
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    /// Percent, already capped.
    pub crit: f64,
    pub accuracy_bonus: f64,
    pub evasion_bonus: f64,
}

/// Resolve effective stats. Pure: the combatant is only read.
///
/// `final = base_total * multiplier + additive`, then the flat deltas of
/// active statuses are added to attack, defense, speed and crit.
pub fn resolve(combatant: &Combatant, ruleset: &Ruleset) -> ResolvedStats {
    let totals = combatant.base_total();
    let deltas = status_deltas(combatant, ruleset);
    let stat = |kind: StatKind| {
        let modifier = combatant.modifiers.get(kind);
        totals.get(kind) as f64 * modifier.multiplier.max(MIN_MULTIPLIER)
            + modifier.additive
            + deltas.get(kind) as f64
    };

    let max_hp = stat(StatKind::MaxHp).floor().max(1.0) as u32;
    let max_mp = stat(StatKind::MaxMp).floor().max(1.0) as u32;
    let crit_cap = ruleset.tunables().crit_cap;

    ResolvedStats {
        hp: combatant.hp.min(max_hp),
        mp: combatant.mp.min(max_mp),
        max_hp,
        max_mp,
        attack: stat(StatKind::Attack).max(0.0),
        defense: stat(StatKind::Defense).max(MIN_DEFENSE),
        speed: stat(StatKind::Speed).max(0.0),
        crit: stat(StatKind::Crit).clamp(0.0, crit_cap),
        accuracy_bonus: stat(StatKind::Accuracy),
        evasion_bonus: stat(StatKind::Evasion),
    }
}

/// Sum of the stat deltas of every active status. Only the combat stats are
/// affected; unknown ids contribute nothing.
fn status_deltas(combatant: &Combatant, ruleset: &Ruleset) -> StatBlock {
    let mut deltas = StatBlock::default();
    for status in &combatant.statuses {
        let Some(template) = ruleset.status(&status.id) else {
            continue;
        };
        for &(kind, amount) in &template.stat_deltas {
            if matches!(
                kind,
                StatKind::Attack | StatKind::Defense | StatKind::Speed | StatKind::Crit
            ) {
                deltas.set(kind, deltas.get(kind) + amount);
            }
        }
    }
    deltas
}

/// Defense from base, growth and title only, ignoring modifiers and statuses.
pub fn unmodified_defense(combatant: &Combatant) -> f64 {
    (combatant.base_total().defense as f64).max(MIN_DEFENSE)
}

pub fn effective_speed(combatant: &Combatant, ruleset: &Ruleset) -> f64 {
    resolve(combatant, ruleset).speed
}
