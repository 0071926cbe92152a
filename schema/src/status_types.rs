use crate::{Element, StatKind};
use serde::{Deserialize, Serialize};

/// Per-turn HP change a status inflicts on its owner at turn start.
/// Negative values damage, positive values heal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HpTick {
    #[default]
    None,
    Flat(i32),
    MaxHpPercent(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hp_per_turn: HpTick,
    /// Flat deltas; only attack, defense, speed and crit are honoured.
    #[serde(default)]
    pub stat_deltas: Vec<(StatKind, i32)>,
    /// Percent chance (0-100) that the owner loses its action this turn.
    #[serde(default)]
    pub skip_chance: u8,
    /// Damage-taken multipliers against specific elements while active.
    #[serde(default)]
    pub vulnerabilities: Vec<(Element, f64)>,
}

impl StatusTemplate {
    pub fn vulnerability_to(&self, element: Element) -> f64 {
        self.vulnerabilities
            .iter()
            .filter(|(e, _)| *e == element)
            .map(|(_, multiplier)| *multiplier)
            .product()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherTemplate {
    pub id: String,
    pub name: String,
    /// Percent of each combatant's max HP dealt at end of turn.
    #[serde(default)]
    pub damage_percent: u32,
    #[serde(default)]
    pub immune_elements: Vec<Element>,
}
