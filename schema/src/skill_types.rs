use crate::{Element, StatKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for the universal fallback skill.
pub const BASIC_ATTACK_NAME: &str = "Basic Attack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Attack,
    Control,
    Support,
    Heal,
    Utility,
}

impl SkillCategory {
    /// Categories the action selector favours when its owner is low on HP.
    pub fn is_supportive(self) -> bool {
        matches!(
            self,
            SkillCategory::Support | SkillCategory::Heal | SkillCategory::Utility
        )
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    #[default]
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierMode {
    /// Added after the multiplier: `final = total * multiplier + additive`.
    Additive,
    /// Added to the multiplier, which starts at 1.0.
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub stat: StatKind,
    pub mode: ModifierMode,
    pub amount: f64,
}

/// How long an applied status lasts, in owner turn-start cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationSpec {
    Fixed(u32),
    /// Inclusive range, drawn uniformly.
    Range(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealAmount {
    Flat(u32),
    MaxHpPercent(u32),
}

/// Special mechanics a skill can carry. Recoil and leech read the damage
/// dealt by the most recent `Damage` effect of the same skill use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecialEffect {
    Recoil(f64),
    Leech(f64),
    Weather { weather: String, duration: u32 },
    IgnoreDefense,
    SelfSacrifice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    Damage {
        #[serde(default)]
        target: Target,
        /// Overrides the skill's base power for this hit.
        #[serde(default)]
        power: Option<u32>,
    },
    ApplyStatus {
        target: Target,
        status: String,
        chance: u8,
        duration: DurationSpec,
    },
    StatChange {
        target: Target,
        changes: Vec<StatDelta>,
        duration: u32,
        chance: u8,
    },
    Heal {
        target: Target,
        amount: HealAmount,
    },
    Special(SpecialEffect),
}

fn default_accuracy() -> u32 {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTemplate {
    pub name: String,
    #[serde(default)]
    pub element: Option<Element>,
    pub category: SkillCategory,
    #[serde(default)]
    pub power: u32,
    #[serde(default = "default_accuracy")]
    pub accuracy: u32,
    #[serde(default)]
    pub mp_cost: u32,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub bonus_crit: u32,
    #[serde(default)]
    pub always_hits: bool,
    pub effects: Vec<SkillEffect>,
}

impl SkillTemplate {
    /// The universal fallback: elementless, free, modest power.
    pub fn basic_attack(power: u32) -> Self {
        SkillTemplate {
            name: BASIC_ATTACK_NAME.to_string(),
            element: None,
            category: SkillCategory::Attack,
            power,
            accuracy: 95,
            mp_cost: 0,
            priority: 0,
            bonus_crit: 0,
            always_hits: false,
            effects: vec![SkillEffect::Damage {
                target: Target::Opponent,
                power: None,
            }],
        }
    }

    pub fn deals_damage(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, SkillEffect::Damage { .. }))
    }

    pub fn ignores_defense(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, SkillEffect::Special(SpecialEffect::IgnoreDefense)))
    }
}
