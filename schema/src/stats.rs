use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Closed set of stats the engine knows how to resolve and modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum StatKind {
    MaxHp,
    MaxMp,
    Attack,
    Defense,
    Speed,
    Crit,
    Accuracy,
    Evasion,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatKind::MaxHp => "max HP",
            StatKind::MaxMp => "max MP",
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::Speed => "speed",
            StatKind::Crit => "critical rate",
            StatKind::Accuracy => "accuracy",
            StatKind::Evasion => "evasion",
        };
        write!(f, "{}", display_name)
    }
}

/// A flat block of integer stats.
///
/// Used for base stats, permanent growth and title bonuses alike; every field
/// defaults to zero so partial blocks can be written in data files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub max_hp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub crit: i32,
    pub accuracy: i32,
    pub evasion: i32,
}

impl StatBlock {
    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::MaxHp => self.max_hp,
            StatKind::MaxMp => self.max_mp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::Crit => self.crit,
            StatKind::Accuracy => self.accuracy,
            StatKind::Evasion => self.evasion,
        }
    }

    pub fn set(&mut self, stat: StatKind, value: i32) {
        match stat {
            StatKind::MaxHp => self.max_hp = value,
            StatKind::MaxMp => self.max_mp = value,
            StatKind::Attack => self.attack = value,
            StatKind::Defense => self.defense = value,
            StatKind::Speed => self.speed = value,
            StatKind::Crit => self.crit = value,
            StatKind::Accuracy => self.accuracy = value,
            StatKind::Evasion => self.evasion = value,
        }
    }

    /// Field-wise sum of two blocks.
    pub fn combined(&self, other: &StatBlock) -> StatBlock {
        StatBlock {
            max_hp: self.max_hp + other.max_hp,
            max_mp: self.max_mp + other.max_mp,
            attack: self.attack + other.attack,
            defense: self.defense + other.defense,
            speed: self.speed + other.speed,
            crit: self.crit + other.crit,
            accuracy: self.accuracy + other.accuracy,
            evasion: self.evasion + other.evasion,
        }
    }
}
