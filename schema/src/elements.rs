use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Elemental affinity of a creature or a skill.
///
/// A creature can carry several elements (primary first); a skill carries at
/// most one. Parsing is case-insensitive so external records can use
/// lowercase names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Element {
    Fire,
    Water,
    Wood,
    Metal,
    Earth,
    Thunder,
    Wind,
    Ice,
    Light,
    Dark,
}
