// Creature Arena Schema - Shared type definitions
// This crate holds the static data shapes (elements, stats, skill and status
// templates) that the ruleset files are written in and that the battle engine
// reads from.

// Re-export the main types
pub use elements::*;
pub use skill_types::*;
pub use stats::*;
pub use status_types::*;

pub mod elements;
pub mod skill_types;
pub mod stats;
pub mod status_types;
