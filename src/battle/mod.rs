pub mod ai;
pub mod conditions;
pub mod engine;
pub mod highlights;
pub mod runner;
pub mod skill_effects;
pub mod state;
pub mod stats;
pub mod weather;

#[cfg(test)]
pub(crate) mod tests;
