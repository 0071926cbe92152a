//! Action selection for combatants.

use crate::battle::state::TurnRng;
use crate::battle::stats::resolve;
use crate::combatant::Combatant;
use crate::ruleset::Ruleset;

/// What a combatant will do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChosenSkill {
    /// Index into the combatant's equipped skills.
    Equipped(usize),
    BasicAttack,
}

/// A trait for any system that can pick a combatant's action.
///
/// Implementations must draw all randomness from the supplied `TurnRng` so a
/// seeded battle stays reproducible.
pub trait Behavior: Send + Sync {
    fn choose_skill(&self, combatant: &Combatant, ruleset: &Ruleset, rng: &mut TurnRng) -> ChosenSkill;
}

/// Picks by personality affinity part of the time and falls back to the basic
/// attack otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalityAI;

impl PersonalityAI {
    pub fn new() -> Self {
        Self
    }

    /// Indices of skills that are enabled and affordable with current MP.
    pub fn usable_skills(&self, combatant: &Combatant, ruleset: &Ruleset) -> Vec<usize> {
        let mp = resolve(combatant, ruleset).mp;
        combatant
            .skills
            .iter()
            .enumerate()
            .filter(|(_, skill)| skill.enabled && skill.mp_cost() <= mp)
            .map(|(index, _)| index)
            .collect()
    }

    /// Integer selection weight for one skill.
    fn weight(&self, combatant: &Combatant, index: usize, low_hp: bool, ruleset: &Ruleset) -> u32 {
        let category = combatant.skills[index].template.category;
        let mut weight = combatant.affinity(category);
        if low_hp && category.is_supportive() {
            weight *= ruleset.tunables().support_weight_scale;
        }
        (weight * 100.0).round().max(0.0) as u32
    }
}

impl Behavior for PersonalityAI {
    fn choose_skill(&self, combatant: &Combatant, ruleset: &Ruleset, rng: &mut TurnRng) -> ChosenSkill {
        let usable = self.usable_skills(combatant, ruleset);
        if usable.is_empty() {
            tracing::debug!(combatant = %combatant.id, "no usable skill, basic attack");
            return ChosenSkill::BasicAttack;
        }

        let tunables = ruleset.tunables();
        let roll_label = format!("{} Personality Check", combatant.name);
        if !rng.roll(tunables.personality_roll_chance as f64, &roll_label) {
            return ChosenSkill::BasicAttack;
        }

        let resolved = resolve(combatant, ruleset);
        let hp_fraction = resolved.hp as f64 / resolved.max_hp as f64;
        let low_hp = hp_fraction < tunables.low_hp_threshold;

        let weights: Vec<u32> = usable
            .iter()
            .map(|&index| self.weight(combatant, index, low_hp, ruleset))
            .collect();
        let pick_label = format!("{} Skill Pick", combatant.name);
        match rng.pick_weighted(&weights, &pick_label) {
            Some(position) => {
                let index = usable[position];
                tracing::debug!(
                    combatant = %combatant.id,
                    skill = %combatant.skills[index].name(),
                    weight = weights[position],
                    low_hp,
                    "personality pick"
                );
                ChosenSkill::Equipped(index)
            }
            None => ChosenSkill::BasicAttack,
        }
    }
}
