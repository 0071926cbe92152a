// --- 1. HELPER MODULES ---
mod damage_effects;
mod special_effects;
mod stat_effects;
mod status_effects;

// --- 2. IMPORTS ---
use crate::battle::state::{BattleEvent, BattleState, EffectOutcome, EventBus, TurnRng};
use crate::battle::stats::resolve;
use crate::errors::EngineAnomaly;
use crate::ruleset::Ruleset;
use crate::skill_level::effective_mp_cost;
use schema::{SkillEffect, SkillTemplate, SpecialEffect, Target};

pub use self::damage_effects::{calculate_damage, DamageRoll};
use self::{damage_effects::*, special_effects::*, stat_effects::*, status_effects::*};

// --- 3. SHARED TYPES ---
/// Who is doing what, for the duration of one skill use.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    pub performer_index: usize,
    pub opponent_index: usize,
    pub skill: &'a SkillTemplate,
    pub ruleset: &'a Ruleset,
    pub level: u32,
    /// Result of the single crit roll made for this skill use.
    pub critical: bool,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        performer_index: usize,
        skill: &'a SkillTemplate,
        ruleset: &'a Ruleset,
        level: u32,
        critical: bool,
    ) -> Self {
        Self {
            performer_index,
            opponent_index: BattleState::opponent_of(performer_index),
            skill,
            ruleset,
            level,
            critical,
        }
    }

    pub fn target_index(&self, target: Target) -> usize {
        match target {
            Target::User => self.performer_index,
            Target::Opponent => self.opponent_index,
        }
    }
}

/// What a single effect handler produced.
pub(crate) type EffectResult = Result<Vec<EffectOutcome>, EngineAnomaly>;

// --- 4. ENTRY POINT ---
/// Resolve one use of `skill` by the combatant at `performer_index`.
///
/// MP is paid up front, so a miss still costs it. Unless the skill always
/// hits, an accuracy roll can end the use early.
/// Otherwise one crit roll is made and shared by every damage effect, and the
/// effects run in order against the live battle state, so later effects see
/// the results of earlier ones. Everything that happened becomes one
/// [`BattleEvent::SkillUsed`] line; recovered anomalies follow it as warnings.
pub fn apply_skill(
    state: &mut BattleState,
    performer_index: usize,
    skill: &SkillTemplate,
    level: u32,
    ruleset: &Ruleset,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    let opponent_index = BattleState::opponent_of(performer_index);
    let performer_name = state.combatants[performer_index].name.clone();
    state.combatants[performer_index].spend_mp(effective_mp_cost(skill.mp_cost, level));

    let attacker = resolve(&state.combatants[performer_index], ruleset);
    let tunables = ruleset.tunables();

    if !skill.always_hits {
        let defender = resolve(&state.combatants[opponent_index], ruleset);
        let hit_chance = (skill.accuracy as f64 + attacker.accuracy_bonus - defender.evasion_bonus)
            .clamp(tunables.min_hit_chance, tunables.max_hit_chance);
        let label = format!("{} Accuracy Check ({})", performer_name, skill.name);
        if !rng.roll(hit_chance, &label) {
            tracing::debug!(performer = %performer_name, skill = %skill.name, hit_chance, "missed");
            bus.push(BattleEvent::SkillUsed {
                combatant: performer_name,
                skill: skill.name.clone(),
                outcomes: vec![EffectOutcome::Missed {
                    target: state.combatants[opponent_index].name.clone(),
                }],
            });
            return;
        }
    }

    let critical = if skill.deals_damage() {
        let crit_chance = (attacker.crit + skill.bonus_crit as f64).min(tunables.crit_cap);
        let label = format!("{} Critical Hit Check ({})", performer_name, skill.name);
        rng.roll(crit_chance, &label)
    } else {
        false
    };

    let context = EffectContext::new(performer_index, skill, ruleset, level, critical);
    let mut outcomes = Vec::new();
    let mut anomalies = Vec::new();
    let mut last_damage = 0u32;

    for effect in &skill.effects {
        let result = match effect {
            SkillEffect::Damage { target, power } => {
                let (effect_outcomes, dealt) =
                    apply_damage_effect(*target, *power, &context, state);
                last_damage = dealt;
                Ok(effect_outcomes)
            }
            SkillEffect::ApplyStatus {
                target,
                status,
                chance,
                duration,
            } => apply_status_effect(*target, status, *chance, *duration, &context, state, rng),
            SkillEffect::StatChange {
                target,
                changes,
                duration,
                chance,
            } => Ok(apply_stat_change_effect(
                *target, changes, *duration, *chance, &context, state, rng,
            )),
            SkillEffect::Heal { target, amount } => {
                Ok(apply_heal_effect(*target, *amount, &context, state))
            }
            SkillEffect::Special(special) => match special {
                SpecialEffect::Recoil(fraction) => {
                    Ok(apply_recoil_effect(*fraction, last_damage, &context, state))
                }
                SpecialEffect::Leech(fraction) => {
                    Ok(apply_leech_effect(*fraction, last_damage, &context, state))
                }
                SpecialEffect::Weather { weather, duration } => {
                    apply_weather_effect(weather, *duration, &context, state)
                }
                SpecialEffect::IgnoreDefense => Ok(apply_ignore_defense_marker(&context)),
                SpecialEffect::SelfSacrifice => Ok(apply_self_sacrifice_effect(&context, state)),
            },
        };

        match result {
            Ok(effect_outcomes) => outcomes.extend(effect_outcomes),
            Err(anomaly) => {
                tracing::warn!("{anomaly}");
                outcomes.push(EffectOutcome::Failed);
                anomalies.push(anomaly);
            }
        }
    }

    tracing::debug!(
        performer = %performer_name,
        skill = %skill.name,
        level,
        critical,
        effects = outcomes.len(),
        "skill resolved"
    );
    bus.push(BattleEvent::SkillUsed {
        combatant: performer_name,
        skill: skill.name.clone(),
        outcomes,
    });
    for anomaly in anomalies {
        bus.push(BattleEvent::Warning {
            message: anomaly.to_string(),
        });
    }
}
