use super::EffectContext;
use crate::battle::state::{BattleState, EffectOutcome, TurnRng};
use crate::combatant::TimedModifier;
use crate::skill_level::effect_scale;
use schema::{StatDelta, Target};

/// Chance-gated timed stat changes. Each delta becomes its own modifier entry
/// sourced from the skill, so it expires independently.
pub(super) fn apply_stat_change_effect(
    target: Target,
    changes: &[StatDelta],
    duration: u32,
    chance: u8,
    context: &EffectContext,
    state: &mut BattleState,
    rng: &mut TurnRng,
) -> Vec<EffectOutcome> {
    let target_index = context.target_index(target);
    if state.combatants[target_index].is_defeated() {
        return Vec::new();
    }

    let target_name = state.combatants[target_index].name.clone();
    if !rng.roll(chance as f64, &format!("{} Stat Change Chance", context.skill.name)) {
        return vec![EffectOutcome::StatChangeFailed {
            target: target_name,
        }];
    }

    let scale = effect_scale(context.level);
    let combatant = &mut state.combatants[target_index];
    let mut outcomes = Vec::with_capacity(changes.len());
    for change in changes {
        let amount = change.amount * scale;
        if amount == 0.0 {
            continue;
        }
        combatant.modifiers.add(TimedModifier {
            source: context.skill.name.clone(),
            stat: change.stat,
            mode: change.mode,
            amount,
            remaining: duration.max(1),
        });
        outcomes.push(EffectOutcome::StatChanged {
            target: target_name.clone(),
            stat: change.stat,
            rose: amount > 0.0,
        });
    }
    combatant.clamp_vitals(context.ruleset);
    outcomes
}
