use super::{EffectContext, EffectResult};
use crate::battle::state::{BattleState, EffectOutcome, TurnRng};
use crate::combatant::ActiveStatus;
use crate::errors::EngineAnomaly;
use schema::{DurationSpec, Target};

/// Try to inflict a status. The same id never stacks: a target that already
/// has it is left alone without a roll.
pub(super) fn apply_status_effect(
    target: Target,
    status_id: &str,
    chance: u8,
    duration: DurationSpec,
    context: &EffectContext,
    state: &mut BattleState,
    rng: &mut TurnRng,
) -> EffectResult {
    let Some(template) = context.ruleset.status(status_id) else {
        return Err(EngineAnomaly::EffectResolution {
            source_name: context.skill.name.clone(),
            kind: "status",
            id: status_id.to_string(),
        });
    };

    let target_index = context.target_index(target);
    let combatant = &mut state.combatants[target_index];
    if combatant.is_defeated() {
        return Ok(Vec::new());
    }
    if combatant.has_status(status_id) {
        return Ok(vec![EffectOutcome::StatusAlreadyActive {
            target: combatant.name.clone(),
            status_name: template.name.clone(),
        }]);
    }

    let label = format!("{} Status Chance ({})", context.skill.name, template.name);
    if !rng.roll(chance as f64, &label) {
        return Ok(vec![EffectOutcome::StatusResisted {
            target: combatant.name.clone(),
            status_name: template.name.clone(),
        }]);
    }

    let remaining = match duration {
        DurationSpec::Fixed(turns) => turns,
        DurationSpec::Range(low, high) => {
            rng.range_inclusive(low, high, &format!("{} Duration", template.name))
        }
    }
    .max(1);

    combatant.statuses.push(ActiveStatus {
        id: status_id.to_string(),
        remaining,
    });
    Ok(vec![EffectOutcome::StatusApplied {
        target: combatant.name.clone(),
        status_name: template.name.clone(),
    }])
}
