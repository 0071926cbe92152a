use super::{EffectContext, EffectResult};
use crate::battle::state::{ActiveWeather, BattleState, EffectOutcome};
use crate::errors::EngineAnomaly;

/// Replace the current weather. Re-casting the active weather resets its
/// countdown.
pub(super) fn apply_weather_effect(
    weather_id: &str,
    duration: u32,
    context: &EffectContext,
    state: &mut BattleState,
) -> EffectResult {
    let Some(template) = context.ruleset.weather(weather_id) else {
        return Err(EngineAnomaly::EffectResolution {
            source_name: context.skill.name.clone(),
            kind: "weather",
            id: weather_id.to_string(),
        });
    };
    state.weather = Some(ActiveWeather {
        id: weather_id.to_string(),
        remaining: duration.max(1),
    });
    Ok(vec![EffectOutcome::WeatherStarted {
        weather_name: template.name.clone(),
    }])
}

/// Defense bypass is read by the damage calculation; here it only announces
/// itself on skills that actually hit.
pub(super) fn apply_ignore_defense_marker(context: &EffectContext) -> Vec<EffectOutcome> {
    if context.skill.deals_damage() {
        vec![EffectOutcome::DefenseIgnored]
    } else {
        Vec::new()
    }
}

/// Both combatants drop to 0 HP.
pub(super) fn apply_self_sacrifice_effect(context: &EffectContext, state: &mut BattleState) -> Vec<EffectOutcome> {
    for combatant in state.combatants.iter_mut() {
        combatant.hp = 0;
    }
    vec![EffectOutcome::SelfSacrifice {
        performer: state.combatants[context.performer_index].name.clone(),
    }]
}
