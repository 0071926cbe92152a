use crate::battle::state::{BattleEvent, BattleState, EventBus};
use crate::battle::stats::resolve;
use crate::errors::EngineAnomaly;
use crate::ruleset::Ruleset;

/// End-of-turn weather pass: damage every living combatant that has no
/// immune element, then count the weather down and clear it at zero.
pub fn process_weather(state: &mut BattleState, order: [usize; 2], ruleset: &Ruleset, bus: &mut EventBus) {
    let Some(active) = state.weather.clone() else {
        return;
    };
    let Some(template) = ruleset.weather(&active.id) else {
        let anomaly = EngineAnomaly::EffectResolution {
            source_name: "the field".to_string(),
            kind: "weather",
            id: active.id,
        };
        tracing::warn!("{anomaly}");
        bus.push(BattleEvent::Warning {
            message: anomaly.to_string(),
        });
        state.weather = None;
        return;
    };

    for index in order {
        let max_hp = resolve(&state.combatants[index], ruleset).max_hp;
        let combatant = &mut state.combatants[index];
        if combatant.is_defeated() {
            continue;
        }
        let immune = template
            .immune_elements
            .iter()
            .any(|element| combatant.elements.contains(element));
        if immune {
            bus.push(BattleEvent::WeatherImmune {
                combatant: combatant.name.clone(),
                weather_name: template.name.clone(),
            });
            continue;
        }
        if template.damage_percent == 0 {
            continue;
        }
        let damage = (max_hp as u64 * template.damage_percent as u64 / 100).max(1) as u32;
        let taken = combatant.take_damage(damage);
        tracing::debug!(combatant = %combatant.id, weather = %template.id, taken, "weather tick");
        bus.push(BattleEvent::WeatherDamage {
            combatant: combatant.name.clone(),
            weather_name: template.name.clone(),
            damage: taken,
        });
    }

    let remaining = active.remaining.saturating_sub(1);
    if remaining == 0 {
        state.weather = None;
        bus.push(BattleEvent::WeatherSubsided {
            weather_name: template.name.clone(),
        });
    } else if let Some(weather) = state.weather.as_mut() {
        weather.remaining = remaining;
    }
}
