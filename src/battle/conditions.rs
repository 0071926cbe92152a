use crate::battle::state::{BattleEvent, BattleState, EventBus, TurnRng};
use crate::battle::stats::resolve;
use crate::errors::EngineAnomaly;
use crate::ruleset::Ruleset;
use schema::HpTick;

/// Turn-start pass over one combatant's active statuses.
///
/// Statuses are visited in catalog order. For each one: roll its skip chance
/// (once the turn is already lost no further skip rolls are made), apply its
/// per-turn HP delta, then count its duration down and drop it at zero.
/// Returns whether the combatant loses its action this turn.
pub fn process_turn_start(
    state: &mut BattleState,
    index: usize,
    ruleset: &Ruleset,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> bool {
    drop_unknown_statuses(state, index, ruleset, bus);

    let mut ids: Vec<(usize, String)> = state.combatants[index]
        .statuses
        .iter()
        .filter_map(|status| {
            ruleset
                .status_order(&status.id)
                .map(|order| (order, status.id.clone()))
        })
        .collect();
    ids.sort();

    let mut skipped = false;
    for (_, id) in ids {
        let Some(template) = ruleset.status(&id) else {
            continue;
        };
        let name = state.combatants[index].name.clone();

        if !skipped
            && rng.roll(
                template.skip_chance as f64,
                &format!("{} Skip Check ({})", name, template.name),
            )
        {
            skipped = true;
            bus.push(BattleEvent::StatusSkippedTurn {
                combatant: name.clone(),
                status_name: template.name.clone(),
            });
        }

        let max_hp = resolve(&state.combatants[index], ruleset).max_hp;
        let combatant = &mut state.combatants[index];
        let delta = hp_delta(template.hp_per_turn, max_hp);
        if delta != 0 && !combatant.is_defeated() {
            let applied = if delta < 0 {
                -(combatant.take_damage(delta.unsigned_abs() as u32) as i64)
            } else {
                combatant.restore_hp(delta as u32, max_hp) as i64
            };
            tracing::debug!(combatant = %name, status = %template.id, applied, "status hp tick");
            if applied != 0 {
                bus.push(BattleEvent::StatusHpChanged {
                    combatant: name.clone(),
                    status_name: template.name.clone(),
                    delta: applied,
                });
            }
        }

        if let Some(position) = combatant.statuses.iter().position(|s| s.id == id) {
            let active = &mut combatant.statuses[position];
            active.remaining = active.remaining.saturating_sub(1);
            if active.remaining == 0 {
                combatant.statuses.remove(position);
                bus.push(BattleEvent::StatusExpired {
                    combatant: name,
                    status_name: template.name.clone(),
                });
            }
        }
    }
    skipped
}

/// Per-turn HP change for a status on a combatant with `max_hp`. A non-zero
/// percentage always moves HP by at least one point.
pub fn hp_delta(tick: HpTick, max_hp: u32) -> i64 {
    match tick {
        HpTick::None => 0,
        HpTick::Flat(amount) => amount as i64,
        HpTick::MaxHpPercent(0) => 0,
        HpTick::MaxHpPercent(percent) => {
            let amount = max_hp as i64 * percent as i64 / 100;
            if amount == 0 {
                percent.signum() as i64
            } else {
                amount
            }
        }
    }
}

fn drop_unknown_statuses(state: &mut BattleState, index: usize, ruleset: &Ruleset, bus: &mut EventBus) {
    let combatant = &mut state.combatants[index];
    let name = combatant.name.clone();
    combatant.statuses.retain(|status| {
        if ruleset.status(&status.id).is_some() {
            return true;
        }
        let anomaly = EngineAnomaly::EffectResolution {
            source_name: name.clone(),
            kind: "status",
            id: status.id.clone(),
        };
        tracing::warn!("{anomaly}");
        bus.push(BattleEvent::Warning {
            message: anomaly.to_string(),
        });
        false
    });
}
