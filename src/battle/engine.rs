use crate::battle::ai::{Behavior, ChosenSkill};
use crate::battle::conditions::process_turn_start;
use crate::battle::skill_effects::apply_skill;
use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState, TurnRng};
use crate::battle::stats::effective_speed;
use crate::battle::weather::process_weather;
use crate::ruleset::Ruleset;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Main entry point for turn resolution.
///
/// Runs one complete turn against `battle_state` and returns the events it
/// produced. The caller owns the turn counter and the turn cap; this only
/// settles `game_state` when someone falls.
pub fn resolve_turn(
    battle_state: &mut BattleState,
    ruleset: &Ruleset,
    behavior: &dyn Behavior,
    rng: &mut TurnRng,
) -> EventBus {
    let mut bus = EventBus::new();
    if battle_state.game_state.is_terminal() {
        return bus;
    }
    bus.push(BattleEvent::TurnStarted {
        turn_number: battle_state.turn_number,
    });

    // 1. Order is fixed for the whole turn from speeds at turn start
    let order = determine_turn_order(battle_state, ruleset);

    // 2. Status pass for both sides before anyone acts
    let mut skipped = [false; 2];
    for &index in &order {
        skipped[index] = process_turn_start(battle_state, index, ruleset, rng, &mut bus);
    }
    if check_for_battle_end(battle_state, &mut bus) {
        return bus;
    }

    // 3. Actions
    for &index in &order {
        if skipped[index] {
            continue;
        }
        let opponent = BattleState::opponent_of(index);
        if battle_state.combatants[index].is_defeated() || battle_state.combatants[opponent].is_defeated() {
            continue;
        }
        execute_action(battle_state, index, ruleset, behavior, rng, &mut bus);
        if check_for_battle_end(battle_state, &mut bus) {
            return bus;
        }
    }

    // 4. End of turn
    process_weather(battle_state, order, ruleset, &mut bus);
    if check_for_battle_end(battle_state, &mut bus) {
        return bus;
    }
    decay_modifiers(battle_state, ruleset, &mut bus);

    bus.push(BattleEvent::TurnEnded);
    bus
}

/// Descending effective speed. The sort is stable, so on a tie the
/// challenger (index 0) moves first.
pub fn determine_turn_order(battle_state: &BattleState, ruleset: &Ruleset) -> [usize; 2] {
    let mut order = [0, 1];
    order.sort_by_key(|&index| Reverse(OrderedFloat(effective_speed(&battle_state.combatants[index], ruleset))));
    order
}

/// Select and resolve one combatant's action.
pub fn execute_action(
    battle_state: &mut BattleState,
    index: usize,
    ruleset: &Ruleset,
    behavior: &dyn Behavior,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    let choice = behavior.choose_skill(&battle_state.combatants[index], ruleset, rng);
    let (template, level) = match choice {
        ChosenSkill::Equipped(skill_index) => {
            let skill = &mut battle_state.combatants[index].skills[skill_index];
            skill.uses += 1;
            (skill.template.clone(), skill.level)
        }
        ChosenSkill::BasicAttack => (ruleset.basic_attack().clone(), 1),
    };
    tracing::debug!(
        combatant = %battle_state.combatants[index].id,
        skill = %template.name,
        level,
        "action selected"
    );
    apply_skill(battle_state, index, &template, level, ruleset, rng, bus);
}

/// Settle the outcome once anyone is at 0 HP. Both at 0 is a draw.
pub fn check_for_battle_end(battle_state: &mut BattleState, bus: &mut EventBus) -> bool {
    if battle_state.game_state.is_terminal() {
        return true;
    }
    let down = [
        battle_state.combatants[0].is_defeated(),
        battle_state.combatants[1].is_defeated(),
    ];
    let game_state = match down {
        [false, false] => return false,
        [true, true] => GameState::Draw,
        [true, false] => GameState::Victory { winner: 1, loser: 0 },
        [false, true] => GameState::Victory { winner: 0, loser: 1 },
    };

    for (index, &is_down) in down.iter().enumerate() {
        if is_down {
            bus.push(BattleEvent::Defeated {
                combatant: battle_state.combatants[index].name.clone(),
            });
        }
    }
    let winner = match game_state {
        GameState::Victory { winner, .. } => Some(battle_state.combatants[winner].name.clone()),
        _ => None,
    };
    tracing::info!(turn = battle_state.turn_number, ?game_state, "battle decided");
    bus.push(BattleEvent::BattleEnded { winner });
    battle_state.game_state = game_state;
    true
}

/// Age every timed modifier by one turn, logging the ones that run out.
fn decay_modifiers(battle_state: &mut BattleState, ruleset: &Ruleset, bus: &mut EventBus) {
    for combatant in battle_state.combatants.iter_mut() {
        let expired = combatant.modifiers.tick();
        if expired.is_empty() {
            continue;
        }
        for modifier in expired {
            bus.push(BattleEvent::ModifierExpired {
                combatant: combatant.name.clone(),
                stat: modifier.stat,
                source: modifier.source,
            });
        }
        combatant.clamp_vitals(ruleset);
    }
}
