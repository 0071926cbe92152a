use super::EffectContext;
use crate::battle::state::{BattleState, EffectOutcome};
use crate::battle::stats::{resolve, unmodified_defense};
use crate::combatant::Combatant;
use crate::ruleset::Ruleset;
use crate::skill_level::{effect_scale, effective_power};
use schema::{HealAmount, SkillTemplate, Target};

/// The numbers behind one damage effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRoll {
    pub amount: u32,
    /// Combined elemental matchup against every defender element.
    pub effectiveness: f64,
}

/// Damage of one hit of `skill` at `power`, before it is subtracted.
///
/// `power * (atk / def) * K1 + atk * K2`, then the elemental product, the
/// defender's resistance, status vulnerabilities and the crit multiplier.
/// Any hit with positive power does at least 1.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    skill: &SkillTemplate,
    power: u32,
    critical: bool,
    ruleset: &Ruleset,
) -> DamageRoll {
    let tunables = ruleset.tunables();
    let attack = resolve(attacker, ruleset).attack;
    let defense = if skill.ignores_defense() {
        unmodified_defense(defender)
    } else {
        resolve(defender, ruleset).defense
    };

    let raw = power as f64 * (attack / defense) * tunables.damage_ratio_factor
        + attack * tunables.damage_attack_factor;

    let effectiveness = ruleset.elemental_multiplier(skill.element, &defender.elements);
    let mut damage = raw * effectiveness;

    if let Some(element) = skill.element {
        damage *= resistance_factor(defender.resistance_to(element));
        for status in &defender.statuses {
            if let Some(template) = ruleset.status(&status.id) {
                damage *= template.vulnerability_to(element);
            }
        }
    }

    if critical {
        damage *= tunables.crit_multiplier;
    }

    let mut amount = damage.max(0.0).floor() as u32;
    if power > 0 {
        amount = amount.max(1);
    }
    DamageRoll {
        amount,
        effectiveness,
    }
}

/// Positive resistance reduces damage (floored at zero), negative resistance
/// amplifies it.
fn resistance_factor(resistance: i32) -> f64 {
    if resistance >= 0 {
        (1.0 - resistance as f64 / 100.0).max(0.0)
    } else {
        1.0 + resistance.unsigned_abs() as f64 / 100.0
    }
}

/// Returns the outcome fragments and the HP actually removed.
pub(super) fn apply_damage_effect(
    target: Target,
    power_override: Option<u32>,
    context: &EffectContext,
    state: &mut BattleState,
) -> (Vec<EffectOutcome>, u32) {
    let target_index = context.target_index(target);
    if state.combatants[target_index].is_defeated() {
        return (Vec::new(), 0);
    }

    let power = effective_power(power_override.unwrap_or(context.skill.power), context.level);
    let roll = calculate_damage(
        &state.combatants[context.performer_index],
        &state.combatants[target_index],
        context.skill,
        power,
        context.critical,
        context.ruleset,
    );

    let defender = &mut state.combatants[target_index];
    let dealt = defender.take_damage(roll.amount);
    let outcome = EffectOutcome::Damage {
        target: defender.name.clone(),
        amount: dealt,
        critical: context.critical,
        effectiveness: roll.effectiveness,
    };
    (vec![outcome], dealt)
}

pub(super) fn apply_heal_effect(
    target: Target,
    amount: HealAmount,
    context: &EffectContext,
    state: &mut BattleState,
) -> Vec<EffectOutcome> {
    let target_index = context.target_index(target);
    let max_hp = resolve(&state.combatants[target_index], context.ruleset).max_hp;
    let combatant = &mut state.combatants[target_index];
    if combatant.is_defeated() {
        return Vec::new();
    }

    let base = match amount {
        HealAmount::Flat(points) => points as f64,
        HealAmount::MaxHpPercent(percent) => max_hp as f64 * percent as f64 / 100.0,
    };
    let scaled = (base * effect_scale(context.level)).floor() as u32;
    let healed = combatant.restore_hp(scaled, max_hp);
    vec![EffectOutcome::Healed {
        target: combatant.name.clone(),
        amount: healed,
    }]
}

pub(super) fn apply_recoil_effect(
    fraction: f64,
    last_damage: u32,
    context: &EffectContext,
    state: &mut BattleState,
) -> Vec<EffectOutcome> {
    let recoil = (last_damage as f64 * fraction).floor().max(0.0) as u32;
    if recoil == 0 {
        return Vec::new();
    }
    let performer = &mut state.combatants[context.performer_index];
    let taken = performer.take_damage(recoil);
    vec![EffectOutcome::Recoil {
        performer: performer.name.clone(),
        amount: taken,
    }]
}

pub(super) fn apply_leech_effect(
    fraction: f64,
    last_damage: u32,
    context: &EffectContext,
    state: &mut BattleState,
) -> Vec<EffectOutcome> {
    let drained = (last_damage as f64 * fraction).floor().max(0.0) as u32;
    let max_hp = resolve(&state.combatants[context.performer_index], context.ruleset).max_hp;
    let performer = &mut state.combatants[context.performer_index];
    if drained == 0 || performer.is_defeated() {
        return Vec::new();
    }
    let healed = performer.restore_hp(drained, max_hp);
    vec![EffectOutcome::Leech {
        performer: performer.name.clone(),
        amount: healed,
    }]
}
