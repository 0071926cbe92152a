use crate::battle::stats::resolve;
use crate::errors::EngineAnomaly;
use crate::ruleset::Ruleset;
use crate::skill_level::{effective_mp_cost, effective_power};
use schema::{
    Element, ModifierMode, SkillCategory, SkillTemplate, StatBlock, StatKind, BASIC_ATTACK_NAME,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_skill_level() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

/// One equipped skill as the owning record stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    #[serde(default = "default_skill_level")]
    pub level: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Base stats as they arrive from the record store. Missing fields are
/// tolerated and replaced by documented minimums when the combatant is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStats {
    pub max_hp: Option<i32>,
    pub max_mp: Option<i32>,
    pub attack: Option<i32>,
    pub defense: Option<i32>,
    pub speed: Option<i32>,
    pub crit: Option<i32>,
    pub accuracy: Option<i32>,
    pub evasion: Option<i32>,
}

/// A status the monster already carries when the battle starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub id: String,
    pub remaining: u32,
}

/// External snapshot of a monster. Battles never touch the record itself; a
/// [`Combatant`] is deep-copied out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub base_stats: RawStats,
    /// Permanent gains from cultivation.
    #[serde(default)]
    pub growth: StatBlock,
    #[serde(default)]
    pub current_hp: Option<u32>,
    #[serde(default)]
    pub current_mp: Option<u32>,
    #[serde(default)]
    pub resistances: HashMap<Element, i32>,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub personality: HashMap<SkillCategory, f64>,
    #[serde(default)]
    pub statuses: Vec<ActiveStatus>,
}

/// Flat stat bonus granted by the owner's equipped title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleBuff {
    pub title: String,
    #[serde(default)]
    pub bonus: StatBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillInstance {
    pub template: SkillTemplate,
    pub level: u32,
    pub enabled: bool,
    /// Times this skill was used in the current battle.
    pub uses: u32,
}

impl SkillInstance {
    pub fn new(template: SkillTemplate, level: u32) -> Self {
        Self {
            template,
            level: level.max(1),
            enabled: true,
            uses: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn power(&self) -> u32 {
        effective_power(self.template.power, self.level)
    }

    pub fn mp_cost(&self) -> u32 {
        effective_mp_cost(self.template.mp_cost, self.level)
    }
}

/// A temporary stat change with its origin and remaining lifetime in turns.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedModifier {
    pub source: String,
    pub stat: StatKind,
    pub mode: ModifierMode,
    pub amount: f64,
    pub remaining: u32,
}

/// Net effect of every live modifier on one stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatModifier {
    pub multiplier: f64,
    pub additive: f64,
}

impl Default for StatModifier {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            additive: 0.0,
        }
    }
}

/// Per-stat modifier table. Entries are kept individually so each can expire
/// on its own; the per-stat totals are rebuilt whenever the entry set changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierTable {
    entries: Vec<TimedModifier>,
    totals: HashMap<StatKind, StatModifier>,
}

impl ModifierTable {
    pub fn add(&mut self, modifier: TimedModifier) {
        if modifier.remaining == 0 {
            return;
        }
        self.entries.push(modifier);
        self.rebuild();
    }

    pub fn get(&self, stat: StatKind) -> StatModifier {
        self.totals.get(&stat).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Age every entry by one turn and return the ones that just expired.
    pub fn tick(&mut self) -> Vec<TimedModifier> {
        let mut expired = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.remaining = entry.remaining.saturating_sub(1);
            if entry.remaining == 0 {
                expired.push(entry.clone());
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            self.rebuild();
        }
        expired
    }

    fn rebuild(&mut self) {
        self.totals.clear();
        for entry in &self.entries {
            let total = self.totals.entry(entry.stat).or_default();
            match entry.mode {
                ModifierMode::Additive => total.additive += entry.amount,
                ModifierMode::Multiplicative => total.multiplier += entry.amount,
            }
        }
    }
}

/// Floors applied to record stats that are missing or out of range.
const MIN_MAX_HP: i32 = 1;
const MIN_MAX_MP: i32 = 1;
const MIN_DEFENSE: i32 = 1;

/// Battle-scoped copy of a monster.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub base: StatBlock,
    pub growth: StatBlock,
    pub title_bonus: StatBlock,
    pub hp: u32,
    pub mp: u32,
    /// Primary element first.
    pub elements: Vec<Element>,
    pub resistances: HashMap<Element, i32>,
    pub skills: Vec<SkillInstance>,
    pub statuses: Vec<ActiveStatus>,
    pub modifiers: ModifierTable,
    pub personality: HashMap<SkillCategory, f64>,
}

impl Combatant {
    /// Deep-copy a record into a combatant. Problems with the record are
    /// repaired with safe defaults and returned as anomalies for the caller
    /// to log.
    pub fn from_record(
        record: &MonsterRecord,
        title: Option<&TitleBuff>,
        ruleset: &Ruleset,
    ) -> (Combatant, Vec<EngineAnomaly>) {
        let mut anomalies = Vec::new();
        let base = repair_base_stats(record, &mut anomalies);

        let mut skills = Vec::with_capacity(record.skills.len());
        for skill in &record.skills {
            let instance = if skill.name == BASIC_ATTACK_NAME {
                SkillInstance::new(ruleset.basic_attack().clone(), skill.level)
            } else if let Some(template) = ruleset.skill(&skill.name) {
                SkillInstance::new(template.clone(), skill.level)
            } else {
                anomalies.push(EngineAnomaly::Configuration {
                    combatant: record.name.clone(),
                    skill: skill.name.clone(),
                });
                SkillInstance::new(ruleset.basic_attack().clone(), 1)
            };
            skills.push(SkillInstance {
                enabled: skill.enabled,
                ..instance
            });
        }

        let mut statuses: Vec<ActiveStatus> = Vec::new();
        for status in &record.statuses {
            if ruleset.status(&status.id).is_none() {
                anomalies.push(EngineAnomaly::EffectResolution {
                    source_name: record.name.clone(),
                    kind: "status",
                    id: status.id.clone(),
                });
                continue;
            }
            if status.remaining == 0 || statuses.iter().any(|s| s.id == status.id) {
                continue;
            }
            statuses.push(status.clone());
        }

        let mut combatant = Combatant {
            id: record.id.clone(),
            name: record.name.clone(),
            base,
            growth: record.growth,
            title_bonus: title.map(|t| t.bonus).unwrap_or_default(),
            hp: u32::MAX,
            mp: u32::MAX,
            elements: record.elements.clone(),
            resistances: record.resistances.clone(),
            skills,
            statuses,
            modifiers: ModifierTable::default(),
            personality: record.personality.clone(),
        };

        let resolved = resolve(&combatant, ruleset);
        combatant.hp = record.current_hp.unwrap_or(resolved.max_hp).min(resolved.max_hp);
        combatant.mp = record.current_mp.unwrap_or(resolved.max_mp).min(resolved.max_mp);

        for anomaly in &anomalies {
            tracing::warn!(combatant = %combatant.id, "{anomaly}");
        }
        (combatant, anomalies)
    }

    /// Base + growth + title, before any modifier or status.
    pub fn base_total(&self) -> StatBlock {
        self.base.combined(&self.growth).combined(&self.title_bonus)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn has_status(&self, id: &str) -> bool {
        self.statuses.iter().any(|status| status.id == id)
    }

    pub fn resistance_to(&self, element: Element) -> i32 {
        self.resistances.get(&element).copied().unwrap_or(0)
    }

    /// Personality weight for a skill category; unlisted categories are neutral.
    pub fn affinity(&self, category: SkillCategory) -> f64 {
        self.personality.get(&category).copied().unwrap_or(1.0)
    }

    /// Remove up to `amount` HP and return how much was actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restore up to `amount` HP without exceeding `max_hp`; returns the gain.
    pub fn restore_hp(&mut self, amount: u32, max_hp: u32) -> u32 {
        let gained = amount.min(max_hp.saturating_sub(self.hp));
        self.hp += gained;
        gained
    }

    pub fn spend_mp(&mut self, amount: u32) {
        self.mp = self.mp.saturating_sub(amount);
    }

    /// Pull HP and MP back under their effective maximums after a max-stat
    /// modifier changed.
    pub fn clamp_vitals(&mut self, ruleset: &Ruleset) {
        let resolved = resolve(self, ruleset);
        self.hp = self.hp.min(resolved.max_hp);
        self.mp = self.mp.min(resolved.max_mp);
    }
}

fn repair_base_stats(record: &MonsterRecord, anomalies: &mut Vec<EngineAnomaly>) -> StatBlock {
    let raw = &record.base_stats;
    let mut required = |field: &'static str, value: Option<i32>, minimum: i32| match value {
        Some(value) if value >= minimum => value,
        _ => {
            anomalies.push(EngineAnomaly::InvalidCombatantState {
                combatant: record.name.clone(),
                field,
                default: minimum,
            });
            minimum
        }
    };

    StatBlock {
        max_hp: required("max_hp", raw.max_hp, MIN_MAX_HP),
        max_mp: required("max_mp", raw.max_mp, MIN_MAX_MP),
        attack: required("attack", raw.attack, 0),
        defense: required("defense", raw.defense, MIN_DEFENSE),
        speed: required("speed", raw.speed, 0),
        crit: raw.crit.unwrap_or(0).max(0),
        accuracy: raw.accuracy.unwrap_or(0),
        evasion: raw.evasion.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Tunables;
    use pretty_assertions::assert_eq;
    use schema::{HpTick, StatusTemplate};

    fn ruleset() -> Ruleset {
        Ruleset::new(Tunables::default()).with_status(StatusTemplate {
            id: "poison".to_string(),
            name: "Poison".to_string(),
            hp_per_turn: HpTick::MaxHpPercent(-10),
            stat_deltas: vec![],
            skip_chance: 0,
            vulnerabilities: vec![],
        })
    }

    fn record() -> MonsterRecord {
        MonsterRecord {
            id: "m-1".to_string(),
            name: "Emberfox".to_string(),
            elements: vec![Element::Fire],
            base_stats: RawStats {
                max_hp: Some(100),
                max_mp: Some(40),
                attack: Some(30),
                defense: Some(20),
                speed: Some(15),
                crit: Some(10),
                accuracy: None,
                evasion: None,
            },
            growth: StatBlock {
                attack: 5,
                ..StatBlock::default()
            },
            current_hp: None,
            current_mp: Some(10),
            resistances: HashMap::new(),
            skills: vec![SkillRecord {
                name: "Sun Lance".to_string(),
                level: 3,
                enabled: true,
            }],
            personality: HashMap::new(),
            statuses: vec![
                ActiveStatus {
                    id: "poison".to_string(),
                    remaining: 2,
                },
                ActiveStatus {
                    id: "frostbite".to_string(),
                    remaining: 2,
                },
            ],
        }
    }

    #[test]
    fn test_from_record_repairs_and_reports() {
        let title = TitleBuff {
            title: "Arena Veteran".to_string(),
            bonus: StatBlock {
                defense: 4,
                ..StatBlock::default()
            },
        };
        let (combatant, anomalies) = Combatant::from_record(&record(), Some(&title), &ruleset());

        assert_eq!(combatant.hp, 100);
        assert_eq!(combatant.mp, 10);
        assert_eq!(combatant.base_total().attack, 35);
        assert_eq!(combatant.base_total().defense, 24);
        assert_eq!(combatant.skills.len(), 1);
        assert_eq!(combatant.skills[0].name(), BASIC_ATTACK_NAME);
        assert_eq!(combatant.statuses.len(), 1);
        assert_eq!(
            anomalies,
            vec![
                EngineAnomaly::Configuration {
                    combatant: "Emberfox".to_string(),
                    skill: "Sun Lance".to_string(),
                },
                EngineAnomaly::EffectResolution {
                    source_name: "Emberfox".to_string(),
                    kind: "status",
                    id: "frostbite".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_stats_fall_back_to_minimums() {
        let mut record = record();
        record.base_stats = RawStats::default();
        record.skills.clear();
        record.statuses.clear();
        let (combatant, anomalies) = Combatant::from_record(&record, None, &ruleset());

        assert_eq!(combatant.base.max_hp, 1);
        assert_eq!(combatant.base.max_mp, 1);
        assert_eq!(combatant.base.defense, 1);
        assert_eq!(combatant.hp, 1);
        assert_eq!(anomalies.len(), 5);
    }

    #[test]
    fn test_current_hp_is_clamped_to_max() {
        let mut record = record();
        record.current_hp = Some(5000);
        let (combatant, _) = Combatant::from_record(&record, None, &ruleset());
        assert_eq!(combatant.hp, 100);
    }

    #[test]
    fn test_modifier_table_totals_and_expiry() {
        let mut table = ModifierTable::default();
        table.add(TimedModifier {
            source: "War Cry".to_string(),
            stat: StatKind::Attack,
            mode: ModifierMode::Multiplicative,
            amount: 0.5,
            remaining: 1,
        });
        table.add(TimedModifier {
            source: "Whetstone".to_string(),
            stat: StatKind::Attack,
            mode: ModifierMode::Additive,
            amount: 4.0,
            remaining: 2,
        });
        assert_eq!(
            table.get(StatKind::Attack),
            StatModifier {
                multiplier: 1.5,
                additive: 4.0
            }
        );

        let expired = table.tick();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].source, "War Cry");
        assert_eq!(table.get(StatKind::Attack).multiplier, 1.0);

        assert_eq!(table.tick().len(), 1);
        assert!(table.is_empty());
        assert_eq!(table.get(StatKind::Attack), StatModifier::default());
    }

    #[test]
    fn test_hp_helpers_clamp() {
        let (mut combatant, _) = Combatant::from_record(&record(), None, &ruleset());
        assert_eq!(combatant.take_damage(30), 30);
        assert_eq!(combatant.restore_hp(50, 100), 30);
        assert_eq!(combatant.take_damage(500), 100);
        assert!(combatant.is_defeated());
    }
}
