use crate::battle::state::{BattleState, TurnRng};
use crate::combatant::{ActiveStatus, Combatant, ModifierTable, SkillInstance};
use crate::ruleset::{Ruleset, Tunables};
use schema::{
    DurationSpec, Element, HealAmount, HpTick, ModifierMode, SkillCategory, SkillEffect,
    SkillTemplate, SpecialEffect, StatBlock, StatDelta, StatKind, StatusTemplate, Target,
    WeatherTemplate,
};
use std::collections::HashMap;

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let combatant = TestCombatantBuilder::new("m-1", "Emberfox")
///     .with_skill(skill("Ember"), 1)
///     .with_status("poison", 2)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    id: String,
    name: String,
    base: StatBlock,
    growth: StatBlock,
    title_bonus: StatBlock,
    hp: Option<u32>,
    mp: Option<u32>,
    elements: Vec<Element>,
    resistances: HashMap<Element, i32>,
    skills: Vec<SkillInstance>,
    statuses: Vec<ActiveStatus>,
    personality: HashMap<SkillCategory, f64>,
}

impl TestCombatantBuilder {
    /// 100 HP, 50 MP, 30 attack, 20 defense, 20 speed, no crit.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            base: StatBlock {
                max_hp: 100,
                max_mp: 50,
                attack: 30,
                defense: 20,
                speed: 20,
                crit: 0,
                accuracy: 0,
                evasion: 0,
            },
            growth: StatBlock::default(),
            title_bonus: StatBlock::default(),
            hp: None,
            mp: None,
            elements: Vec::new(),
            resistances: HashMap::new(),
            skills: Vec::new(),
            statuses: Vec::new(),
            personality: HashMap::new(),
        }
    }

    pub fn with_max_hp(mut self, max_hp: i32) -> Self {
        self.base.max_hp = max_hp;
        self
    }

    pub fn with_max_mp(mut self, max_mp: i32) -> Self {
        self.base.max_mp = max_mp;
        self
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.base.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.base.defense = defense;
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.base.speed = speed;
        self
    }

    pub fn with_crit(mut self, crit: i32) -> Self {
        self.base.crit = crit;
        self
    }

    pub fn with_evasion(mut self, evasion: i32) -> Self {
        self.base.evasion = evasion;
        self
    }

    pub fn with_growth(mut self, growth: StatBlock) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_title_bonus(mut self, bonus: StatBlock) -> Self {
        self.title_bonus = bonus;
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_mp(mut self, mp: u32) -> Self {
        self.mp = Some(mp);
        self
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_resistance(mut self, element: Element, percent: i32) -> Self {
        self.resistances.insert(element, percent);
        self
    }

    pub fn with_skill(mut self, template: SkillTemplate, level: u32) -> Self {
        self.skills.push(SkillInstance::new(template, level));
        self
    }

    pub fn with_status(mut self, id: &str, remaining: u32) -> Self {
        self.statuses.push(ActiveStatus {
            id: id.to_string(),
            remaining,
        });
        self
    }

    pub fn with_personality(mut self, category: SkillCategory, affinity: f64) -> Self {
        self.personality.insert(category, affinity);
        self
    }

    pub fn build(self) -> Combatant {
        let max_hp = (self.base.max_hp + self.growth.max_hp + self.title_bonus.max_hp).max(1) as u32;
        let max_mp = (self.base.max_mp + self.growth.max_mp + self.title_bonus.max_mp).max(1) as u32;
        Combatant {
            id: self.id,
            name: self.name,
            base: self.base,
            growth: self.growth,
            title_bonus: self.title_bonus,
            hp: self.hp.unwrap_or(max_hp).min(max_hp),
            mp: self.mp.unwrap_or(max_mp).min(max_mp),
            elements: self.elements,
            resistances: self.resistances,
            skills: self.skills,
            statuses: self.statuses,
            modifiers: ModifierTable::default(),
            personality: self.personality,
        }
    }
}

pub fn create_test_battle(challenger: Combatant, defender: Combatant) -> BattleState {
    let mut state = BattleState::new(challenger, defender);
    state.turn_number = 1;
    state
}

pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50])
}

fn template(
    name: &str,
    element: Option<Element>,
    category: SkillCategory,
    power: u32,
    mp_cost: u32,
    effects: Vec<SkillEffect>,
) -> SkillTemplate {
    SkillTemplate {
        name: name.to_string(),
        element,
        category,
        power,
        accuracy: 100,
        mp_cost,
        priority: 0,
        bonus_crit: 0,
        always_hits: false,
        effects,
    }
}

fn damage() -> SkillEffect {
    SkillEffect::Damage {
        target: Target::Opponent,
        power: None,
    }
}

fn status(id: &str, name: &str) -> StatusTemplate {
    StatusTemplate {
        id: id.to_string(),
        name: name.to_string(),
        hp_per_turn: HpTick::None,
        stat_deltas: vec![],
        skip_chance: 0,
        vulnerabilities: vec![],
    }
}

/// A compact ruleset covering every effect kind, independent of `data/`.
pub fn test_ruleset() -> Ruleset {
    test_ruleset_with(Tunables::default())
}

pub fn test_ruleset_with(tunables: Tunables) -> Ruleset {
    Ruleset::new(tunables)
        .with_matchup(Element::Fire, Element::Wood, 1.5)
        .with_matchup(Element::Fire, Element::Water, 0.5)
        .with_matchup(Element::Water, Element::Fire, 1.5)
        .with_matchup(Element::Wood, Element::Water, 1.5)
        .with_status(StatusTemplate {
            skip_chance: 100,
            ..status("stun", "Stun")
        })
        .with_status(StatusTemplate {
            hp_per_turn: HpTick::MaxHpPercent(-10),
            ..status("poison", "Poison")
        })
        .with_status(StatusTemplate {
            stat_deltas: vec![(StatKind::Speed, -10), (StatKind::Defense, -5)],
            ..status("chill", "Chill")
        })
        .with_status(StatusTemplate {
            vulnerabilities: vec![(Element::Thunder, 1.5)],
            ..status("soaked", "Soaked")
        })
        .with_status(StatusTemplate {
            hp_per_turn: HpTick::MaxHpPercent(5),
            ..status("regen", "Regeneration")
        })
        .with_weather(WeatherTemplate {
            id: "sandstorm".to_string(),
            name: "Sandstorm".to_string(),
            damage_percent: 6,
            immune_elements: vec![Element::Earth, Element::Metal],
        })
        .with_skill(template("Ember", Some(Element::Fire), SkillCategory::Attack, 40, 10, vec![damage()]))
        .with_skill(template("Inferno", Some(Element::Fire), SkillCategory::Attack, 90, 30, vec![damage()]))
        .with_skill(template("Spark", Some(Element::Thunder), SkillCategory::Attack, 20, 5, vec![damage()]))
        .with_skill(template(
            "Mend",
            None,
            SkillCategory::Heal,
            0,
            5,
            vec![SkillEffect::Heal {
                target: Target::User,
                amount: HealAmount::MaxHpPercent(30),
            }],
        ))
        .with_skill(template(
            "Thunder Clap",
            Some(Element::Thunder),
            SkillCategory::Control,
            0,
            8,
            vec![SkillEffect::ApplyStatus {
                target: Target::Opponent,
                status: "stun".to_string(),
                chance: 100,
                duration: DurationSpec::Fixed(2),
            }],
        ))
        .with_skill(template(
            "Toxic Spore",
            Some(Element::Wood),
            SkillCategory::Control,
            0,
            8,
            vec![SkillEffect::ApplyStatus {
                target: Target::Opponent,
                status: "poison".to_string(),
                chance: 50,
                duration: DurationSpec::Range(2, 4),
            }],
        ))
        .with_skill(template(
            "War Cry",
            None,
            SkillCategory::Support,
            0,
            6,
            vec![SkillEffect::StatChange {
                target: Target::User,
                changes: vec![StatDelta {
                    stat: StatKind::Attack,
                    mode: ModifierMode::Additive,
                    amount: 10.0,
                }],
                duration: 3,
                chance: 100,
            }],
        ))
        .with_skill(template(
            "Rust Bite",
            Some(Element::Metal),
            SkillCategory::Attack,
            30,
            6,
            vec![
                damage(),
                SkillEffect::StatChange {
                    target: Target::Opponent,
                    changes: vec![StatDelta {
                        stat: StatKind::Defense,
                        mode: ModifierMode::Multiplicative,
                        amount: -0.25,
                    }],
                    duration: 2,
                    chance: 30,
                },
            ],
        ))
        .with_skill(template(
            "Dust Devil",
            Some(Element::Earth),
            SkillCategory::Utility,
            0,
            10,
            vec![SkillEffect::Special(SpecialEffect::Weather {
                weather: "sandstorm".to_string(),
                duration: 4,
            })],
        ))
        .with_skill(template(
            "Reckless Charge",
            None,
            SkillCategory::Attack,
            60,
            8,
            vec![damage(), SkillEffect::Special(SpecialEffect::Recoil(0.25))],
        ))
        .with_skill(template(
            "Drain Fang",
            Some(Element::Dark),
            SkillCategory::Attack,
            30,
            8,
            vec![damage(), SkillEffect::Special(SpecialEffect::Leech(0.5))],
        ))
        .with_skill(SkillTemplate {
            always_hits: true,
            ..template(
                "Last Stand",
                None,
                SkillCategory::Attack,
                0,
                0,
                vec![SkillEffect::Special(SpecialEffect::SelfSacrifice)],
            )
        })
}

/// A skill template from [`test_ruleset`].
pub fn skill(name: &str) -> SkillTemplate {
    match test_ruleset().skill(name) {
        Some(template) => template.clone(),
        None => panic!("test ruleset has no skill named {}", name),
    }
}
