use crate::combatant::Combatant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::StatKind;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Copy)]
pub enum GameState {
    Running,
    Victory { winner: usize, loser: usize },
    Draw,
}

impl GameState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameState::Running)
    }
}

/// What one effect of a skill use did. A skill use collects these and emits
/// them as a single [`BattleEvent::SkillUsed`] line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EffectOutcome {
    Missed {
        target: String,
    },
    Damage {
        target: String,
        amount: u32,
        critical: bool,
        effectiveness: f64,
    },
    StatusApplied {
        target: String,
        status_name: String,
    },
    StatusResisted {
        target: String,
        status_name: String,
    },
    StatusAlreadyActive {
        target: String,
        status_name: String,
    },
    StatChanged {
        target: String,
        stat: StatKind,
        rose: bool,
    },
    StatChangeFailed {
        target: String,
    },
    Healed {
        target: String,
        amount: u32,
    },
    Recoil {
        performer: String,
        amount: u32,
    },
    Leech {
        performer: String,
        amount: u32,
    },
    WeatherStarted {
        weather_name: String,
    },
    DefenseIgnored,
    SelfSacrifice {
        performer: String,
    },
    Failed,
}

impl EffectOutcome {
    pub fn format(&self) -> String {
        match self {
            EffectOutcome::Missed { target } => format!("{} dodged the attack!", target),
            EffectOutcome::Damage {
                target,
                amount,
                critical,
                effectiveness,
            } => {
                let mut text = String::new();
                if *critical {
                    text.push_str("A critical hit! ");
                }
                text.push_str(&format!("{} took {} damage.", target, amount));
                if let Some(note) = Self::effectiveness_note(*effectiveness) {
                    text.push(' ');
                    text.push_str(note);
                }
                text
            }
            EffectOutcome::StatusApplied {
                target,
                status_name,
            } => format!("{} is afflicted with {}!", target, status_name),
            EffectOutcome::StatusResisted {
                target,
                status_name,
            } => format!("{} resisted {}.", target, status_name),
            EffectOutcome::StatusAlreadyActive {
                target,
                status_name,
            } => format!("{} is already affected by {}.", target, status_name),
            EffectOutcome::StatChanged { target, stat, rose } => {
                let direction = if *rose { "rose" } else { "fell" };
                format!("{}'s {} {}!", target, stat, direction)
            }
            EffectOutcome::StatChangeFailed { target } => {
                format!("{}'s stats were unaffected.", target)
            }
            EffectOutcome::Healed { target, amount } => {
                format!("{} recovered {} HP.", target, amount)
            }
            EffectOutcome::Recoil { performer, amount } => {
                format!("{} is hurt by recoil for {} damage.", performer, amount)
            }
            EffectOutcome::Leech { performer, amount } => {
                format!("{} drained {} HP.", performer, amount)
            }
            EffectOutcome::WeatherStarted { weather_name } => {
                format!("A {} began!", weather_name)
            }
            EffectOutcome::DefenseIgnored => "The blow pierced straight through defenses.".to_string(),
            EffectOutcome::SelfSacrifice { performer } => {
                format!("{} gave everything, bringing both fighters down!", performer)
            }
            EffectOutcome::Failed => "But nothing happened.".to_string(),
        }
    }

    fn effectiveness_note(multiplier: f64) -> Option<&'static str> {
        if multiplier == 0.0 {
            Some("It barely had any effect...")
        } else if multiplier > 1.0 {
            Some("It's super effective!")
        } else if multiplier < 1.0 {
            Some("It's not very effective...")
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle lifecycle
    BattleStarted {
        challenger: String,
        defender: String,
    },
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded,
    TurnLimitReached {
        max_turns: u32,
    },
    Defeated {
        combatant: String,
    },
    BattleEnded {
        winner: Option<String>,
    },

    // Actions
    SkillUsed {
        combatant: String,
        skill: String,
        outcomes: Vec<EffectOutcome>,
    },

    // Status conditions
    StatusSkippedTurn {
        combatant: String,
        status_name: String,
    },
    StatusHpChanged {
        combatant: String,
        status_name: String,
        delta: i64,
    },
    StatusExpired {
        combatant: String,
        status_name: String,
    },

    // Field
    WeatherDamage {
        combatant: String,
        weather_name: String,
        damage: u32,
    },
    WeatherImmune {
        combatant: String,
        weather_name: String,
    },
    WeatherSubsided {
        weather_name: String,
    },

    ModifierExpired {
        combatant: String,
        stat: StatKind,
        source: String,
    },

    /// A recovered anomaly; the text is the anomaly's message.
    Warning {
        message: String,
    },
}

impl BattleEvent {
    /// Formats the event into a log line.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted {
                challenger,
                defender,
            } => Some(format!("{} challenges {} to battle!", challenger, defender)),
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::TurnEnded => None,
            BattleEvent::TurnLimitReached { max_turns } => Some(format!(
                "Neither side fell within {} turns.",
                max_turns
            )),
            BattleEvent::Defeated { combatant } => Some(format!("{} was defeated!", combatant)),
            BattleEvent::BattleEnded { winner } => Some(match winner {
                Some(winner) => format!("{} won the battle!", winner),
                None => "The battle ended in a draw!".to_string(),
            }),

            BattleEvent::SkillUsed {
                combatant,
                skill,
                outcomes,
            } => {
                let mut line = format!("{} used {}!", combatant, skill);
                for outcome in outcomes {
                    line.push(' ');
                    line.push_str(&outcome.format());
                }
                Some(line)
            }

            BattleEvent::StatusSkippedTurn {
                combatant,
                status_name,
            } => Some(format!(
                "{} is held back by {} and cannot act!",
                combatant, status_name
            )),
            BattleEvent::StatusHpChanged {
                combatant,
                status_name,
                delta,
            } => Some(if *delta < 0 {
                format!("{} lost {} HP from {}.", combatant, -delta, status_name)
            } else {
                format!("{} regained {} HP from {}.", combatant, delta, status_name)
            }),
            BattleEvent::StatusExpired {
                combatant,
                status_name,
            } => Some(format!("{}'s {} wore off.", combatant, status_name)),

            BattleEvent::WeatherDamage {
                combatant,
                weather_name,
                damage,
            } => Some(format!(
                "{} is buffeted by the {} for {} damage.",
                combatant, weather_name, damage
            )),
            BattleEvent::WeatherImmune {
                combatant,
                weather_name,
            } => Some(format!("{} is unaffected by the {}.", combatant, weather_name)),
            BattleEvent::WeatherSubsided { weather_name } => {
                Some(format!("The {} subsided.", weather_name))
            }

            BattleEvent::ModifierExpired {
                combatant,
                stat,
                source,
            } => Some(format!(
                "{}'s {} change from {} wore off.",
                combatant, stat, source
            )),

            BattleEvent::Warning { message } => Some(format!("[warning] {}", message)),
        }
    }
}

/// Event bus for collecting battle events in the order they happened.
///
/// ```rust,ignore
/// event_bus.print_debug_with_message("Turn 1 events:");
/// let log: Vec<String> = event_bus.lines();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// The formatted log, skipping silent events.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print all events in debug format with a custom prefix message.
    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        self.print_debug();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    /// Test outcomes, cycled when exhausted.
    Scripted { outcomes: Vec<u8>, index: usize },
}

/// The only source of randomness a battle consults.
///
/// Every draw carries a reason so a scripted run can be traced draw by draw.
/// Rolls at or beyond certainty (chance <= 0 or >= 100) do not consume a
/// draw.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Scripted outcomes in 1..=100. An empty script behaves as a constant 50.
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        let outcomes = if outcomes.is_empty() { vec![50] } else { outcomes };
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// A percent draw in 1..=100.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(1..=100u8),
            RngSource::Scripted { outcomes, index } => {
                let outcome = outcomes[*index % outcomes.len()].clamp(1, 100);
                *index += 1;
                outcome
            }
        };
        tracing::trace!(reason, outcome, "rng draw");
        outcome
    }

    /// Succeeds when the percent draw is at most `chance`.
    pub fn roll(&mut self, chance: f64, reason: &str) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 100.0 {
            return true;
        }
        self.next_outcome(reason) as f64 <= chance
    }

    /// Uniform draw from `low..=high`.
    pub fn range_inclusive(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        if low == high {
            return low;
        }
        if let RngSource::Seeded(rng) = &mut self.source {
            let value = rng.random_range(low..=high);
            tracing::trace!(reason, value, "rng range draw");
            return value;
        }
        let span = (high - low) as u64 + 1;
        let outcome = self.next_outcome(reason) as u64;
        low + ((outcome - 1) * span / 100).min(span - 1) as u32
    }

    /// Index drawn with probability proportional to its weight. None when
    /// every weight is zero.
    pub fn pick_weighted(&mut self, weights: &[u32], reason: &str) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return None;
        }
        let point = if let RngSource::Seeded(rng) = &mut self.source {
            rng.random_range(0..total)
        } else {
            let outcome = self.next_outcome(reason) as u64;
            ((outcome - 1) * total / 100).min(total - 1)
        };
        tracing::trace!(reason, point, total, "rng weighted pick");

        let mut cumulative = 0u64;
        for (index, &weight) in weights.iter().enumerate() {
            cumulative += weight as u64;
            if point < cumulative {
                return Some(index);
            }
        }
        None
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActiveWeather {
    pub id: String,
    pub remaining: u32,
}

/// Everything a running battle owns. Index 0 is the challenger.
#[derive(Debug, Clone)]
pub struct BattleState {
    pub combatants: [Combatant; 2],
    pub turn_number: u32,
    pub weather: Option<ActiveWeather>,
    pub game_state: GameState,
}

impl BattleState {
    pub fn new(challenger: Combatant, defender: Combatant) -> Self {
        Self {
            combatants: [challenger, defender],
            turn_number: 0,
            weather: None,
            game_state: GameState::Running,
        }
    }

    pub fn opponent_of(index: usize) -> usize {
        1 - index
    }
}
