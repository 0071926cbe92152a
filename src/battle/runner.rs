use crate::battle::ai::{Behavior, PersonalityAI};
use crate::battle::engine::resolve_turn;
use crate::battle::highlights::extract_highlights;
use crate::battle::state::{BattleEvent, BattleState, GameState, TurnRng};
use crate::battle::stats::resolve;
use crate::combatant::{Combatant, MonsterRecord, TitleBuff};
use crate::errors::{BattleResult, RulesetResult};
use crate::ruleset::{read_ron, Ruleset};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One side as handed in by the caller: a monster snapshot and the owner's
/// title, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub record: MonsterRecord,
    #[serde(default)]
    pub title: Option<TitleBuff>,
}

/// A pairing stored on disk, challenger first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleCard {
    pub challenger: Entrant,
    pub defender: Entrant,
}

impl BattleCard {
    pub fn load(path: &Path) -> RulesetResult<Self> {
        read_ron(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory { winner_id: String, loser_id: String },
    Draw,
}

/// Per-skill progress for the settlement step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub name: String,
    pub level: u32,
    pub uses: u32,
    pub enabled: bool,
}

/// Final snapshot of one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSummary {
    pub id: String,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub skills: Vec<SkillProgress>,
    pub statuses: Vec<String>,
}

/// Everything a finished battle hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub turns: u32,
    /// Challenger first.
    pub combatants: [CombatantSummary; 2],
    pub log: Vec<String>,
    pub highlights: Vec<String>,
}

impl BattleReport {
    pub fn is_draw(&self) -> bool {
        matches!(self.outcome, BattleOutcome::Draw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Drives whole battles to completion against one shared ruleset.
pub struct BattleRunner<'r> {
    ruleset: &'r Ruleset,
    behavior: Box<dyn Behavior + 'r>,
}

impl<'r> BattleRunner<'r> {
    /// The ruleset is validated once here; a runner never starts a battle
    /// under rules it cannot honour.
    pub fn new(ruleset: &'r Ruleset) -> BattleResult<Self> {
        ruleset.validate()?;
        Ok(Self {
            ruleset,
            behavior: Box::new(PersonalityAI::new()),
        })
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'r) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    /// Build both combatants from their records and fight it out. The
    /// records are only read.
    pub fn simulate(&self, challenger: &Entrant, defender: &Entrant, rng: TurnRng) -> BattleReport {
        let (challenger, mut anomalies) =
            Combatant::from_record(&challenger.record, challenger.title.as_ref(), self.ruleset);
        let (defender, defender_anomalies) =
            Combatant::from_record(&defender.record, defender.title.as_ref(), self.ruleset);
        anomalies.extend(defender_anomalies);

        let warnings = anomalies
            .into_iter()
            .map(|anomaly| BattleEvent::Warning {
                message: anomaly.to_string(),
            })
            .collect();
        self.run(BattleState::new(challenger, defender), warnings, rng)
    }

    /// Fight two already-built combatants.
    pub fn simulate_combatants(&self, challenger: Combatant, defender: Combatant, rng: TurnRng) -> BattleReport {
        self.run(BattleState::new(challenger, defender), Vec::new(), rng)
    }

    fn run(&self, mut battle_state: BattleState, preamble: Vec<BattleEvent>, mut rng: TurnRng) -> BattleReport {
        let max_turns = self.ruleset.tunables().max_turns;
        let mut accumulated_events = preamble;
        accumulated_events.push(BattleEvent::BattleStarted {
            challenger: battle_state.combatants[0].name.clone(),
            defender: battle_state.combatants[1].name.clone(),
        });
        tracing::info!(
            challenger = %battle_state.combatants[0].id,
            defender = %battle_state.combatants[1].id,
            max_turns,
            "battle started"
        );

        for turn in 1..=max_turns {
            battle_state.turn_number = turn;
            let bus = resolve_turn(&mut battle_state, self.ruleset, self.behavior.as_ref(), &mut rng);
            accumulated_events.extend(bus.events().iter().cloned());
            if battle_state.game_state.is_terminal() {
                break;
            }
        }

        if !battle_state.game_state.is_terminal() {
            battle_state.game_state = GameState::Draw;
            accumulated_events.push(BattleEvent::TurnLimitReached { max_turns });
            accumulated_events.push(BattleEvent::BattleEnded { winner: None });
            tracing::info!(max_turns, "turn limit reached, battle drawn");
        }

        self.build_report(&battle_state, &accumulated_events)
    }

    fn build_report(&self, battle_state: &BattleState, events: &[BattleEvent]) -> BattleReport {
        let log: Vec<String> = events.iter().filter_map(BattleEvent::format).collect();
        let highlights = extract_highlights(&log, self.ruleset);
        let [challenger, defender] = &battle_state.combatants;

        let (outcome, winner_id, loser_id) = match battle_state.game_state {
            GameState::Victory { winner, loser } => {
                let winner_id = battle_state.combatants[winner].id.clone();
                let loser_id = battle_state.combatants[loser].id.clone();
                (
                    BattleOutcome::Victory {
                        winner_id: winner_id.clone(),
                        loser_id: loser_id.clone(),
                    },
                    Some(winner_id),
                    Some(loser_id),
                )
            }
            GameState::Draw | GameState::Running => (BattleOutcome::Draw, None, None),
        };

        BattleReport {
            outcome,
            winner_id,
            loser_id,
            turns: battle_state.turn_number,
            combatants: [
                self.summarize(challenger),
                self.summarize(defender),
            ],
            log,
            highlights,
        }
    }

    fn summarize(&self, combatant: &Combatant) -> CombatantSummary {
        let resolved = resolve(combatant, self.ruleset);
        CombatantSummary {
            id: combatant.id.clone(),
            name: combatant.name.clone(),
            hp: resolved.hp,
            max_hp: resolved.max_hp,
            mp: resolved.mp,
            max_mp: resolved.max_mp,
            skills: combatant
                .skills
                .iter()
                .map(|skill| SkillProgress {
                    name: skill.name().to_string(),
                    level: skill.level,
                    uses: skill.uses,
                    enabled: skill.enabled,
                })
                .collect(),
            statuses: combatant.statuses.iter().map(|s| s.id.clone()).collect(),
        }
    }
}
