//! Creature Arena Battle Engine
//!
//! A turn-based creature battle simulator. Two monster snapshots and a shared
//! ruleset go in; a deterministic (for a given seed) fight is resolved to a
//! win, loss or draw, and a structured report with a readable log comes out.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod errors;
pub mod ruleset;
pub mod skill_level;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    DurationSpec, Element, HealAmount, HpTick, ModifierMode, SkillCategory, SkillEffect,
    SkillTemplate, SpecialEffect, StatBlock, StatDelta, StatKind, StatusTemplate, Target,
    WeatherTemplate,
};

// --- From this crate's modules (`src/`) ---

// Battle driving and results.
pub use battle::ai::{Behavior, ChosenSkill, PersonalityAI};
pub use battle::engine::{determine_turn_order, resolve_turn};
pub use battle::runner::{
    BattleCard, BattleOutcome, BattleReport, BattleRunner, CombatantSummary, Entrant, SkillProgress,
};
pub use battle::state::{BattleEvent, BattleState, EventBus, GameState, TurnRng};
pub use battle::stats::{resolve, ResolvedStats};

// Battle-scoped combatants and their external records.
pub use combatant::{ActiveStatus, Combatant, MonsterRecord, RawStats, SkillRecord, TitleBuff};

// Rules.
pub use ruleset::{Matchup, Ruleset, Tunables};

// Crate-specific error and result types.
pub use errors::{BattleEngineError, BattleResult, EngineAnomaly, RulesetError, RulesetResult};
