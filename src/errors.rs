use std::path::PathBuf;

/// Main error type for the Creature Arena battle engine.
///
/// Only precondition failures surface here. Anything that goes wrong while a
/// battle is running degrades to an [`EngineAnomaly`] that is logged and
/// recovered from.
#[derive(Debug, thiserror::Error)]
pub enum BattleEngineError {
    /// The ruleset could not be loaded or failed validation
    #[error("ruleset error: {0}")]
    Ruleset(#[from] RulesetError),
}

/// Errors related to loading and validating the ruleset
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// A ruleset file or directory could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A ruleset file is not valid RON for its expected shape
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    /// A tunable holds a value the engine cannot run with
    #[error("invalid tunable `{name}`: {reason}")]
    InvalidTunable { name: &'static str, reason: String },
    /// An elemental matchup has a negative multiplier
    #[error("invalid matchup {attacker} -> {defender}: multiplier {multiplier}")]
    InvalidMatchup {
        attacker: schema::Element,
        defender: schema::Element,
        multiplier: f64,
    },
    /// Two catalog entries share the same key
    #[error("duplicate {kind} entry `{key}`")]
    Duplicate { kind: &'static str, key: String },
}

/// Non-fatal problems found while building or running a battle.
///
/// Each one is turned into a warning in the battle log and a `tracing`
/// warning, and the engine continues with a safe default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineAnomaly {
    /// A combatant references a skill the ruleset does not know
    #[error("{combatant} knows unknown skill `{skill}`, substituting the basic attack")]
    Configuration { combatant: String, skill: String },
    /// A combatant record is missing a required numeric field
    #[error("{combatant} has no usable `{field}`, defaulting to {default}")]
    InvalidCombatantState {
        combatant: String,
        field: &'static str,
        default: i32,
    },
    /// An effect references a status or weather the ruleset does not know
    #[error("{source_name} references unknown {kind} `{id}`, effect skipped")]
    EffectResolution {
        source_name: String,
        kind: &'static str,
        id: String,
    },
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using RulesetError
pub type RulesetResult<T> = Result<T, RulesetError>;
