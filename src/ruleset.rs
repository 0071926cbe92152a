//! The immutable rules a battle is fought under.
//!
//! A [`Ruleset`] is loaded once per process (usually from the `data/`
//! directory) and then shared by reference across any number of simulations.
//! It holds no interior mutability, so it is `Send + Sync` and safe to read
//! from several threads at once.

use crate::errors::{RulesetError, RulesetResult};
use schema::{Element, SkillTemplate, StatusTemplate, WeatherTemplate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Global numeric knobs. Every field has a default so a data file only needs
/// to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub max_turns: u32,
    pub crit_multiplier: f64,
    /// Hard ceiling on effective crit chance, in percent.
    pub crit_cap: f64,
    pub min_hit_chance: f64,
    pub max_hit_chance: f64,
    /// K1 in `power * (atk / def) * K1 + atk * K2`.
    pub damage_ratio_factor: f64,
    /// K2 in `power * (atk / def) * K1 + atk * K2`.
    pub damage_attack_factor: f64,
    pub basic_attack_power: u32,
    /// Percent chance the action selector consults personality at all.
    pub personality_roll_chance: u8,
    /// HP fraction under which supportive skills get boosted weight.
    pub low_hp_threshold: f64,
    pub support_weight_scale: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            max_turns: 30,
            crit_multiplier: 1.5,
            crit_cap: 50.0,
            min_hit_chance: 5.0,
            max_hit_chance: 95.0,
            damage_ratio_factor: 0.5,
            damage_attack_factor: 0.2,
            basic_attack_power: 20,
            personality_roll_chance: 50,
            low_hp_threshold: 0.4,
            support_weight_scale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub attacker: Element,
    pub defender: Element,
    pub multiplier: f64,
}

/// Shape of `ruleset.ron`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RulesetFile {
    tunables: Tunables,
    matchups: Vec<Matchup>,
    weathers: Vec<WeatherTemplate>,
}

#[derive(Debug, Clone)]
pub struct Ruleset {
    tunables: Tunables,
    chart: HashMap<(Element, Element), f64>,
    skills: HashMap<String, SkillTemplate>,
    /// Catalog order matters: statuses tick in this order.
    statuses: Vec<StatusTemplate>,
    status_index: HashMap<String, usize>,
    weathers: HashMap<String, WeatherTemplate>,
    basic_attack: SkillTemplate,
}

impl Ruleset {
    /// Create an empty ruleset with the given tunables. Catalogs are filled
    /// with the `with_*` builders.
    pub fn new(tunables: Tunables) -> Self {
        let basic_attack = SkillTemplate::basic_attack(tunables.basic_attack_power);
        Self {
            tunables,
            chart: HashMap::new(),
            skills: HashMap::new(),
            statuses: Vec::new(),
            status_index: HashMap::new(),
            weathers: HashMap::new(),
            basic_attack,
        }
    }

    pub fn with_matchup(mut self, attacker: Element, defender: Element, multiplier: f64) -> Self {
        self.chart.insert((attacker, defender), multiplier);
        self
    }

    pub fn with_skill(mut self, skill: SkillTemplate) -> Self {
        self.skills.insert(skill.name.clone(), skill);
        self
    }

    /// Append a status to the end of the catalog. Re-adding an id replaces the
    /// entry in place and keeps its position.
    pub fn with_status(mut self, status: StatusTemplate) -> Self {
        match self.status_index.get(&status.id) {
            Some(&index) => self.statuses[index] = status,
            None => {
                self.status_index
                    .insert(status.id.clone(), self.statuses.len());
                self.statuses.push(status);
            }
        }
        self
    }

    pub fn with_weather(mut self, weather: WeatherTemplate) -> Self {
        self.weathers.insert(weather.id.clone(), weather);
        self
    }

    /// Load a ruleset from a data directory laid out as:
    ///
    /// ```text
    /// data/ruleset.ron        tunables, matchups, weathers
    /// data/skills/*.ron       one SkillTemplate per file
    /// data/statuses/*.ron     one StatusTemplate per file, ticked in file-name order
    /// ```
    pub fn load(data_path: &Path) -> RulesetResult<Ruleset> {
        let ruleset_file: RulesetFile = read_ron(&data_path.join("ruleset.ron"))?;

        let mut ruleset = Ruleset::new(ruleset_file.tunables);
        for matchup in ruleset_file.matchups {
            ruleset = ruleset.with_matchup(matchup.attacker, matchup.defender, matchup.multiplier);
        }
        for weather in ruleset_file.weathers {
            if ruleset.weathers.contains_key(&weather.id) {
                return Err(RulesetError::Duplicate {
                    kind: "weather",
                    key: weather.id,
                });
            }
            ruleset = ruleset.with_weather(weather);
        }

        for path in ron_files_in(&data_path.join("skills"))? {
            let skill: SkillTemplate = read_ron(&path)?;
            if ruleset.skills.contains_key(&skill.name) {
                return Err(RulesetError::Duplicate {
                    kind: "skill",
                    key: skill.name,
                });
            }
            ruleset = ruleset.with_skill(skill);
        }

        for path in ron_files_in(&data_path.join("statuses"))? {
            let status: StatusTemplate = read_ron(&path)?;
            if ruleset.status_index.contains_key(&status.id) {
                return Err(RulesetError::Duplicate {
                    kind: "status",
                    key: status.id,
                });
            }
            ruleset = ruleset.with_status(status);
        }

        ruleset.validate()?;
        tracing::info!(
            skills = ruleset.skills.len(),
            statuses = ruleset.statuses.len(),
            weathers = ruleset.weathers.len(),
            matchups = ruleset.chart.len(),
            "loaded ruleset from {}",
            data_path.display()
        );
        Ok(ruleset)
    }

    /// Precondition check run before any simulation starts.
    pub fn validate(&self) -> RulesetResult<()> {
        let t = &self.tunables;
        if t.max_turns == 0 {
            return Err(invalid("max_turns", "must be at least 1"));
        }
        if !(t.crit_multiplier >= 1.0) {
            return Err(invalid("crit_multiplier", "must be at least 1.0"));
        }
        if !(t.crit_cap >= 0.0 && t.crit_cap <= 100.0) {
            return Err(invalid("crit_cap", "must be within 0..=100"));
        }
        if !(t.min_hit_chance >= 0.0 && t.min_hit_chance <= t.max_hit_chance && t.max_hit_chance <= 100.0) {
            return Err(invalid(
                "min_hit_chance",
                "hit chance bounds must satisfy 0 <= min <= max <= 100",
            ));
        }
        if t.personality_roll_chance > 100 {
            return Err(invalid("personality_roll_chance", "must be within 0..=100"));
        }
        if !(t.support_weight_scale > 0.0) {
            return Err(invalid("support_weight_scale", "must be positive"));
        }
        for (&(attacker, defender), &multiplier) in &self.chart {
            if !(multiplier >= 0.0) {
                return Err(RulesetError::InvalidMatchup {
                    attacker,
                    defender,
                    multiplier,
                });
            }
        }
        Ok(())
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Attacker-element versus a single defender element; unlisted pairs are neutral.
    pub fn matchup(&self, attacker: Element, defender: Element) -> f64 {
        self.chart.get(&(attacker, defender)).copied().unwrap_or(1.0)
    }

    /// Product of the matchups against every element the defender carries.
    /// Elementless skills are always neutral.
    pub fn elemental_multiplier(&self, attacker: Option<Element>, defender: &[Element]) -> f64 {
        match attacker {
            Some(attacker) => defender
                .iter()
                .map(|&element| self.matchup(attacker, element))
                .product(),
            None => 1.0,
        }
    }

    pub fn skill(&self, name: &str) -> Option<&SkillTemplate> {
        self.skills.get(name)
    }

    pub fn basic_attack(&self) -> &SkillTemplate {
        &self.basic_attack
    }

    pub fn status(&self, id: &str) -> Option<&StatusTemplate> {
        self.status_index.get(id).map(|&index| &self.statuses[index])
    }

    /// Position of a status in the catalog, used to order the turn-start pass.
    pub fn status_order(&self, id: &str) -> Option<usize> {
        self.status_index.get(id).copied()
    }

    pub fn statuses(&self) -> &[StatusTemplate] {
        &self.statuses
    }

    pub fn weather(&self, id: &str) -> Option<&WeatherTemplate> {
        self.weathers.get(id)
    }
}

fn invalid(name: &'static str, reason: &str) -> RulesetError {
    RulesetError::InvalidTunable {
        name,
        reason: reason.to_string(),
    }
}

pub(crate) fn read_ron<T: serde::de::DeserializeOwned>(path: &Path) -> RulesetResult<T> {
    let content = fs::read_to_string(path).map_err(|source| RulesetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| RulesetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// All `.ron` files in a directory, sorted by file name. A missing directory
/// is an empty catalog.
fn ron_files_in(dir: &Path) -> RulesetResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| RulesetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RulesetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
