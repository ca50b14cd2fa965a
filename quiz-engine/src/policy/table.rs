//! Stage Policy Table: pass/recovery rules per difficulty stage
//!
//! [`AdaptiveConfig`] is the loose, serializable form (a map that may be
//! incomplete). [`StagePolicyTable`] is the validated form the engine runs
//! on: one entry per [`Stage`], checked once at load time, read-only after.

use crate::error::ConfigError;
use crate::policy::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Decision thresholds and scoring for a single stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Questions in the first-pass phase
    pub initial_questions: u32,
    /// Minimum correct/asked ratio (inclusive) to pass without recovery
    pub passing_threshold: f64,
    /// Questions offered if the first pass fails
    pub recovery_questions: u32,
    /// Minimum correct/asked ratio (inclusive) over recovery answers
    pub recovery_threshold: f64,
    /// Points per correct answer in the initial phase
    pub base_points: f64,
    /// Points per correct answer in the recovery phase
    pub recovery_points: f64,
}

impl StageConfig {
    fn validate(&self, stage: Stage) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::InvalidValue {
            stage,
            field,
            reason,
        };

        if self.initial_questions == 0 {
            return Err(invalid("initial_questions", "must be at least 1".into()));
        }
        if self.recovery_questions == 0 {
            return Err(invalid("recovery_questions", "must be at least 1".into()));
        }
        for (field, value) in [
            ("passing_threshold", self.passing_threshold),
            ("recovery_threshold", self.recovery_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{} is outside [0, 1]", value)));
            }
        }
        for (field, value) in [
            ("base_points", self.base_points),
            ("recovery_points", self.recovery_points),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    field,
                    format!("{} is not a finite, non-negative number", value),
                ));
            }
        }
        Ok(())
    }
}

/// Loose adaptive configuration: global cap plus a stage → config map.
///
/// On the wire the map is keyed by lowercase stage names:
/// ```toml
/// max_questions = 25
///
/// [stage_configs.easy]
/// initial_questions = 5
/// passing_threshold = 0.8
/// recovery_questions = 3
/// recovery_threshold = 0.67
/// base_points = 3.0
/// recovery_points = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAdaptiveConfig", into = "RawAdaptiveConfig")]
pub struct AdaptiveConfig {
    /// Global question cap across all stages
    pub max_questions: u32,
    /// Per-stage rules; may be incomplete until validated
    pub stage_configs: BTreeMap<Stage, StageConfig>,
}

/// Wire form with string keys so unknown stage names surface as
/// [`ConfigError::UnknownStage`] in every format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAdaptiveConfig {
    max_questions: u32,
    #[serde(default)]
    stage_configs: BTreeMap<String, StageConfig>,
}

impl TryFrom<RawAdaptiveConfig> for AdaptiveConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAdaptiveConfig) -> Result<Self, Self::Error> {
        let mut stage_configs = BTreeMap::new();
        for (name, config) in raw.stage_configs {
            stage_configs.insert(name.parse::<Stage>()?, config);
        }
        Ok(Self {
            max_questions: raw.max_questions,
            stage_configs,
        })
    }
}

impl From<AdaptiveConfig> for RawAdaptiveConfig {
    fn from(config: AdaptiveConfig) -> Self {
        Self {
            max_questions: config.max_questions,
            stage_configs: config
                .stage_configs
                .into_iter()
                .map(|(stage, config)| (stage.as_str().to_string(), config))
                .collect(),
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        StagePolicyTable::default().to_config()
    }
}

impl AdaptiveConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

/// Validated stage policy table.
///
/// Construction is the only fallible step; lookups are indexed by the closed
/// [`Stage`] enum and cannot fail. Cheap to clone and safe to share across
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePolicyTable {
    max_questions: u32,
    stages: [StageConfig; 3],
}

impl StagePolicyTable {
    /// Validate a loose configuration into a complete table
    pub fn new(config: AdaptiveConfig) -> Result<Self, ConfigError> {
        if config.max_questions == 0 {
            return Err(ConfigError::InvalidMaxQuestions);
        }

        let lookup = |stage: Stage| -> Result<StageConfig, ConfigError> {
            let entry = config
                .stage_configs
                .get(&stage)
                .copied()
                .ok_or(ConfigError::MissingStage { stage })?;
            entry.validate(stage)?;
            Ok(entry)
        };

        let stages = [
            lookup(Stage::Easy)?,
            lookup(Stage::Medium)?,
            lookup(Stage::Hard)?,
        ];

        Ok(Self {
            max_questions: config.max_questions,
            stages,
        })
    }

    /// Load and validate a table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::new(AdaptiveConfig::load(path)?)
    }

    /// Rules for a stage
    pub fn config_for(&self, stage: Stage) -> &StageConfig {
        &self.stages[stage.index()]
    }

    /// Global question cap across all stages
    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    /// Highest score reachable by passing every stage on the first pass
    pub fn max_score(&self) -> f64 {
        self.stages
            .iter()
            .map(|c| f64::from(c.initial_questions) * c.base_points)
            .sum()
    }

    /// Convert back into the loose, serializable form
    pub fn to_config(&self) -> AdaptiveConfig {
        AdaptiveConfig {
            max_questions: self.max_questions,
            stage_configs: Stage::ALL
                .iter()
                .map(|&stage| (stage, *self.config_for(stage)))
                .collect(),
        }
    }
}

impl Default for StagePolicyTable {
    /// The production table: 25 questions, 5 initial + 3 recovery per stage
    fn default() -> Self {
        Self {
            max_questions: 25,
            stages: [
                // Easy: 4/5 to pass, 2/3 in recovery
                StageConfig {
                    initial_questions: 5,
                    passing_threshold: 0.8,
                    recovery_questions: 3,
                    recovery_threshold: 0.67,
                    base_points: 3.0,
                    recovery_points: 2.0,
                },
                // Medium: 4/5 to pass, 2/3 in recovery
                StageConfig {
                    initial_questions: 5,
                    passing_threshold: 0.8,
                    recovery_questions: 3,
                    recovery_threshold: 0.67,
                    base_points: 7.0,
                    recovery_points: 4.0,
                },
                // Hard: 3/5 to pass, 2/3 in recovery
                StageConfig {
                    initial_questions: 5,
                    passing_threshold: 0.6,
                    recovery_questions: 3,
                    recovery_threshold: 0.67,
                    base_points: 10.0,
                    recovery_points: 6.0,
                },
            ],
        }
    }
}
