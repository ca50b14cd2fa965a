use anyhow::{Context, Result};
use quiz_engine::{AdaptiveConfig, InMemoryQuestionRepository, StagePolicyTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizes of the synthetic question pools the runner serves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Main-pool questions per stage
    pub per_stage: usize,
    /// Dedicated recovery questions per stage (0 = draw from the main pool)
    pub recovery_per_stage: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            per_stage: 12,
            recovery_per_stage: 4,
        }
    }
}

/// Top-level runner configuration.
///
/// ```toml
/// [pool]
/// per_stage = 12
/// recovery_per_stage = 4
///
/// [policy]
/// max_questions = 25
///
/// [policy.stage_configs.easy]
/// initial_questions = 5
/// # ...
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub policy: AdaptiveConfig,
}

impl RunnerConfig {
    /// Load from an optional TOML file, then apply environment overrides
    /// (`QUIZ_POOL_SIZE`, `QUIZ_RECOVERY_POOL_SIZE`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse runner config")
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("QUIZ_POOL_SIZE") {
            self.pool.per_stage = value
                .parse()
                .with_context(|| format!("QUIZ_POOL_SIZE is not a number: {value}"))?;
        }
        if let Ok(value) = std::env::var("QUIZ_RECOVERY_POOL_SIZE") {
            self.pool.recovery_per_stage = value
                .parse()
                .with_context(|| format!("QUIZ_RECOVERY_POOL_SIZE is not a number: {value}"))?;
        }
        Ok(())
    }

    /// Validate the policy section into a table
    pub fn policy_table(&self) -> Result<StagePolicyTable> {
        StagePolicyTable::new(self.policy.clone()).context("Invalid stage policy table")
    }

    pub fn repository(&self) -> InMemoryQuestionRepository {
        InMemoryQuestionRepository::generated(self.pool.per_stage, self.pool.recovery_per_stage)
    }
}
