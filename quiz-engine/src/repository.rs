//! Question Repository seam
//!
//! The engine never looks questions up itself. A repository resolves a
//! [`QuestionRequest`] into a concrete question id, and must never return an
//! id listed in `exclude_ids`. When nothing eligible is left it fails with
//! [`QuizError::ExhaustedQuestionPool`]; callers get that error unchanged.

use crate::error::{QuizError, QuizResult};
use crate::policy::Stage;
use crate::request::QuestionRequest;
use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves question requests into question ids
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Pick one unused question for the request's stage and phase
    async fn select_question(&self, request: &QuestionRequest) -> QuizResult<String>;
}

/// Ordered in-memory pools, one per stage, with optional recovery pools.
///
/// Selection is deterministic: the first id in pool order that the request
/// does not exclude. A recovery request draws from the stage's recovery pool
/// when one is configured, otherwise from the stage pool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionRepository {
    pools: HashMap<Stage, Vec<String>>,
    recovery_pools: HashMap<Stage, Vec<String>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main pool for a stage
    pub fn with_pool<I, S>(mut self, stage: Stage, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pools
            .insert(stage, ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set a dedicated recovery pool for a stage
    pub fn with_recovery_pool<I, S>(mut self, stage: Stage, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recovery_pools
            .insert(stage, ids.into_iter().map(Into::into).collect());
        self
    }

    /// Synthetic pools: `<stage>-<n>` main ids and `<stage>-r<n>` recovery ids
    pub fn generated(per_stage: usize, recovery_per_stage: usize) -> Self {
        let mut repo = Self::new();
        for stage in Stage::ALL {
            repo = repo.with_pool(stage, (1..=per_stage).map(|n| format!("{}-{}", stage, n)));
            if recovery_per_stage > 0 {
                repo = repo.with_recovery_pool(
                    stage,
                    (1..=recovery_per_stage).map(|n| format!("{}-r{}", stage, n)),
                );
            }
        }
        repo
    }

    /// Number of questions available to a stage across both pools
    pub fn pool_size(&self, stage: Stage) -> usize {
        self.pools.get(&stage).map_or(0, Vec::len)
            + self.recovery_pools.get(&stage).map_or(0, Vec::len)
    }

    fn pool_for(&self, stage: Stage, is_recovery: bool) -> &[String] {
        let recovery = if is_recovery {
            self.recovery_pools.get(&stage)
        } else {
            None
        };
        recovery
            .or_else(|| self.pools.get(&stage))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn select_question(&self, request: &QuestionRequest) -> QuizResult<String> {
        self.pool_for(request.stage, request.is_recovery)
            .iter()
            .find(|id| !request.excludes(id))
            .cloned()
            .ok_or(QuizError::ExhaustedQuestionPool {
                stage: request.stage,
                is_recovery: request.is_recovery,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(stage: Stage, exclude: &[&str], is_recovery: bool) -> QuestionRequest {
        QuestionRequest {
            session_id: "repo-test".into(),
            stage,
            exclude_ids: exclude.iter().map(|s| s.to_string()).collect(),
            is_recovery,
        }
    }

    #[tokio::test]
    async fn test_selects_first_unused() {
        let repo = InMemoryQuestionRepository::new().with_pool(Stage::Easy, ["e1", "e2", "e3"]);
        let id = repo
            .select_question(&request(Stage::Easy, &["e1"], false))
            .await
            .unwrap();
        assert_eq!(id, "e2");
    }

    #[tokio::test]
    async fn test_exhausted_pool() {
        let repo = InMemoryQuestionRepository::new().with_pool(Stage::Hard, ["h1"]);
        let err = repo
            .select_question(&request(Stage::Hard, &["h1"], false))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizError::ExhaustedQuestionPool {
                stage: Stage::Hard,
                is_recovery: false
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_stage_pool_is_exhausted() {
        let repo = InMemoryQuestionRepository::new();
        assert!(repo
            .select_question(&request(Stage::Medium, &[], false))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_recovery_pool_preferred_then_fallback() {
        let repo = InMemoryQuestionRepository::new()
            .with_pool(Stage::Easy, ["e1", "e2"])
            .with_recovery_pool(Stage::Medium, ["m-r1"])
            .with_pool(Stage::Medium, ["m1"]);

        let id = repo
            .select_question(&request(Stage::Medium, &[], true))
            .await
            .unwrap();
        assert_eq!(id, "m-r1");

        let id = repo
            .select_question(&request(Stage::Easy, &["e1"], true))
            .await
            .unwrap();
        assert_eq!(id, "e2");
    }

    #[test]
    fn test_generated_pools() {
        let repo = InMemoryQuestionRepository::generated(8, 4);
        assert_eq!(repo.pool_size(Stage::Easy), 12);
        assert_eq!(repo.pool_for(Stage::Hard, false)[0], "hard-1");
        assert_eq!(repo.pool_for(Stage::Hard, true)[0], "hard-r1");
    }
}
