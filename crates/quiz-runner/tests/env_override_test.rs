//! Environment overrides for pool sizes
//!
//! Kept in its own test binary so the variables never leak into tests
//! running in parallel.

use quiz_runner::RunnerConfig;

#[test]
fn test_env_overrides_pool_sizes() {
    std::env::set_var("QUIZ_POOL_SIZE", "9");
    std::env::set_var("QUIZ_RECOVERY_POOL_SIZE", "2");
    let config = RunnerConfig::load(None).unwrap();
    assert_eq!(config.pool.per_stage, 9);
    assert_eq!(config.pool.recovery_per_stage, 2);

    std::env::set_var("QUIZ_POOL_SIZE", "many");
    let err = RunnerConfig::load(None).unwrap_err();
    assert!(err.to_string().contains("QUIZ_POOL_SIZE"));

    std::env::remove_var("QUIZ_POOL_SIZE");
    std::env::remove_var("QUIZ_RECOVERY_POOL_SIZE");
}
