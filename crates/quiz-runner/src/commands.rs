//! Subcommand handlers
//!
//! Each handler returns the text to print so the binary stays a thin
//! dispatcher and the handlers can be driven from tests.

use crate::config::RunnerConfig;
use crate::script::{parse_answers, replay, ReplayReport, StopReason};
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use quiz_engine::{
    load_checkpoint, save_checkpoint, AdaptiveSession, InMemoryQuestionRepository, QuizError,
    QuizService, TransitionEngine,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Answer pattern, e.g. "11110" or "y n y" (1/y/t correct, 0/n/f wrong)
    #[arg(short, long)]
    pub answers: String,

    /// Runner config TOML (pool sizes and stage policy)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Session id (random UUID when omitted)
    #[arg(long)]
    pub session_id: Option<String>,

    /// Write the session checkpoint here when the script ends
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ResumeArgs {
    /// Checkpoint to continue from; rewritten in place
    #[arg(long)]
    pub checkpoint: PathBuf,

    #[arg(short, long)]
    pub answers: String,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[arg(long)]
    pub checkpoint: PathBuf,

    /// Policy the checkpoint is validated against
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

fn service(config: &RunnerConfig) -> Result<QuizService<InMemoryQuestionRepository>> {
    let engine = TransitionEngine::new(config.policy_table()?);
    Ok(QuizService::new(engine, config.repository()))
}

/// Start a fresh session and replay an answer script through it
pub async fn simulate(args: SimulateArgs) -> Result<String> {
    let config = RunnerConfig::load(args.config.as_deref())?;
    let answers = parse_answers(&args.answers).map_err(anyhow::Error::msg)?;
    let service = service(&config)?;

    let session_id = args
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(session = %session_id, answers = answers.len(), "Starting simulated session");

    let started = service
        .start_session(session_id)
        .await
        .context("Failed to start session")?;
    let mut session = started.session;
    let report = replay(&service, &mut session, started.first_question_id, &answers).await?;

    if let Some(path) = &args.checkpoint {
        save_checkpoint(&session, path)
            .with_context(|| format!("Failed to write checkpoint {}", path.display()))?;
        info!(path = %path.display(), "Checkpoint written");
    }

    render_report(&report, args.format)
}

/// Continue a checkpointed session with more answers
pub async fn resume(args: ResumeArgs) -> Result<String> {
    let config = RunnerConfig::load(args.config.as_deref())?;
    let answers = parse_answers(&args.answers).map_err(anyhow::Error::msg)?;
    let service = service(&config)?;

    let mut session = read_checkpoint(&service, &args.checkpoint)?;
    if session.is_complete() {
        bail!("Session {} is already complete", session.session_id());
    }

    let report = match service.next_question(&session).await {
        Ok(next) => {
            info!(
                session = %session.session_id(),
                asked = session.total_questions_asked(),
                "Resuming session"
            );
            replay(&service, &mut session, next, &answers).await?
        }
        Err(QuizError::ExhaustedQuestionPool { stage, is_recovery }) => {
            warn!(
                session = %session.session_id(),
                stage = %stage,
                recovery = is_recovery,
                "Question pool exhausted before resuming, closing session"
            );
            service.close_session(&mut session)?;
            ReplayReport {
                stopped: StopReason::PoolExhausted,
                answered: Vec::new(),
                pending_question_id: None,
                summary: service.summary(&session),
            }
        }
        Err(e) => return Err(e).context("Failed to resolve the next question"),
    };

    save_checkpoint(&session, &args.checkpoint)
        .with_context(|| format!("Failed to write checkpoint {}", args.checkpoint.display()))?;
    render_report(&report, args.format)
}

/// Validate a checkpoint and print its summary
pub fn inspect(args: InspectArgs) -> Result<String> {
    let config = RunnerConfig::load(args.config.as_deref())?;
    let service = service(&config)?;
    let session = read_checkpoint(&service, &args.checkpoint)?;
    let summary = service.summary(&session);

    match args.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => Ok(summary.render()),
    }
}

/// The built-in runner config as TOML
pub fn default_config() -> Result<String> {
    toml::to_string_pretty(&RunnerConfig::default()).context("Failed to serialize default config")
}

fn read_checkpoint(
    service: &QuizService<InMemoryQuestionRepository>,
    path: &Path,
) -> Result<AdaptiveSession> {
    load_checkpoint(path, service.engine().policy())
        .with_context(|| format!("Failed to load checkpoint {}", path.display()))
}

fn render_report(report: &ReplayReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for (i, answer) in report.answered.iter().enumerate() {
                out.push_str(&format!(
                    "{:>3}. {:<12} {:<6} {} {:+}{}\n",
                    i + 1,
                    answer.question_id,
                    answer.stage,
                    if answer.is_correct { "correct" } else { "wrong  " },
                    answer.points_earned,
                    if answer.is_recovery { " (recovery)" } else { "" },
                ));
            }
            if let Some(pending) = &report.pending_question_id {
                out.push_str(&format!("pending question: {}\n", pending));
            }
            out.push_str(&report.summary.render());
            Ok(out)
        }
    }
}
