use anyhow::Result;
use clap::{Parser, Subcommand};
use quiz_runner::commands::{self, InspectArgs, ResumeArgs, SimulateArgs};
use tracing_subscriber::{fmt, EnvFilter};

/// Adaptive quiz session runner
#[derive(Parser)]
#[command(name = "quiz-runner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new session and replay an answer pattern through it
    Simulate(SimulateArgs),
    /// Continue a checkpointed session with more answers
    Resume(ResumeArgs),
    /// Validate a checkpoint and print its summary
    Inspect(InspectArgs),
    /// Print the built-in runner config as TOML
    DefaultConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Command::Simulate(args) => commands::simulate(args).await?,
        Command::Resume(args) => commands::resume(args).await?,
        Command::Inspect(args) => commands::inspect(args)?,
        Command::DefaultConfig => commands::default_config()?,
    };
    println!("{}", output);

    Ok(())
}
