use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod coach;
mod config;
mod detach;
mod hook;
mod input;
mod language;
mod tip;

use coach::AnthropicCoach;
use config::Settings;

const LOG_ENV: &str = "ENGLISH_COACH_LOG";

/// Claude Code UserPromptSubmit hook: coaches English phrasing in the
/// background and leaves the latest tip for the statusline.
#[derive(Debug, Parser)]
#[command(name = "english-coach", version)]
struct Cli {
    /// Env file with KEY=VALUE lines (default: ~/.claude/scripts/.env)
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Run the grammar check in this process instead of detaching
    #[arg(long)]
    foreground: bool,

    /// Internal: run a job handed over by the hook process
    #[arg(long, hide = true)]
    worker: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}

fn main() {
    init_tracing();

    // The hook caller must never see a failure, so even bad arguments exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };

    if let Err(e) = run(cli) {
        tracing::warn!("{:#}", e);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.worker {
        return detach::run_worker(io::stdin());
    }

    let env_file = cli.env_file.unwrap_or_else(config::default_env_file);
    let settings = Settings::load(&env_file);

    let outcome = if cli.foreground {
        hook::handle(settings, io::stdin(), |job| {
            let coach = AnthropicCoach::new(&job.settings)?;
            detach::run_job(&job, &coach)
        })?
    } else {
        hook::handle(settings, io::stdin(), |job| detach::spawn_worker(&job))?
    };

    tracing::debug!(?outcome, "hook finished");
    Ok(())
}
