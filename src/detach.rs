//! Background worker for the grammar check.
//!
//! The hook process re-launches its own executable with `--worker`, hands
//! it a [`WorkerJob`] over stdin and exits without waiting. The worker
//! performs the API call and writes the tip file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::process::{Command, Stdio};

use crate::coach::{AnthropicCoach, GrammarCheck};
use crate::config::Settings;
use crate::tip;

pub const WORKER_FLAG: &str = "--worker";

/// Everything the worker needs. Settings travel with the job so the worker
/// never re-reads configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerJob {
    pub prompt: String,
    pub settings: Settings,
}

/// Command for a process that outlives the hook: piped stdin, null output,
/// and its own session (Unix) or no console (Windows).
fn detached_command<S: AsRef<OsStr>>(program: S) -> Command {
    let mut command = Command::new(program);
    command
        .stdin(Stdio::piped())
        // Inherited pipes would keep the hook caller waiting for EOF
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(0x00000008); // DETACHED_PROCESS
    }

    command
}

/// Spawn a detached worker for `job` and return without waiting on it.
pub fn spawn_worker(job: &WorkerJob) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    let payload = serde_json::to_vec(job).context("Failed to serialize worker job")?;

    let mut command = detached_command(exe);
    command.arg(WORKER_FLAG);

    let mut child = command.spawn().context("Failed to spawn worker")?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(&payload)
            .context("Failed to hand job to worker")?;
    }

    tracing::debug!(pid = child.id(), "worker detached");
    Ok(())
}

/// Check the prompt and write the tip. On failure the old tip is left alone.
pub fn run_job(job: &WorkerJob, checker: &dyn GrammarCheck) -> Result<()> {
    let tip = checker.check(&job.prompt)?;
    tip::write_tip(&job.settings.tip_path, &tip)?;
    tracing::info!(tip = %tip, "tip written");
    Ok(())
}

/// Entry point for `--worker`: read one job from `input`, then run it.
pub fn run_worker<R: Read>(mut input: R) -> Result<()> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("Failed to read worker job")?;
    drop(input);

    let job: WorkerJob = serde_json::from_str(&raw).context("Failed to parse worker job")?;
    let coach = AnthropicCoach::new(&job.settings)?;
    run_job(&job, &coach)
}
