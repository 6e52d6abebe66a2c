use anyhow::{Context, Result};
use std::io::Read;

use crate::config::Settings;
use crate::detach::WorkerJob;
use crate::input::HookInput;
use crate::language;
use crate::tip;

/// How a hook invocation ended. Every variant maps to exit code 0.
#[derive(Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// No API key configured; stdin was not read
    NoApiKey,
    /// Stdin was not a JSON object with a string `prompt`
    InvalidPayload,
    /// Prompt empty or not mostly English; tip file cleared
    Cleared,
    /// Grammar check handed off
    Dispatched,
}

/// Run the hook against `stdin`. `dispatch` receives the job for English
/// prompts and decides how it runs (detached worker or in-process).
pub fn handle<R, D>(settings: Settings, mut stdin: R, dispatch: D) -> Result<HookOutcome>
where
    R: Read,
    D: FnOnce(WorkerJob) -> Result<()>,
{
    if settings.api_key.is_none() {
        tracing::debug!("no API key, skipping");
        return Ok(HookOutcome::NoApiKey);
    }

    let mut raw = String::new();
    stdin
        .read_to_string(&mut raw)
        .context("Failed to read hook payload")?;

    let prompt = match HookInput::parse(&raw) {
        Ok(HookInput {
            prompt: Some(prompt),
        }) => prompt,
        Ok(_) => {
            tracing::debug!("payload has no prompt");
            return Ok(HookOutcome::InvalidPayload);
        }
        Err(e) => {
            tracing::debug!("{:#}", e);
            return Ok(HookOutcome::InvalidPayload);
        }
    };

    if !language::is_mostly_english(&prompt) {
        tracing::debug!(
            ratio = ?language::english_ratio(&prompt),
            "prompt is not mostly English, clearing tip"
        );
        tip::clear_tip(&settings.tip_path)?;
        return Ok(HookOutcome::Cleared);
    }

    dispatch(WorkerJob { prompt, settings })?;
    Ok(HookOutcome::Dispatched)
}
