use anyhow::{Context, Result};
use serde::Deserialize;

/// Input JSON from the Claude Code `UserPromptSubmit` hook.
///
/// Other fields (`session_id`, `cwd`, `transcript_path`, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    /// The submitted prompt. A missing key or a non-string value is `None`;
    /// `null` is an empty prompt.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    })
}

impl HookInput {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse hook payload")
    }
}
