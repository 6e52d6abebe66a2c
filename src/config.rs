use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const MODEL_VAR: &str = "ENGLISH_COACH_MODEL";
pub const TIMEOUT_VAR: &str = "ENGLISH_COACH_TIMEOUT_SECS";
pub const TIP_FILE_VAR: &str = "ENGLISH_COACH_TIP_FILE";

const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MAX_TOKENS: u32 = 256;

/// Resolved configuration, built once at startup and handed down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    /// Request timeout. None means wait as long as the API takes.
    pub timeout: Option<Duration>,
    pub tip_path: PathBuf,
}

impl Settings {
    /// Resolve settings from env-file values and a process environment lookup.
    /// Env-file values take precedence; empty values count as unset.
    pub fn resolve<F>(file_vars: &BTreeMap<String, String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            file_vars
                .get(key)
                .cloned()
                .or_else(|| lookup(key))
                .filter(|v| !v.is_empty())
        };

        let timeout = get(TIMEOUT_VAR).and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                tracing::warn!(value = %raw, "ignoring invalid {}", TIMEOUT_VAR);
                None
            }
        });

        Settings {
            api_key: get(API_KEY_VAR),
            model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: MAX_TOKENS,
            timeout,
            tip_path: get(TIP_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_tip_path),
        }
    }

    /// Load the env file (if any) and resolve against the real environment.
    pub fn load(env_file: &Path) -> Self {
        let file_vars = match load_env_file(env_file) {
            Ok(vars) => vars,
            Err(e) => {
                tracing::warn!("{:#}", e);
                BTreeMap::new()
            }
        };
        Self::resolve(&file_vars, |key| std::env::var(key).ok())
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// ~/.claude/scripts/.env
pub fn default_env_file() -> PathBuf {
    home_dir().join(".claude").join("scripts").join(".env")
}

/// ~/.claude/english-tip-latest.txt
pub fn default_tip_path() -> PathBuf {
    home_dir().join(".claude").join("english-tip-latest.txt")
}

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and lines without `=`
/// are skipped. Splits on the first `=` and trims both sides.
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Read an env file. A missing file is not an error and yields no variables.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(parse_env_file(&contents).into_iter().collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read env file: {}", path.display())),
    }
}
