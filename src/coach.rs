use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Settings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Instruction for the writing-coach persona. Replies are either `LGTM`
/// or up to two `awkward → natural` lines.
pub const SYSTEM_PROMPT: &str = "You are a concise English writing coach for non-native speakers. \
Only check English text. Ignore code, URLs, and technical terms. \
If the text sounds natural and correct, respond with exactly: LGTM\n\
If the text has errors OR sounds unnatural/non-native, suggest improvements. \
Respond with only the key fixes, one per line, in format: awkward → natural\n\
No explanations. No parentheses. Just the fix.\n\
Prioritize how native speakers actually express ideas over strict grammar rules. \
Be minimal. Max 2 suggestions.";

/// Something that can review a prompt and return a short tip.
pub trait GrammarCheck {
    fn check(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Grammar checker backed by the Anthropic Messages API.
pub struct AnthropicCoach {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicCoach {
    pub fn new(settings: &Settings) -> Result<Self> {
        let Some(api_key) = settings.api_key.clone() else {
            bail!("ANTHROPIC_API_KEY is not set");
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            url: format!("{}/v1/messages", settings.base_url.trim_end_matches('/')),
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

impl GrammarCheck for AnthropicCoach {
    fn check(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(url = %self.url, model = %self.model, "sending grammar check");

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .context("API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("API returned status {}: {}", status, body);
        }

        let body: MessagesResponse = response
            .json()
            .context("Failed to parse API response")?;
        first_text(body)
    }
}

fn first_text(body: MessagesResponse) -> Result<String> {
    match body.content.into_iter().next() {
        Some(ContentBlock { text: Some(text) }) => Ok(text.trim().to_string()),
        Some(_) => bail!("First content block has no text"),
        None => bail!("API response has no content"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use std::collections::BTreeMap;

    fn settings_for(server: &MockServer) -> Settings {
        Settings::resolve(&BTreeMap::new(), |key| match key {
            crate::config::API_KEY_VAR => Some("sk-test".to_string()),
            crate::config::BASE_URL_VAR => Some(server.base_url()),
            crate::config::MODEL_VAR => Some("claude-test".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_check_returns_trimmed_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "sk-test")
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json_body_partial(r#"{"model":"claude-test","max_tokens":256}"#);
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"content":[{"type":"text","text":"  LGTM\n"}]}"#);
        });

        let coach = AnthropicCoach::new(&settings_for(&server)).unwrap();
        assert_eq!(coach.check("This sounds fine.").unwrap(), "LGTM");
        mock.assert();
    }

    #[test]
    fn test_check_sends_prompt_as_single_user_message() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/messages").json_body_partial(
                r#"{"messages":[{"role":"user","content":"I has a question"}]}"#,
            );
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"content":[{"type":"text","text":"I has → I have"}]}"#);
        });

        let coach = AnthropicCoach::new(&settings_for(&server)).unwrap();
        assert_eq!(coach.check("I has a question").unwrap(), "I has → I have");
        mock.assert();
    }

    #[test]
    fn test_check_error_status_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).body(r#"{"type":"error"}"#);
        });

        let coach = AnthropicCoach::new(&settings_for(&server)).unwrap();
        let err = coach.check("hello").unwrap_err();
        assert!(format!("{:#}", err).contains("529"));
    }

    #[test]
    fn test_check_empty_content_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"content":[]}"#);
        });

        let coach = AnthropicCoach::new(&settings_for(&server)).unwrap();
        assert!(coach.check("hello").is_err());
    }

    #[test]
    fn test_new_without_key_fails() {
        let settings = Settings::resolve(&BTreeMap::new(), |_| None);
        assert!(AnthropicCoach::new(&settings).is_err());
    }

    #[test]
    fn test_first_text_requires_text_block() {
        let body: MessagesResponse =
            serde_json::from_str(r#"{"content":[{"type":"tool_use","id":"x"}]}"#).unwrap();
        assert!(first_text(body).is_err());
    }
}
