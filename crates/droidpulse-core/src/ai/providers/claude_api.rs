use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::AiProvider;
use crate::{Error, Result};

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Option<Vec<ClaudeContent>>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

/// Claude/Anthropic API provider
pub struct ClaudeApiProvider {
    client: Client,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

impl ClaudeApiProvider {
    pub fn new(client: Client, api_key: &str, model: &str, max_output_tokens: u32) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_output_tokens,
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for ClaudeApiProvider {
    fn name(&self) -> &str {
        "claude_api"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_output_tokens,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::AiProvider(format!("Claude API request failed: {}", e)))?;

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("Failed to parse Claude response: {}", e)))?;

        if let Some(error) = claude_response.error {
            return Err(Error::AiProvider(format!("Claude API error: {}", error.message)));
        }

        let content = claude_response
            .content
            .and_then(|c| c.into_iter().next())
            .map(|c| c.text)
            .unwrap_or_default();

        Ok(content)
    }
}
