use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::AiProvider;
use crate::{Error, Result};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

/// Gemini API provider
pub struct GeminiApiProvider {
    client: Client,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

impl GeminiApiProvider {
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
impl AiProvider for GeminiApiProvider {
    fn name(&self) -> &str {
        "gemini_api"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: 0.7,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::AiProvider(format!("Gemini API request failed: {}", e)))?;

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(error) = gemini_response.error {
            return Err(Error::AiProvider(format!("Gemini API error: {}", error.message)));
        }

        // A reply may be split across several parts
        let text: String = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::AiProvider("Gemini returned no text".to_string()));
        }

        Ok(text)
    }
}
