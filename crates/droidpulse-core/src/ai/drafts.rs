use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;

use super::providers::{AiProvider, ClaudeApiProvider, GeminiApiProvider, OpenAiProvider};
use crate::config::AppConfig;
use crate::feed::{BlogEntry, ChangeRecord};
use crate::{Error, Result};

/// Expected shape of the model reply
#[derive(Debug, Deserialize)]
struct DraftsReply {
    #[serde(default)]
    posts: Option<serde_json::Value>,
}

impl DraftsReply {
    /// String items of `posts`; null, a non-array or non-string items yield nothing
    fn into_posts(self) -> Vec<String> {
        match self.posts {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(post) => Some(post),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Turns fresh records into short post drafts, with or without a model
pub struct DraftGenerator {
    provider: Option<Arc<dyn AiProvider>>,
    fallback_limit: usize,
}

impl DraftGenerator {
    pub fn new(provider: Option<Arc<dyn AiProvider>>, fallback_limit: usize) -> Self {
        Self {
            provider,
            fallback_limit,
        }
    }

    /// Build a generator for the configured provider.
    /// A missing API key is not an error: drafts are then templated without AI.
    pub fn from_config(config: &AppConfig, client: Client) -> Result<Self> {
        let ai = &config.ai;
        let max_tokens = ai.max_output_tokens.max(1);

        let provider: Option<Arc<dyn AiProvider>> = match (ai.provider.as_str(), ai.api_key()) {
            ("gemini_api" | "openai" | "claude_api", None) => {
                tracing::info!("No API key for '{}', drafts will be templated", ai.provider);
                None
            }
            ("gemini_api", Some(key)) => Some(Arc::new(GeminiApiProvider::new(
                client,
                key,
                &ai.gemini_model,
                max_tokens,
            ))),
            ("openai", Some(key)) => Some(Arc::new(OpenAiProvider::new(
                key,
                &ai.openai_model,
                max_tokens,
            ))),
            ("claude_api", Some(key)) => Some(Arc::new(ClaudeApiProvider::new(
                client,
                key,
                &ai.claude_model,
                max_tokens,
            ))),
            (other, _) => {
                return Err(Error::Config(format!("Unknown AI provider: {}", other)));
            }
        };

        Ok(Self::new(provider, ai.fallback_limit))
    }

    /// Name of the model provider, `None` in template mode
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|provider| provider.name())
    }

    /// Produce drafts for the fresh records. Never fails: any provider or
    /// parsing problem degrades to the templated drafts.
    pub async fn generate(&self, changes: &[ChangeRecord], entries: &[BlogEntry]) -> Vec<String> {
        let Some(provider) = &self.provider else {
            return fallback_drafts(changes, entries, self.fallback_limit);
        };

        let prompt = build_prompt(changes, entries);
        tracing::debug!("Drafts prompt:\n{}", prompt);

        match provider.generate(&prompt).await {
            Ok(reply) => {
                let drafts = parse_drafts(&reply);
                if drafts.is_empty() {
                    tracing::warn!("{} reply had no usable drafts, using templates", provider.name());
                    fallback_drafts(changes, entries, self.fallback_limit)
                } else {
                    tracing::info!("{} produced {} drafts", provider.name(), drafts.len());
                    drafts
                }
            }
            Err(e) => {
                tracing::warn!("{} error: {}", provider.name(), e);
                fallback_drafts(changes, entries, self.fallback_limit)
            }
        }
    }
}

/// Templated drafts: changes first, then blog entries, capped at `limit`
pub fn fallback_drafts(changes: &[ChangeRecord], entries: &[BlogEntry], limit: usize) -> Vec<String> {
    changes
        .iter()
        .map(|c| format!("AOSP change: {} {}", c.subject, c.url))
        .chain(entries.iter().map(|e| format!("Android blog: {} {}", e.title, e.link)))
        .take(limit)
        .collect()
}

/// Instruction listing every fresh record and the required reply format
pub fn build_prompt(changes: &[ChangeRecord], entries: &[BlogEntry]) -> String {
    let mut data = String::from("Recent AOSP changes:\n");
    for c in changes {
        data.push_str(&format!("- {} {}\n", c.subject, c.url));
    }

    data.push_str("\nRecent Android blog posts:\n");
    for e in entries {
        data.push_str(&format!("- {} {}\n", e.title, e.link));
        if let Some(summary) = &e.summary {
            data.push_str(&format!("  {}\n", summary.replace('\n', " ")));
        }
    }

    format!(
        "You are an assistant creating social-media post ideas for an Android/AOSP account.\n\n\
DATA:\n{data}\n\
TASK:\n\
Create 3-5 short post ideas (~250 chars max), engaging but not clickbait.\n\
Include URLs when helpful.\n\
Format output strictly as:\n\n\
{{\n  \"posts\": [\n    \"post text 1\",\n    \"post text 2\"\n  ]\n}}\n"
    )
}

/// Slice from the first `{` to the last `}`, inclusive
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Treat each non-empty line as a draft, minus bullet decoration
pub fn parse_bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_matches(|c: char| matches!(c, '-' | '•' | ' ')).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read drafts from a model reply: the embedded JSON object if it decodes,
/// otherwise one draft per line
pub fn parse_drafts(text: &str) -> Vec<String> {
    let decoded = extract_json_object(text)
        .ok_or_else(|| Error::AiProvider("No JSON object in reply".to_string()))
        .and_then(|json| serde_json::from_str::<DraftsReply>(json).map_err(Error::from));

    match decoded {
        Ok(reply) => reply.into_posts(),
        Err(e) => {
            tracing::debug!("Falling back to line parsing: {}", e);
            parse_bullet_lines(text)
        }
    }
}
