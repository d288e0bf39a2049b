use async_openai::{
    types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use super::AiProvider;
use crate::{Error, Result};

/// OpenAI API provider
pub struct OpenAiProvider {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_output_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, max_output_tokens: u32) -> Self {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self {
            client,
            model: model.to_string(),
            max_output_tokens,
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(|e| Error::AiProvider(e.to_string()))?,
            )])
            .max_tokens(self.max_output_tokens)
            .build()
            .map_err(|e| Error::AiProvider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| Error::AiProvider(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
