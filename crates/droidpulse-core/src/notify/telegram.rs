use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::Notifier;
use crate::config::AppConfig;
use crate::{Error, Result};

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Sends messages through the Telegram Bot API
pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    bot_token: String,
    chat_id: String,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self> {
        let telegram = &config.telegram;
        let bot_token = telegram
            .bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Telegram bot token not configured (TELEGRAM_BOT_TOKEN)".to_string())
            })?;
        let chat_id = telegram
            .chat_id
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Telegram chat id not configured (TELEGRAM_CHAT_ID)".to_string())
            })?;

        Ok(Self {
            client,
            api_base_url: telegram.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
            disable_web_page_preview: telegram.disable_web_page_preview,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: self.disable_web_page_preview,
        };

        // The token is part of the URL, so transport errors are logged without it
        let response = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                Error::Notify(format!("Telegram request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let reply: TelegramResponse = response.json().await.map_err(|e| {
            Error::Notify(format!(
                "Failed to parse Telegram response ({}): {}",
                status,
                e.without_url()
            ))
        })?;

        if let Some(message_id) = check_reply(status, reply)? {
            tracing::info!("Sent Telegram message {} to chat {}", message_id, self.chat_id);
        }

        Ok(())
    }
}

/// Rejects `ok: false` replies and non-2xx statuses; returns the sent message id
fn check_reply(status: StatusCode, reply: TelegramResponse) -> Result<Option<i64>> {
    if !reply.ok || !status.is_success() {
        return Err(Error::Notify(format!(
            "Telegram API error ({}): {}",
            status,
            reply.description.unwrap_or_else(|| "unknown error".to_string())
        )));
    }
    Ok(reply.result.map(|message| message.message_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_token_and_chat() {
        let mut config = AppConfig::default();
        assert!(matches!(TelegramNotifier::new(Client::new(), &config), Err(Error::Config(_))));

        config.telegram.bot_token = Some("123:abc".to_string());
        assert!(matches!(TelegramNotifier::new(Client::new(), &config), Err(Error::Config(_))));

        config.telegram.chat_id = Some("-100200300".to_string());
        let notifier = TelegramNotifier::new(Client::new(), &config).unwrap();
        assert_eq!(
            notifier.endpoint("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert!(!notifier.disable_web_page_preview);
    }

    #[test]
    fn test_request_body_keeps_previews_enabled() {
        let request = SendMessageRequest {
            chat_id: "42",
            text: "hello",
            disable_web_page_preview: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["disable_web_page_preview"], false);
    }

    #[test]
    fn test_api_error_reply_is_notify_error() {
        let reply: TelegramResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        match check_reply(StatusCode::BAD_REQUEST, reply) {
            Err(Error::Notify(message)) => {
                assert!(message.contains("400"));
                assert!(message.contains("Bad Request: chat not found"));
            }
            other => panic!("expected notify error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_fails_even_when_ok() {
        let reply: TelegramResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        let result = check_reply(StatusCode::BAD_GATEWAY, reply);
        match result {
            Err(Error::Notify(message)) => assert!(message.contains("unknown error")),
            other => panic!("expected notify error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepted_reply_returns_message_id() {
        let reply: TelegramResponse =
            serde_json::from_str(r#"{"ok":true,"result":{"message_id":7,"chat":{"id":42}}}"#)
                .unwrap();
        assert_eq!(check_reply(StatusCode::OK, reply).unwrap(), Some(7));
    }
}
