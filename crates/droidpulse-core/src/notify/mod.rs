mod telegram;

pub use telegram::TelegramNotifier;

use crate::Result;

pub const MESSAGE_HEADER: &str = "🤖 Android/AOSP updates:\n\n";
pub const MESSAGE_FOOTER: &str = "\n\n(Ready to post!)";
pub const NO_TOPICS_MESSAGE: &str = "No new Android/AOSP topics.";
pub const NOTHING_NEW_DRAFT: &str = "No new items. Everything already processed.";

/// Delivery channel for the formatted digest
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Header, numbered drafts separated by blank lines, footer
pub fn format_message(drafts: &[String]) -> String {
    if drafts.is_empty() {
        return NO_TOPICS_MESSAGE.to_string();
    }

    let body = drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| format!("{}. {}", i + 1, draft))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}{}{}", MESSAGE_HEADER, body, MESSAGE_FOOTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let drafts = vec!["first".to_string(), "second".to_string()];
        assert_eq!(
            format_message(&drafts),
            "🤖 Android/AOSP updates:\n\n1. first\n\n2. second\n\n(Ready to post!)"
        );
    }

    #[test]
    fn test_format_empty_and_nothing_new() {
        assert_eq!(format_message(&[]), NO_TOPICS_MESSAGE);
        assert_eq!(
            format_message(&[NOTHING_NEW_DRAFT.to_string()]),
            "🤖 Android/AOSP updates:\n\n1. No new items. Everything already processed.\n\n(Ready to post!)"
        );
    }
}
