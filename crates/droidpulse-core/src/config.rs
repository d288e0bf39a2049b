use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// State file name, relative to the data directory unless absolute
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Number of processed ids kept in the state file
    #[serde(default = "default_seen_cap")]
    pub seen_cap: usize,
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_file: default_state_file(),
            seen_cap: default_seen_cap(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Gerrit host serving AOSP code review
    #[serde(default = "default_gerrit_base_url")]
    pub gerrit_base_url: String,
    /// Gerrit search query for changes
    #[serde(default = "default_gerrit_query")]
    pub gerrit_query: String,
    /// Max changes fetched per run
    #[serde(default = "default_fetch_limit")]
    pub change_limit: usize,
    /// Atom/RSS feed of the Android Developers blog
    #[serde(default = "default_blog_feed_url")]
    pub blog_feed_url: String,
    /// Max blog entries fetched per run
    #[serde(default = "default_fetch_limit")]
    pub blog_limit: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// HTTP proxy URL (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            gerrit_base_url: default_gerrit_base_url(),
            gerrit_query: default_gerrit_query(),
            change_limit: default_fetch_limit(),
            blog_feed_url: default_blog_feed_url(),
            blog_limit: default_fetch_limit(),
            request_timeout_secs: default_timeout(),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI provider: "gemini_api", "openai", "claude_api"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// Gemini API key (for gemini_api provider)
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// OpenAI API key (for openai provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Claude/Anthropic API key (for claude_api provider)
    #[serde(default)]
    pub claude_api_key: Option<String>,
    /// Claude model name
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    /// Max tokens for the drafts reply
    #[serde(default = "default_max_tokens")]
    pub max_output_tokens: u32,
    /// Max drafts produced without AI assistance
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            claude_api_key: None,
            claude_model: default_claude_model(),
            max_output_tokens: default_max_tokens(),
            fallback_limit: default_fallback_limit(),
        }
    }
}

impl AiConfig {
    /// API key for the selected provider, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider.as_str() {
            "openai" => self.openai_api_key.as_deref(),
            "claude_api" => self.claude_api_key.as_deref(),
            _ => self.gemini_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Target chat id (numeric id or @channel name)
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_base_url")]
    pub api_base_url: String,
    /// Link previews stay enabled unless this is set
    #[serde(default)]
    pub disable_web_page_preview: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: default_telegram_api_base_url(),
            disable_web_page_preview: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("droidpulse")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_seen_cap() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gerrit_base_url() -> String {
    "https://android-review.googlesource.com".to_string()
}

fn default_gerrit_query() -> String {
    "status:merged".to_string()
}

fn default_fetch_limit() -> usize {
    10
}

fn default_blog_feed_url() -> String {
    "https://android-developers.googleblog.com/atom.xml".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_ai_provider() -> String {
    "gemini_api".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_fallback_limit() -> usize {
    5
}

fn default_telegram_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Treat empty environment values as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path` (defaults if missing), then apply environment overrides
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::Error::Config(e.to_string()))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override credentials and paths from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = non_empty(lookup("TELEGRAM_BOT_TOKEN")) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = non_empty(lookup("TELEGRAM_CHAT_ID")) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(key) = non_empty(lookup("GEMINI_API_KEY")) {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(key) = non_empty(lookup("OPENAI_API_KEY")) {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty(lookup("ANTHROPIC_API_KEY")) {
            self.ai.claude_api_key = Some(key);
        }
        if let Some(state_file) = non_empty(lookup("DROIDPULSE_STATE_FILE")) {
            self.general.state_file = PathBuf::from(state_file);
        }
    }

    /// Get the configuration file path
    /// Always uses ~/.config/droidpulse/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("droidpulse")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the seen-state file path
    pub fn state_path(&self) -> PathBuf {
        let state_file = expand_tilde(&self.general.state_file);
        if state_file.is_absolute() {
            state_file
        } else {
            self.data_dir().join(state_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.general.seen_cap, 500);
        assert_eq!(config.sources.change_limit, 10);
        assert_eq!(config.sources.blog_limit, 10);
        assert_eq!(config.ai.fallback_limit, 5);
        assert_eq!(config.ai.provider, "gemini_api");
        assert!(!config.telegram.disable_web_page_preview);
        assert!(config.ai.api_key().is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [sources]
            change_limit = 3

            [telegram]
            chat_id = "@aosp_drafts"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.change_limit, 3);
        assert_eq!(config.sources.blog_limit, 10);
        assert_eq!(config.telegram.chat_id.as_deref(), Some("@aosp_drafts"));
        assert_eq!(config.telegram.api_base_url, "https://api.telegram.org");
    }

    #[test]
    fn test_env_overrides_and_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("GEMINI_API_KEY", ""),
            ("DROIDPULSE_STATE_FILE", "/tmp/droidpulse-state.json"),
        ]);

        let mut config = AppConfig::default();
        config.ai.gemini_api_key = Some("from-file".to_string());
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("42"));
        assert_eq!(config.ai.api_key(), Some("from-file"));
        assert_eq!(config.state_path(), PathBuf::from("/tmp/droidpulse-state.json"));
    }

    #[test]
    fn test_api_key_follows_provider() {
        let mut config = AiConfig::default();
        config.gemini_api_key = Some("gemini".to_string());
        config.provider = "openai".to_string();
        assert!(config.api_key().is_none());

        config.openai_api_key = Some("   ".to_string());
        assert!(config.api_key().is_none());

        config.openai_api_key = Some("sk-test".to_string());
        assert_eq!(config.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_relative_state_file_lives_in_data_dir() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/var/lib/droidpulse");
        assert_eq!(config.state_path(), PathBuf::from("/var/lib/droidpulse/state.json"));
    }
}
