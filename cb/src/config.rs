//! ChamaBot configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main ChamaBot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener configuration
    pub server: ServerConfig,

    /// LLM provider configuration for the assistant
    pub llm: LlmConfig,

    /// Outbound WhatsApp messaging configuration
    pub messaging: MessagingConfig,

    /// Ledger database configuration
    pub storage: StorageConfig,

    /// Expected contribution targets and currency
    pub contributions: ContributionsConfig,

    /// Intent routing configuration
    pub routing: RoutingConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required credential environment variables are set.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        for var in [&self.messaging.account_sid_env, &self.messaging.auth_token_env] {
            if std::env::var(var).is_err() {
                return Err(eyre::eyre!(
                    "Messaging credentials not found. Set the {} environment variable.",
                    var
                ));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .chamabot.yml
        let local_config = PathBuf::from(".chamabot.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/chamabot/chamabot.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("chamabot").join("chamabot.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (any OpenAI-compatible chat completions endpoint)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openrouter".to_string(),
            model: "mistralai/mixtral-8x7b".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            max_tokens: 1024,
            timeout_ms: 30_000,
        }
    }
}

/// Outbound WhatsApp messaging configuration (Twilio-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Environment variable containing the account SID
    #[serde(rename = "account-sid-env")]
    pub account_sid_env: String,

    /// Environment variable containing the auth token
    #[serde(rename = "auth-token-env")]
    pub auth_token_env: String,

    /// Sender number, e.g. "whatsapp:+14155238886"
    #[serde(rename = "from-number")]
    pub from_number: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid_env: "TWILIO_ACCOUNT_SID".to_string(),
            auth_token_env: "TWILIO_AUTH_TOKEN".to_string(),
            from_number: "whatsapp:+14155238886".to_string(),
            base_url: "https://api.twilio.com".to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// Ledger database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite ledger database
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/chamabot on Linux)
        let db_path = dirs::data_dir()
            .map(|d| d.join("chamabot"))
            .unwrap_or_else(|| PathBuf::from(".chamabot"))
            .join("ledger.db");

        Self { db_path }
    }
}

/// One expected contribution target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTarget {
    /// Category name, lowercased
    pub category: String,

    /// Expected amount per period
    pub amount: f64,
}

impl CategoryTarget {
    pub fn new(category: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }
}

/// Expected contribution targets and display currency
///
/// Targets are an ordered list, not a map, so balance reports and reminders
/// always render categories in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionsConfig {
    /// Currency label used in replies
    pub currency: String,

    /// Category recorded when a contribution message names none
    #[serde(rename = "default-category")]
    pub default_category: String,

    /// Expected per-period targets, in report order
    pub targets: Vec<CategoryTarget>,
}

impl Default for ContributionsConfig {
    fn default() -> Self {
        Self {
            currency: "KES".to_string(),
            default_category: "general".to_string(),
            targets: vec![
                CategoryTarget::new("welfare", 500.0),
                CategoryTarget::new("emergency", 1000.0),
                CategoryTarget::new("savings", 1500.0),
            ],
        }
    }
}

/// Which flow wins when an unregistered caller's message carries keywords
///
/// The two deployed variants of this bot disagreed on whether a bare-name
/// message from an unknown phone beats a contribution/balance keyword.
/// The precedence is configuration, not behavior to rediscover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutePrecedence {
    /// Contribution/balance keywords are checked before registration
    #[default]
    KeywordFirst,

    /// Unregistered callers always land in the registration flow first
    RegistrationFirst,
}

/// Intent routing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub precedence: RoutePrecedence,
}
