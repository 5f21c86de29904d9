//! Outbound message capability
//!
//! Fire-and-forget from the caller's perspective: the reminder job logs
//! send failures and moves on, it never retries.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use async_trait::async_trait;

use crate::config::MessagingConfig;

/// Errors that can occur sending an outbound message
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Messaging credentials not available: {0}")]
    MissingCredentials(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// The outbound message capability
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver one message to a destination phone number
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError>;
}

/// Prefix a phone number for the WhatsApp channel, leaving already-prefixed
/// destinations alone.
pub fn whatsapp_destination(phone: &str) -> String {
    if phone.starts_with("whatsapp:") {
        phone.to_string()
    } else {
        format!("whatsapp:{phone}")
    }
}

/// Twilio WhatsApp messenger
#[derive(Debug)]
pub struct TwilioMessenger {
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
    http: Client,
}

impl TwilioMessenger {
    /// Create a new messenger from configuration
    ///
    /// Reads the account SID and auth token from the environment variables
    /// named in config.
    pub fn from_config(config: &MessagingConfig) -> Result<Self, SendError> {
        let account_sid = std::env::var(&config.account_sid_env)
            .map_err(|_| SendError::MissingCredentials(config.account_sid_env.clone()))?;
        let auth_token = std::env::var(&config.auth_token_env)
            .map_err(|_| SendError::MissingCredentials(config.auth_token_env.clone()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            account_sid,
            auth_token,
            from_number: config.from_number.clone(),
            base_url: config.base_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", whatsapp_destination(to)),
                ("From", self.from_number.clone()),
                ("Body", body.to_string()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SendError::Api { status, message });
        }

        debug!(%to, "outbound message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_destination_prefixes_bare_numbers() {
        assert_eq!(whatsapp_destination("+254700000001"), "whatsapp:+254700000001");
    }

    #[test]
    fn test_whatsapp_destination_keeps_existing_prefix() {
        assert_eq!(
            whatsapp_destination("whatsapp:+254700000001"),
            "whatsapp:+254700000001"
        );
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = MessagingConfig {
            account_sid_env: "CHAMABOT_TEST_UNSET_SID".to_string(),
            auth_token_env: "CHAMABOT_TEST_UNSET_TOKEN".to_string(),
            ..Default::default()
        };

        let err = TwilioMessenger::from_config(&config).unwrap_err();
        assert!(matches!(err, SendError::MissingCredentials(var) if var == "CHAMABOT_TEST_UNSET_SID"));
    }
}
