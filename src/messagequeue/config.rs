//! Message queue configuration

use crate::messagequeue::error::{MessagingError, MessagingResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};
use validator::Validate;

/// Environment variable pointing the client at a Pub/Sub emulator
pub const PUBSUB_EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Backend used to deliver updates to the treatment service
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum MessageQueueKind {
    /// Updates are accepted and dropped
    #[strum(serialize = "")]
    Noop,
    /// Google Cloud Pub/Sub
    #[strum(serialize = "pubsub")]
    PubSub,
}

impl MessageQueueKind {
    /// Human-readable backend name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            MessageQueueKind::Noop => "noop",
            MessageQueueKind::PubSub => "pubsub",
        }
    }
}

/// Google Cloud Pub/Sub configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PubSubConfig {
    /// Google Cloud project owning the topic
    #[validate(length(min = 1, message = "pubsub project must be set"))]
    #[serde(default = "default_project")]
    pub project: String,

    /// Topic that every update is published to
    #[validate(length(min = 1, message = "pubsub topic_name must be set"))]
    #[serde(default = "default_topic_name")]
    pub topic_name: String,

    /// Time to wait for a publish acknowledgement
    #[validate(range(min = 1, message = "pub_sub_timeout_seconds must be positive"))]
    #[serde(default = "default_pub_sub_timeout_seconds")]
    pub pub_sub_timeout_seconds: u64,

    /// Pub/Sub REST endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding an OAuth2 access token
    #[serde(default)]
    pub access_token_env: Option<String>,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            topic_name: default_topic_name(),
            pub_sub_timeout_seconds: default_pub_sub_timeout_seconds(),
            endpoint: default_endpoint(),
            access_token_env: None,
        }
    }
}

impl PubSubConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.pub_sub_timeout_seconds)
    }

    /// Endpoint to talk to, honouring `PUBSUB_EMULATOR_HOST`
    pub fn resolved_endpoint(&self) -> String {
        match std::env::var(PUBSUB_EMULATOR_HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => format!("http://{}", host.trim()),
            _ => self.endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Read the access token from the configured environment variable
    pub fn access_token(&self) -> MessagingResult<Option<String>> {
        self.access_token_env
            .as_deref()
            .map(read_access_token)
            .transpose()
    }
}

/// Current value of a token variable. Rotated tokens are picked up on the next read.
pub(crate) fn read_access_token(var: &str) -> MessagingResult<String> {
    std::env::var(var).map_err(|_| {
        MessagingError::ConfigurationError(format!(
            "access token environment variable {} is not set",
            var
        ))
    })
}

/// Main message queue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQueueConfig {
    /// "" for no-op, "pubsub" for Google Cloud Pub/Sub
    #[serde(default)]
    pub kind: String,

    /// Required when `kind` is "pubsub"
    #[serde(default)]
    pub pubsub: Option<PubSubConfig>,
}

impl MessageQueueConfig {
    /// Configuration that selects the no-op backend
    pub fn noop() -> Self {
        Self::default()
    }

    /// Configuration that selects Pub/Sub
    pub fn pubsub(config: PubSubConfig) -> Self {
        Self {
            kind: MessageQueueKind::PubSub.to_string(),
            pubsub: Some(config),
        }
    }

    /// Parse the configured kind
    pub fn kind(&self) -> MessagingResult<MessageQueueKind> {
        MessageQueueKind::from_str(self.kind.trim()).map_err(|_| {
            MessagingError::ConfigurationError(format!(
                "invalid message queue kind ({}) was provided",
                self.kind
            ))
        })
    }

    /// Pub/Sub section, validated
    pub fn pubsub_config(&self) -> MessagingResult<&PubSubConfig> {
        let config = self.pubsub.as_ref().ok_or_else(|| {
            MessagingError::ConfigurationError(
                "pubsub message queue requires a 'pubsub' configuration section".to_string(),
            )
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_project() -> String {
    "dev".to_string()
}

fn default_topic_name() -> String {
    "xp-update".to_string()
}

fn default_pub_sub_timeout_seconds() -> u64 {
    30
}

fn default_endpoint() -> String {
    "https://pubsub.googleapis.com".to_string()
}
