//! Minimal Google Cloud Pub/Sub REST client

use crate::messagequeue::config::{read_access_token, PubSubConfig};
use crate::messagequeue::error::{MessagingError, MessagingResult};
use crate::messagequeue::traits::TopicPublisher;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const USER_AGENT: &str = concat!("xp-management-events/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    messages: Vec<PubsubMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct PubsubMessage<'a> {
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Project-scoped Pub/Sub admin client used to resolve topics
#[derive(Clone)]
pub struct PubSubClient {
    client: Client,
    endpoint: String,
    project: String,
    access_token_env: Option<String>,
}

impl PubSubClient {
    /// Create a client for the configured project. No request is made yet,
    /// but a configured token variable must already be set.
    pub fn new(config: &PubSubConfig) -> MessagingResult<Self> {
        config.access_token()?;

        let client = Client::builder()
            .timeout(config.publish_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                MessagingError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.resolved_endpoint(),
            project: config.project.clone(),
            access_token_env: config.access_token_env.clone(),
        })
    }

    /// Fully-qualified topic name, `projects/{project}/topics/{topic}`
    pub fn topic_path(&self, topic: &str) -> String {
        format!("projects/{}/topics/{}", self.project, topic)
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/v1/{}", self.endpoint, self.topic_path(topic))
    }

    /// Attach the bearer token, read fresh for every request
    fn authorize(&self, request: RequestBuilder) -> MessagingResult<RequestBuilder> {
        match &self.access_token_env {
            Some(var) => Ok(request.bearer_auth(read_access_token(var)?)),
            None => Ok(request),
        }
    }

    /// Check whether the topic exists
    pub async fn topic_exists(&self, topic: &str) -> MessagingResult<bool> {
        let response = self
            .authorize(self.client.get(self.topic_url(topic)))?
            .send()
            .await
            .map_err(|e| {
                MessagingError::ConnectionFailed(format!("Pub/Sub topic lookup failed: {}", e))
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(MessagingError::ConnectionFailed(format!(
                "Pub/Sub topic lookup for {} returned status {}: {}",
                self.topic_path(topic),
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }

    /// Create the topic. A topic created concurrently by someone else counts
    /// as success.
    pub async fn create_topic(&self, topic: &str) -> MessagingResult<()> {
        let response = self
            .authorize(self.client.put(self.topic_url(topic)))?
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| {
                MessagingError::ConnectionFailed(format!("Pub/Sub topic creation failed: {}", e))
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Ok(()),
            status => Err(MessagingError::ConnectionFailed(format!(
                "Pub/Sub topic creation for {} returned status {}: {}",
                self.topic_path(topic),
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }

    /// Resolve the topic, creating it when missing
    pub async fn ensure_topic(&self, topic: &str) -> MessagingResult<PubSubTopic> {
        if self.topic_exists(topic).await? {
            info!(topic = %self.topic_path(topic), "Using existing Pub/Sub topic");
        } else {
            warn!(topic = %self.topic_path(topic), "Pub/Sub topic not found, creating it");
            self.create_topic(topic).await?;
        }
        Ok(self.topic(topic))
    }

    /// Handle to a topic without checking that it exists
    pub fn topic(&self, topic: &str) -> PubSubTopic {
        PubSubTopic {
            client: self.clone(),
            name: self.topic_path(topic),
            publish_url: format!("{}:publish", self.topic_url(topic)),
        }
    }
}

/// Publishing handle for one topic. Cheap to clone and safe to share.
#[derive(Clone)]
pub struct PubSubTopic {
    client: PubSubClient,
    name: String,
    publish_url: String,
}

#[async_trait]
impl TopicPublisher for PubSubTopic {
    async fn publish(&self, data: Vec<u8>) -> MessagingResult<String> {
        let encoded = BASE64.encode(&data);
        let body = PublishRequest {
            messages: vec![PubsubMessage { data: &encoded }],
        };

        let response = self
            .client
            .authorize(self.client.client.post(&self.publish_url))?
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::PublishFailed(format!(
                "Pub/Sub returned non-success status {}: {}",
                status,
                if body.is_empty() { "No response body" } else { &body }
            )));
        }

        let parsed: PublishResponse = response.json().await.map_err(|e| {
            MessagingError::PublishFailed(format!("Invalid Pub/Sub publish response: {}", e))
        })?;

        parsed.message_ids.into_iter().next().ok_or_else(|| {
            MessagingError::PublishFailed("Pub/Sub returned no message id".to_string())
        })
    }

    fn topic(&self) -> &str {
        &self.name
    }
}
