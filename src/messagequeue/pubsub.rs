//! Google Cloud Pub/Sub message queue implementation

use crate::messagequeue::config::{MessageQueueKind, PubSubConfig};
use crate::messagequeue::error::{MessagingError, MessagingResult};
use crate::messagequeue::events::{EntityFamily, UpdateType};
use crate::messagequeue::metrics::MESSAGE_QUEUE_METRICS;
use crate::messagequeue::pubsub_client::PubSubClient;
use crate::messagequeue::traits::{MessageQueueService, TopicPublisher};
use crate::proto::pubsub::{Experiment, ProjectSettings};
use crate::proto::segmenters::SegmenterConfiguration;
use crate::proto::MessagePublishState;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Publishes every update to a single Pub/Sub topic
pub struct PubSubMessageQueue {
    publisher: Arc<dyn TopicPublisher>,
    timeout: Duration,
}

impl PubSubMessageQueue {
    /// Resolve the configured topic, creating it if needed
    pub async fn connect(config: &PubSubConfig) -> MessagingResult<Self> {
        let client = PubSubClient::new(config)?;
        let topic = client.ensure_topic(&config.topic_name).await?;

        info!(
            topic = %topic.topic(),
            timeout_secs = config.pub_sub_timeout_seconds,
            "Pub/Sub message queue ready"
        );

        Ok(Self::new(Arc::new(topic), config.publish_timeout()))
    }

    /// Wrap an already resolved topic
    pub fn new(publisher: Arc<dyn TopicPublisher>, timeout: Duration) -> Self {
        Self { publisher, timeout }
    }

    pub fn topic(&self) -> &str {
        self.publisher.topic()
    }

    async fn publish(
        &self,
        family: EntityFamily,
        update_type: UpdateType,
        envelope: MessagePublishState,
    ) -> MessagingResult<()> {
        let backend = MessageQueueKind::PubSub.name();
        let entity = family.to_string();
        let update = update_type.to_string();

        let result = self.send(&entity, envelope).await;

        match &result {
            Ok(()) => {
                MESSAGE_QUEUE_METRICS
                    .messages_published
                    .with_label_values(&[entity.as_str(), update.as_str(), backend])
                    .inc();
            }
            Err(e) => {
                MESSAGE_QUEUE_METRICS
                    .publish_failures
                    .with_label_values(&[entity.as_str(), update.as_str(), backend, e.kind()])
                    .inc();
                error!(
                    topic = %self.publisher.topic(),
                    entity = %entity,
                    update_type = %update,
                    error = %e,
                    "Failed to publish update"
                );
            }
        }

        result
    }

    async fn send(&self, entity: &str, envelope: MessagePublishState) -> MessagingResult<()> {
        let payload = envelope.to_bytes()?;
        let size = payload.len();
        MESSAGE_QUEUE_METRICS
            .message_size
            .with_label_values(&[entity])
            .observe(size as f64);

        // Detached: a timeout or a dropped caller abandons only the wait
        let publisher = Arc::clone(&self.publisher);
        let start = Instant::now();
        let handle = tokio::spawn(async move { publisher.publish(payload).await });

        let message_id = tokio::time::timeout(self.timeout, handle)
            .await
            .map_err(|_| {
                MessagingError::Timeout(format!(
                    "no acknowledgement from {} within {:?}",
                    self.publisher.topic(),
                    self.timeout
                ))
            })?
            .map_err(|e| MessagingError::PublishFailed(format!("publish task failed: {}", e)))??;

        MESSAGE_QUEUE_METRICS
            .publish_latency
            .with_label_values(&[entity, MessageQueueKind::PubSub.name()])
            .observe(start.elapsed().as_secs_f64());

        debug!(
            topic = %self.publisher.topic(),
            message_id = %message_id,
            entity = %entity,
            size,
            "Update published"
        );
        Ok(())
    }
}

#[async_trait]
impl MessageQueueService for PubSubMessageQueue {
    async fn publish_project_settings_message(
        &self,
        update_type: UpdateType,
        settings: &ProjectSettings,
    ) -> MessagingResult<()> {
        let envelope = MessagePublishState::for_project_settings(update_type, settings);
        match envelope {
            Ok(envelope) => {
                self.publish(EntityFamily::ProjectSettings, update_type, envelope)
                    .await
            }
            Err(e) => {
                error!(
                    project_id = settings.project_id,
                    error = %e,
                    "Cannot build project settings update"
                );
                Err(e)
            }
        }
    }

    async fn publish_experiment_message(
        &self,
        update_type: UpdateType,
        experiment: &Experiment,
    ) -> MessagingResult<()> {
        let envelope = MessagePublishState::for_experiment(update_type, experiment);
        match envelope {
            Ok(envelope) => self.publish(EntityFamily::Experiment, update_type, envelope).await,
            Err(e) => {
                error!(experiment_id = experiment.id, error = %e, "Cannot build experiment update");
                Err(e)
            }
        }
    }

    async fn publish_project_segmenter_message(
        &self,
        update_type: UpdateType,
        segmenter: &SegmenterConfiguration,
        project_id: i64,
    ) -> MessagingResult<()> {
        let envelope =
            MessagePublishState::for_project_segmenter(update_type, segmenter, project_id);
        self.publish(EntityFamily::ProjectSegmenter, update_type, envelope).await
    }

    fn kind(&self) -> MessageQueueKind {
        MessageQueueKind::PubSub
    }
}
