//! Message queue trait abstractions

use crate::messagequeue::config::MessageQueueKind;
use crate::messagequeue::error::MessagingResult;
use crate::messagequeue::events::UpdateType;
use crate::proto::pubsub::{Experiment, ProjectSettings};
use crate::proto::segmenters::SegmenterConfiguration;
use async_trait::async_trait;

/// Publishes committed entity changes to the treatment service.
///
/// Callers invoke exactly one method after their own write has committed and
/// pass the post-commit snapshot. A failure here means the update was not
/// acknowledged; the committed write stands either way.
#[async_trait]
pub trait MessageQueueService: Send + Sync {
    /// Publish a project settings create or update
    async fn publish_project_settings_message(
        &self,
        update_type: UpdateType,
        settings: &ProjectSettings,
    ) -> MessagingResult<()>;

    /// Publish an experiment create or update
    async fn publish_experiment_message(
        &self,
        update_type: UpdateType,
        experiment: &Experiment,
    ) -> MessagingResult<()>;

    /// Publish a segmenter create, update or delete
    async fn publish_project_segmenter_message(
        &self,
        update_type: UpdateType,
        segmenter: &SegmenterConfiguration,
        project_id: i64,
    ) -> MessagingResult<()>;

    /// Backend behind this service
    fn kind(&self) -> MessageQueueKind;
}

/// Handle to a single topic on the bus
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    /// Publish one payload and return the message id assigned by the bus
    async fn publish(&self, data: Vec<u8>) -> MessagingResult<String>;

    /// Fully-qualified topic name, for logs
    fn topic(&self) -> &str;
}
