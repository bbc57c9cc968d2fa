//! Message queue that drops every update

use crate::messagequeue::config::MessageQueueKind;
use crate::messagequeue::error::MessagingResult;
use crate::messagequeue::events::UpdateType;
use crate::messagequeue::traits::MessageQueueService;
use crate::proto::pubsub::{Experiment, ProjectSettings};
use crate::proto::segmenters::SegmenterConfiguration;
use async_trait::async_trait;

/// Used when no message queue is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMessageQueue;

impl NoopMessageQueue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageQueueService for NoopMessageQueue {
    async fn publish_project_settings_message(
        &self,
        update_type: UpdateType,
        settings: &ProjectSettings,
    ) -> MessagingResult<()> {
        tracing::trace!(
            project_id = settings.project_id,
            %update_type,
            "Dropping project settings update"
        );
        Ok(())
    }

    async fn publish_experiment_message(
        &self,
        update_type: UpdateType,
        experiment: &Experiment,
    ) -> MessagingResult<()> {
        tracing::trace!(experiment_id = experiment.id, %update_type, "Dropping experiment update");
        Ok(())
    }

    async fn publish_project_segmenter_message(
        &self,
        update_type: UpdateType,
        segmenter: &SegmenterConfiguration,
        project_id: i64,
    ) -> MessagingResult<()> {
        tracing::trace!(
            project_id,
            segmenter = %segmenter.name,
            %update_type,
            "Dropping segmenter update"
        );
        Ok(())
    }

    fn kind(&self) -> MessageQueueKind {
        MessageQueueKind::Noop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_accepts_everything() {
        let mq = NoopMessageQueue::new();

        let segmenter = SegmenterConfiguration::default();
        for update_type in [UpdateType::Create, UpdateType::Update, UpdateType::Delete] {
            assert!(mq
                .publish_project_settings_message(update_type, &ProjectSettings::default())
                .await
                .is_ok());
            assert!(mq
                .publish_experiment_message(update_type, &Experiment::default())
                .await
                .is_ok());
            assert!(mq
                .publish_project_segmenter_message(update_type, &segmenter, 1)
                .await
                .is_ok());
        }
        assert_eq!(mq.kind(), MessageQueueKind::Noop);
    }
}
