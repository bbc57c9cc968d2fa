use crate::messagequeue::config::{MessageQueueConfig, MessageQueueKind};
use crate::messagequeue::error::MessagingResult;
use crate::messagequeue::noop::NoopMessageQueue;
use crate::messagequeue::pubsub::PubSubMessageQueue;
use crate::messagequeue::traits::MessageQueueService;
use std::sync::Arc;

/// Create the message queue selected by configuration
pub async fn create_message_queue(
    config: &MessageQueueConfig,
) -> MessagingResult<Arc<dyn MessageQueueService>> {
    match config.kind()? {
        MessageQueueKind::Noop => {
            tracing::info!("No message queue configured, updates will not be published");
            Ok(Arc::new(NoopMessageQueue::new()))
        }

        MessageQueueKind::PubSub => {
            let pubsub = config.pubsub_config()?;

            tracing::info!(
                project = %pubsub.project,
                topic = %pubsub.topic_name,
                "Initializing Pub/Sub message queue"
            );

            let mq = PubSubMessageQueue::connect(pubsub).await?;
            Ok(Arc::new(mq))
        }
    }
}
