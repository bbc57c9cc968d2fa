//! Publication of committed entity changes to the treatment service
//!
//! Every mutating operation on project settings, experiments and segmenters
//! ends in one call to [`MessageQueueService`]. The active backend turns the
//! post-commit snapshot into a [`MessagePublishState`](crate::proto::MessagePublishState)
//! envelope and delivers it, or drops it when no queue is configured.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │         CRUD services (after commit)             │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │      MessageQueueService trait                   │
//! ├─────────────────────────────────────────────────┤
//! │  - publish_project_settings_message()            │
//! │  - publish_experiment_message()                  │
//! │  - publish_project_segmenter_message()           │
//! └─────────────────────────────────────────────────┘
//!           │                        │
//!           ▼                        ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │  Noop Backend    │    │  Pub/Sub Backend │
//! ├──────────────────┤    ├──────────────────┤
//! │ - Drops updates  │    │ - One topic      │
//! │ - Always Ok      │    │ - Publish timeout│
//! └──────────────────┘    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use xp_management_events::messagequeue::{create_message_queue, MessageQueueConfig, UpdateType};
//! use xp_management_events::proto::pubsub::ProjectSettings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mq = create_message_queue(&MessageQueueConfig::noop()).await?;
//!
//!     let settings = ProjectSettings {
//!         project_id: 2,
//!         ..Default::default()
//!     };
//!     if let Err(e) = mq.publish_project_settings_message(UpdateType::Create, &settings).await {
//!         tracing::warn!(error = %e, "Project settings update was not published");
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod factory;
mod metrics;
mod noop;
mod pubsub;
mod pubsub_client;
mod traits;

pub use config::{MessageQueueConfig, MessageQueueKind, PubSubConfig, PUBSUB_EMULATOR_HOST_ENV};
pub use error::{MessagingError, MessagingResult};
pub use events::{EntityFamily, UpdateType};
pub use factory::create_message_queue;
pub use metrics::{init_message_queue_metrics, MESSAGE_QUEUE_METRICS};
pub use noop::NoopMessageQueue;
pub use pubsub::PubSubMessageQueue;
pub use pubsub_client::{PubSubClient, PubSubTopic};
pub use traits::{MessageQueueService, TopicPublisher};
