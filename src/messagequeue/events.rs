//! Update types and envelope construction

use crate::messagequeue::error::{MessagingError, MessagingResult};
use crate::proto::message_publish_state::Update;
use crate::proto::pubsub::{
    Experiment, ExperimentCreated, ExperimentUpdated, ProjectSegmenterCreated,
    ProjectSegmenterDeleted, ProjectSegmenterUpdated, ProjectSettings, ProjectSettingsCreated,
    ProjectSettingsUpdated,
};
use crate::proto::segmenters::SegmenterConfiguration;
use crate::proto::MessagePublishState;
use prost::Message;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of change that was committed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpdateType {
    Create,
    Update,
    Delete,
}

/// Kind of entity an envelope describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityFamily {
    ProjectSettings,
    Experiment,
    ProjectSegmenter,
}

impl MessagePublishState {
    /// Envelope for a project settings change. Settings cannot be deleted.
    pub fn for_project_settings(
        update_type: UpdateType,
        settings: &ProjectSettings,
    ) -> MessagingResult<Self> {
        let project_settings = Some(settings.clone());
        let update = match update_type {
            UpdateType::Create => {
                Update::ProjectSettingsCreated(ProjectSettingsCreated { project_settings })
            }
            UpdateType::Update => {
                Update::ProjectSettingsUpdated(ProjectSettingsUpdated { project_settings })
            }
            UpdateType::Delete => {
                return Err(MessagingError::unsupported(EntityFamily::ProjectSettings, update_type))
            }
        };
        Ok(Self { update: Some(update) })
    }

    /// Envelope for an experiment change. Experiments cannot be deleted.
    pub fn for_experiment(
        update_type: UpdateType,
        experiment: &Experiment,
    ) -> MessagingResult<Self> {
        let experiment = Some(experiment.clone());
        let update = match update_type {
            UpdateType::Create => Update::ExperimentCreated(ExperimentCreated { experiment }),
            UpdateType::Update => Update::ExperimentUpdated(ExperimentUpdated { experiment }),
            UpdateType::Delete => {
                return Err(MessagingError::unsupported(EntityFamily::Experiment, update_type))
            }
        };
        Ok(Self { update: Some(update) })
    }

    /// Envelope for a segmenter change. Deletions only carry the project id
    /// and the segmenter name.
    pub fn for_project_segmenter(
        update_type: UpdateType,
        segmenter: &SegmenterConfiguration,
        project_id: i64,
    ) -> Self {
        let update = match update_type {
            UpdateType::Create => Update::ProjectSegmenterCreated(ProjectSegmenterCreated {
                project_id,
                project_segmenter: Some(segmenter.clone()),
            }),
            UpdateType::Update => Update::ProjectSegmenterUpdated(ProjectSegmenterUpdated {
                project_id,
                project_segmenter: Some(segmenter.clone()),
            }),
            UpdateType::Delete => Update::ProjectSegmenterDeleted(ProjectSegmenterDeleted {
                project_id,
                segmenter_name: segmenter.name.clone(),
            }),
        };
        Self { update: Some(update) }
    }

    /// Entity family and update type of the populated variant
    pub fn update_kind(&self) -> Option<(EntityFamily, UpdateType)> {
        let kind = match self.update.as_ref()? {
            Update::ExperimentCreated(_) => (EntityFamily::Experiment, UpdateType::Create),
            Update::ExperimentUpdated(_) => (EntityFamily::Experiment, UpdateType::Update),
            Update::ProjectSettingsCreated(_) => {
                (EntityFamily::ProjectSettings, UpdateType::Create)
            }
            Update::ProjectSettingsUpdated(_) => {
                (EntityFamily::ProjectSettings, UpdateType::Update)
            }
            Update::ProjectSegmenterCreated(_) => {
                (EntityFamily::ProjectSegmenter, UpdateType::Create)
            }
            Update::ProjectSegmenterUpdated(_) => {
                (EntityFamily::ProjectSegmenter, UpdateType::Update)
            }
            Update::ProjectSegmenterDeleted(_) => {
                (EntityFamily::ProjectSegmenter, UpdateType::Delete)
            }
        };
        Some(kind)
    }

    /// Serialize to the protobuf wire format
    pub fn to_bytes(&self) -> MessagingResult<Vec<u8>> {
        if self.update.is_none() {
            return Err(MessagingError::EncodingError(
                "envelope has no update set".to_string(),
            ));
        }
        Ok(self.encode_to_vec())
    }

    /// Parse an envelope received from the topic
    pub fn decode_from(bytes: &[u8]) -> MessagingResult<Self> {
        let envelope = Self::decode(bytes)
            .map_err(|e| MessagingError::InvalidMessage(format!("Invalid envelope: {}", e)))?;
        if envelope.update.is_none() {
            return Err(MessagingError::InvalidMessage(
                "envelope has no update set".to_string(),
            ));
        }
        Ok(envelope)
    }
}
