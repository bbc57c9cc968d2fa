//! Update messages published by the management service

use super::segmenters::{ListSegmenterValue, SegmenterConfiguration};
use prost_types::{Struct, Timestamp};
use std::collections::HashMap;

/// Snapshot of an experiment after a committed change
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Experiment {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, tag = "2")]
    pub project_id: i64,
    #[prost(enumeration = "experiment::Status", tag = "3")]
    pub status: i32,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(enumeration = "experiment::Type", tag = "5")]
    pub r#type: i32,
    #[prost(int32, tag = "6")]
    pub interval: i32,
    #[prost(message, optional, tag = "7")]
    pub start_time: Option<Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub end_time: Option<Timestamp>,
    #[prost(map = "string, message", tag = "9")]
    pub segments: HashMap<String, ListSegmenterValue>,
    #[prost(message, repeated, tag = "10")]
    pub treatments: Vec<ExperimentTreatment>,
    #[prost(message, optional, tag = "11")]
    pub updated_at: Option<Timestamp>,
    #[prost(enumeration = "experiment::Tier", tag = "12")]
    pub tier: i32,
    #[prost(int64, tag = "13")]
    pub version: i64,
}

pub mod experiment {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        AB = 0,
        Switchback = 1,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Status {
        Active = 0,
        Inactive = 1,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Tier {
        Default = 0,
        Override = 1,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExperimentTreatment {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint32, tag = "2")]
    pub traffic: u32,
    #[prost(message, optional, tag = "3")]
    pub config: Option<Struct>,
}

/// Snapshot of a project's experimentation settings
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSettings {
    #[prost(int64, tag = "1")]
    pub project_id: i64,
    #[prost(message, optional, tag = "2")]
    pub created_at: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub updated_at: Option<Timestamp>,
    #[prost(string, tag = "4")]
    pub username: String,
    #[prost(string, tag = "5")]
    pub passkey: String,
    #[prost(bool, tag = "6")]
    pub enable_s2id_clustering: bool,
    #[prost(message, optional, tag = "7")]
    pub segmenters: Option<Segmenters>,
    #[prost(string, tag = "8")]
    pub randomization_key: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Segmenters {
    #[prost(string, repeated, tag = "1")]
    pub names: Vec<String>,
    #[prost(map = "string, message", tag = "2")]
    pub variables: HashMap<String, ExperimentVariables>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExperimentVariables {
    #[prost(string, repeated, tag = "1")]
    pub value: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExperimentCreated {
    #[prost(message, optional, tag = "1")]
    pub experiment: Option<Experiment>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExperimentUpdated {
    #[prost(message, optional, tag = "1")]
    pub experiment: Option<Experiment>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSettingsCreated {
    #[prost(message, optional, tag = "1")]
    pub project_settings: Option<ProjectSettings>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSettingsUpdated {
    #[prost(message, optional, tag = "1")]
    pub project_settings: Option<ProjectSettings>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSegmenterCreated {
    #[prost(int64, tag = "1")]
    pub project_id: i64,
    #[prost(message, optional, tag = "2")]
    pub project_segmenter: Option<SegmenterConfiguration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSegmenterUpdated {
    #[prost(int64, tag = "1")]
    pub project_id: i64,
    #[prost(message, optional, tag = "2")]
    pub project_segmenter: Option<SegmenterConfiguration>,
}

/// Deletions only identify the segmenter; there is nothing left to snapshot
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectSegmenterDeleted {
    #[prost(int64, tag = "1")]
    pub project_id: i64,
    #[prost(string, tag = "2")]
    pub segmenter_name: String,
}

/// The envelope placed on the topic. Exactly one update is set.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessagePublishState {
    #[prost(oneof = "message_publish_state::Update", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub update: Option<message_publish_state::Update>,
}

pub mod message_publish_state {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Update {
        #[prost(message, tag = "1")]
        ExperimentCreated(super::ExperimentCreated),
        #[prost(message, tag = "2")]
        ExperimentUpdated(super::ExperimentUpdated),
        #[prost(message, tag = "3")]
        ProjectSettingsCreated(super::ProjectSettingsCreated),
        #[prost(message, tag = "4")]
        ProjectSettingsUpdated(super::ProjectSettingsUpdated),
        #[prost(message, tag = "5")]
        ProjectSegmenterCreated(super::ProjectSegmenterCreated),
        #[prost(message, tag = "6")]
        ProjectSegmenterUpdated(super::ProjectSegmenterUpdated),
        #[prost(message, tag = "7")]
        ProjectSegmenterDeleted(super::ProjectSegmenterDeleted),
    }
}
