use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Segmenters selected for a project and the request variables that feed them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectSegmenters {
    pub names: Vec<String>,

    #[serde(default)]
    pub variables: HashMap<String, Vec<String>>,
}

/// Project-wide experimentation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperimentationConfig {
    pub segmenters: ProjectSegmenters,

    /// Field of the request payload used for randomization
    pub randomization_key: String,

    /// Use the S2ID cluster as the randomization unit for switchback experiments
    #[serde(default, rename = "enable_s2id_clustering")]
    pub s2id_clustering_enabled: bool,
}

/// Experimentation settings of a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub project_id: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Used by the treatment service's fetch API for authentication
    pub username: String,

    pub passkey: String,

    pub config: Option<ExperimentationConfig>,
}

impl Settings {
    pub fn new(
        project_id: i64,
        username: impl Into<String>,
        config: ExperimentationConfig,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id,
            created_at: now,
            updated_at: now,
            username: username.into(),
            passkey: String::new(),
            config: Some(config),
        }
    }
}
