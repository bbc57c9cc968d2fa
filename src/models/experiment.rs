use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use strum::{Display, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExperimentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
pub enum ExperimentType {
    #[serde(rename = "A/B")]
    #[strum(serialize = "A/B")]
    AB,
    Switchback,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExperimentTier {
    Default,
    Override,
}

/// Segmenter values an experiment applies to, as stored (stringified)
pub type ExperimentSegment = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ExperimentTreatment {
    #[validate(length(min = 1))]
    pub name: String,

    /// Percentage of traffic routed to this treatment
    #[serde(default)]
    pub traffic: Option<i32>,

    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// An experiment as persisted by the management service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Experiment {
    pub id: i64,

    pub project_id: i64,

    /// Starts at 1 and increases with every committed change
    pub version: i64,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub experiment_type: ExperimentType,

    /// Switchback interval in minutes
    #[serde(default)]
    pub interval: Option<i32>,

    pub tier: ExperimentTier,

    #[validate(nested)]
    pub treatments: Vec<ExperimentTreatment>,

    #[serde(default)]
    pub segment: ExperimentSegment,

    pub status: ExperimentStatus,

    pub start_time: DateTime<Utc>,

    pub end_time: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_by: String,
}

impl Experiment {
    pub fn is_active(&self) -> bool {
        self.status == ExperimentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_experiment_type_strings() {
        assert_eq!(ExperimentType::AB.to_string(), "A/B");
        assert_eq!(ExperimentType::from_str("Switchback").unwrap(), ExperimentType::Switchback);
        assert_eq!(ExperimentTier::Override.to_string(), "override");
    }

    #[test]
    fn test_experiment_from_json() {
        let experiment: Experiment = serde_json::from_value(json!({
            "id": 1,
            "project_id": 1,
            "version": 1,
            "name": "test-experiment-create",
            "type": "Switchback",
            "interval": 60,
            "tier": "default",
            "treatments": [{"name": "treatment", "traffic": 100, "configuration": {"weight": 0.2}}],
            "segment": {"string_segmenter": ["seg-1", "seg-2"]},
            "status": "active",
            "start_time": "2021-02-02T03:05:06Z",
            "end_time": "2021-02-02T04:05:06Z",
            "updated_at": "2021-02-02T03:00:00Z",
            "updated_by": "integration-test"
        }))
        .unwrap();

        assert!(experiment.is_active());
        assert_eq!(experiment.experiment_type, ExperimentType::Switchback);
        assert_eq!(experiment.segment["string_segmenter"], vec!["seg-1", "seg-2"]);
        assert!(experiment.validate().is_ok());
    }
}
