//! Common test utilities for update publication tests
//!
//! Snapshot fixtures mirroring what the management service publishes, and
//! in-process topic publishers that stand in for Pub/Sub.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use prost_types::{value::Kind, Struct, Timestamp, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use xp_management_events::messagequeue::{MessagingResult, TopicPublisher};
use xp_management_events::proto::pubsub::{
    experiment, Experiment, ExperimentTreatment, ExperimentVariables, ProjectSettings, Segmenters,
};
use xp_management_events::proto::segmenters::{
    self, Constraint, ListSegmenterValue, PreRequisite, SegmenterConfiguration, SegmenterValue,
    SegmenterValueType,
};
use xp_management_events::proto::MessagePublishState;

/// Records every payload and acknowledges it with an increasing id
#[derive(Default)]
pub struct RecordingPublisher {
    payloads: Mutex<Vec<Vec<u8>>>,
}

impl RecordingPublisher {
    pub fn envelopes(&self) -> Vec<MessagePublishState> {
        self.payloads
            .lock()
            .iter()
            .map(|p| MessagePublishState::decode_from(p).expect("recorded payload is an envelope"))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.payloads.lock().len()
    }
}

#[async_trait]
impl TopicPublisher for RecordingPublisher {
    async fn publish(&self, data: Vec<u8>) -> MessagingResult<String> {
        let mut payloads = self.payloads.lock();
        payloads.push(data);
        Ok(format!("msg-{}", payloads.len()))
    }

    fn topic(&self) -> &str {
        "projects/test/topics/update"
    }
}

/// Acknowledges after a fixed delay
pub struct DelayedPublisher {
    pub delay: Duration,
    /// Publish attempts started
    pub calls: Mutex<usize>,
    /// Publishes that ran to completion
    pub delivered: Mutex<usize>,
}

impl DelayedPublisher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Mutex::new(0),
            delivered: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TopicPublisher for DelayedPublisher {
    async fn publish(&self, _data: Vec<u8>) -> MessagingResult<String> {
        *self.calls.lock() += 1;
        tokio::time::sleep(self.delay).await;
        *self.delivered.lock() += 1;
        Ok("late".to_string())
    }

    fn topic(&self) -> &str {
        "projects/test/topics/slow"
    }
}

pub fn project_settings() -> ProjectSettings {
    let variables = HashMap::from([
        ("seg-5".to_string(), experiment_variables(&["exp-var-5.1", "exp-var-5.2"])),
        ("seg-6".to_string(), experiment_variables(&["exp-var-6"])),
    ]);

    ProjectSettings {
        project_id: 2,
        created_at: Some(timestamp(1_600_000_000)),
        updated_at: Some(timestamp(1_600_003_600)),
        username: "client-2".to_string(),
        passkey: "passkey-2".to_string(),
        enable_s2id_clustering: true,
        segmenters: Some(Segmenters {
            names: vec!["seg-5".to_string(), "seg-6".to_string()],
            variables,
        }),
        randomization_key: "rand-3".to_string(),
    }
}

fn timestamp(seconds: i64) -> Timestamp {
    Timestamp { seconds, nanos: 0 }
}

fn experiment_variables(values: &[&str]) -> ExperimentVariables {
    ExperimentVariables {
        value: values.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn experiment() -> Experiment {
    Experiment {
        id: 1,
        project_id: 1,
        status: experiment::Status::Active as i32,
        name: "test-experiment-create".to_string(),
        r#type: experiment::Type::Switchback as i32,
        interval: 60,
        start_time: Some(timestamp(1_600_000_000)),
        end_time: Some(timestamp(1_600_086_400)),
        segments: HashMap::from([(
            "days_of_week".to_string(),
            [SegmenterValue::integer(1)].into_iter().collect::<ListSegmenterValue>(),
        )]),
        treatments: vec![ExperimentTreatment {
            name: "control".to_string(),
            traffic: 100,
            config: Some(Struct {
                fields: BTreeMap::from([(
                    "team".to_string(),
                    Value {
                        kind: Some(Kind::StringValue("xp".to_string())),
                    },
                )]),
            }),
        }],
        updated_at: Some(timestamp(1_599_990_000)),
        tier: experiment::Tier::Override as i32,
        version: 1,
    }
}

pub fn segmenter() -> SegmenterConfiguration {
    SegmenterConfiguration {
        name: "test-new-custom-segmenter".to_string(),
        r#type: SegmenterValueType::Integer as i32,
        options: HashMap::from([
            ("label".to_string(), SegmenterValue::string("weekday")),
            ("enabled".to_string(), SegmenterValue::bool(true)),
            ("monday".to_string(), SegmenterValue::integer(1)),
            ("weight".to_string(), SegmenterValue::real(0.25)),
        ]),
        multi_valued: true,
        constraints: vec![Constraint {
            pre_requisites: vec![PreRequisite {
                segmenter_name: "is_premium".to_string(),
                segmenter_values: Some(
                    [SegmenterValue::bool(true)].into_iter().collect::<ListSegmenterValue>(),
                ),
            }],
            allowed_values: Some(
                [SegmenterValue::integer(1), SegmenterValue::integer(2)]
                    .into_iter()
                    .collect::<ListSegmenterValue>(),
            ),
            options: HashMap::from([
                ("monday".to_string(), SegmenterValue::integer(1)),
                ("ratio".to_string(), SegmenterValue::real(1.5)),
            ]),
        }],
        required: false,
        description: "test description".to_string(),
        treatment_request_fields: Some(segmenters::ListExperimentVariables {
            values: vec![segmenters::ExperimentVariables {
                value: vec!["test-new-custom-segmenter".to_string()],
            }],
        }),
    }
}
