use crate::error::{AppError, Result};
use crate::models::{
    CustomSegmenter, Experiment, ExperimentStatus, ExperimentTier, ExperimentType,
    SegmenterValueType, Settings,
};
use crate::proto::pubsub::{self, experiment};
use crate::proto::segmenters::{
    self, segmenter_value, Constraint, ListExperimentVariables, ListSegmenterValue, PreRequisite,
    SegmenterConfiguration, SegmenterValue,
};
use chrono::{DateTime, Utc};
use prost_types::{value::Kind, ListValue, NullValue, Struct, Timestamp};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

impl From<ExperimentStatus> for experiment::Status {
    fn from(status: ExperimentStatus) -> Self {
        match status {
            ExperimentStatus::Active => experiment::Status::Active,
            ExperimentStatus::Inactive => experiment::Status::Inactive,
        }
    }
}

impl From<experiment::Status> for ExperimentStatus {
    fn from(status: experiment::Status) -> Self {
        match status {
            experiment::Status::Active => ExperimentStatus::Active,
            experiment::Status::Inactive => ExperimentStatus::Inactive,
        }
    }
}

impl From<ExperimentType> for experiment::Type {
    fn from(experiment_type: ExperimentType) -> Self {
        match experiment_type {
            ExperimentType::AB => experiment::Type::AB,
            ExperimentType::Switchback => experiment::Type::Switchback,
        }
    }
}

impl From<ExperimentTier> for experiment::Tier {
    fn from(tier: ExperimentTier) -> Self {
        match tier {
            ExperimentTier::Default => experiment::Tier::Default,
            ExperimentTier::Override => experiment::Tier::Override,
        }
    }
}

impl From<SegmenterValueType> for segmenters::SegmenterValueType {
    fn from(value_type: SegmenterValueType) -> Self {
        match value_type {
            SegmenterValueType::String => segmenters::SegmenterValueType::String,
            SegmenterValueType::Bool => segmenters::SegmenterValueType::Bool,
            SegmenterValueType::Integer => segmenters::SegmenterValueType::Integer,
            SegmenterValueType::Real => segmenters::SegmenterValueType::Real,
        }
    }
}

/// Convert DateTime<Utc> to Timestamp
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Option<Timestamp> {
    Some(Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    })
}

/// Convert Timestamp to DateTime<Utc>, `None` if absent or out of range
pub fn timestamp_to_datetime(ts: Option<&Timestamp>) -> Option<DateTime<Utc>> {
    ts.and_then(|t| DateTime::from_timestamp(t.seconds, t.nanos as u32))
}

/// Convert a JSON object into a `google.protobuf.Struct`
pub fn json_to_struct(map: &Map<String, Value>) -> Struct {
    Struct {
        fields: map
            .iter()
            .map(|(key, value)| (key.clone(), json_to_value(value)))
            .collect(),
    }
}

fn json_to_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(NullValue::NullValue as i32),
        Value::Bool(b) => Kind::BoolValue(*b),
        // Struct numbers are doubles on the wire
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(json_to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(json_to_struct(map)),
    };
    prost_types::Value { kind: Some(kind) }
}

/// Convert a `google.protobuf.Struct` back into a JSON object
pub fn struct_to_json(s: &Struct) -> Map<String, Value> {
    s.fields
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect()
}

fn value_to_json(value: &prost_types::Value) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::NumberValue(n)) => {
            Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
        }
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(struct_to_json(s)),
    }
}

/// Type stored segment values. Unparsable values take the type's zero value.
pub fn segment_values_to_proto(
    values: &[String],
    value_type: SegmenterValueType,
) -> ListSegmenterValue {
    values
        .iter()
        .map(|raw| match value_type {
            SegmenterValueType::String => SegmenterValue::string(raw.as_str()),
            SegmenterValueType::Integer => SegmenterValue::integer(raw.parse().unwrap_or_default()),
            SegmenterValueType::Real => SegmenterValue::real(raw.parse().unwrap_or_default()),
            SegmenterValueType::Bool => SegmenterValue::bool(raw.parse().unwrap_or_default()),
        })
        .collect()
}

/// Convert a JSON value to a segmenter value of the given type, or infer the
/// type from the JSON value when none is known.
pub fn json_to_segmenter_value(
    value: &Value,
    value_type: Option<SegmenterValueType>,
) -> Result<SegmenterValue> {
    let converted = match (value_type, value) {
        (Some(SegmenterValueType::String) | None, Value::String(s)) => {
            Some(SegmenterValue::string(s.as_str()))
        }
        (Some(SegmenterValueType::Bool) | None, Value::Bool(b)) => Some(SegmenterValue::bool(*b)),
        (Some(SegmenterValueType::Integer), Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(SegmenterValue::integer),
        (Some(SegmenterValueType::Real), Value::Number(n)) => n.as_f64().map(SegmenterValue::real),
        (None, Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(SegmenterValue::integer(i)),
            None => n.as_f64().map(SegmenterValue::real),
        },
        _ => None,
    };

    converted.ok_or_else(|| {
        AppError::Validation(format!(
            "segmenter value {} is not a valid {}",
            value,
            value_type.map(|t| t.to_string()).unwrap_or_else(|| "segmenter value".to_string())
        ))
    })
}

fn json_list_to_proto(
    values: &[Value],
    value_type: Option<SegmenterValueType>,
) -> Result<ListSegmenterValue> {
    values
        .iter()
        .map(|v| json_to_segmenter_value(v, value_type))
        .collect::<Result<Vec<_>>>()
        .map(|values| ListSegmenterValue { values })
}

fn options_to_proto(
    options: Option<&Map<String, Value>>,
    value_type: SegmenterValueType,
) -> Result<HashMap<String, SegmenterValue>> {
    options
        .into_iter()
        .flatten()
        .map(|(name, value)| -> Result<(String, SegmenterValue)> {
            Ok((name.clone(), json_to_segmenter_value(value, Some(value_type))?))
        })
        .collect()
}

impl Experiment {
    /// Build the published snapshot. Segment values are typed using the
    /// project's segmenter types. Segmenters without a known type and
    /// segmenters with no values are omitted.
    pub fn to_proto(
        &self,
        segmenter_types: &HashMap<String, SegmenterValueType>,
    ) -> pubsub::Experiment {
        let segments = self
            .segment
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .filter_map(|(name, values)| {
                let value_type = segmenter_types.get(name).copied()?;
                Some((name.clone(), segment_values_to_proto(values, value_type)))
            })
            .collect();

        let treatments = self
            .treatments
            .iter()
            .map(|t| pubsub::ExperimentTreatment {
                name: t.name.clone(),
                traffic: t.traffic.map(|traffic| traffic.max(0) as u32).unwrap_or(0),
                config: Some(json_to_struct(&t.configuration)),
            })
            .collect();

        pubsub::Experiment {
            id: self.id,
            project_id: self.project_id,
            status: experiment::Status::from(self.status) as i32,
            name: self.name.clone(),
            r#type: experiment::Type::from(self.experiment_type) as i32,
            interval: self.interval.unwrap_or(0),
            start_time: datetime_to_timestamp(self.start_time),
            end_time: datetime_to_timestamp(self.end_time),
            segments,
            treatments,
            updated_at: datetime_to_timestamp(self.updated_at),
            tier: experiment::Tier::from(self.tier) as i32,
            version: self.version,
        }
    }
}

impl Settings {
    /// Build the published snapshot of the project settings
    pub fn to_proto(&self) -> pubsub::ProjectSettings {
        let config = self.config.clone().unwrap_or_default();
        let variables = config
            .segmenters
            .variables
            .into_iter()
            .map(|(name, value)| (name, pubsub::ExperimentVariables { value }))
            .collect();

        pubsub::ProjectSettings {
            project_id: self.project_id,
            created_at: datetime_to_timestamp(self.created_at),
            updated_at: datetime_to_timestamp(self.updated_at),
            username: self.username.clone(),
            passkey: self.passkey.clone(),
            enable_s2id_clustering: config.s2id_clustering_enabled,
            segmenters: Some(pubsub::Segmenters {
                names: config.segmenters.names,
                variables,
            }),
            randomization_key: config.randomization_key,
        }
    }
}

impl CustomSegmenter {
    /// Build the published segmenter configuration. Prerequisite values are
    /// typed by their own segmenter when `segmenter_types` knows it.
    pub fn to_configuration(
        &self,
        segmenter_types: &HashMap<String, SegmenterValueType>,
    ) -> Result<SegmenterConfiguration> {
        let constraints = self
            .constraints
            .iter()
            .flatten()
            .map(|constraint| -> Result<Constraint> {
                let pre_requisites = constraint
                    .pre_requisites
                    .iter()
                    .map(|p| -> Result<PreRequisite> {
                        let value_type = segmenter_types.get(&p.segmenter_name).copied();
                        let values = json_list_to_proto(&p.segmenter_values, value_type)?;
                        Ok(PreRequisite {
                            segmenter_name: p.segmenter_name.clone(),
                            segmenter_values: Some(values),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                let allowed_values =
                    json_list_to_proto(&constraint.allowed_values, Some(self.value_type))?;
                Ok(Constraint {
                    pre_requisites,
                    allowed_values: Some(allowed_values),
                    options: options_to_proto(constraint.options.as_ref(), self.value_type)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SegmenterConfiguration {
            name: self.name.clone(),
            r#type: segmenters::SegmenterValueType::from(self.value_type) as i32,
            options: options_to_proto(self.options.as_ref(), self.value_type)?,
            multi_valued: self.multi_valued,
            constraints,
            required: self.required,
            description: self.description.clone().unwrap_or_default(),
            treatment_request_fields: Some(ListExperimentVariables {
                values: vec![segmenters::ExperimentVariables {
                    value: vec![self.name.clone()],
                }],
            }),
        })
    }
}

/// Read a string segmenter value, if that is what it holds
pub fn segmenter_value_as_str(value: &SegmenterValue) -> Option<&str> {
    match &value.value {
        Some(segmenter_value::Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}
