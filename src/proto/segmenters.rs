//! Segmenter configuration messages shared by the management and treatment services

use std::collections::HashMap;

/// A single typed segmenter value
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmenterValue {
    #[prost(oneof = "segmenter_value::Value", tags = "1, 2, 3, 4")]
    pub value: Option<segmenter_value::Value>,
}

pub mod segmenter_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        String(String),
        #[prost(bool, tag = "2")]
        Bool(bool),
        #[prost(int64, tag = "3")]
        Integer(i64),
        #[prost(double, tag = "4")]
        Real(f64),
    }
}

impl SegmenterValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: Some(segmenter_value::Value::String(value.into())),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            value: Some(segmenter_value::Value::Bool(value)),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            value: Some(segmenter_value::Value::Integer(value)),
        }
    }

    pub fn real(value: f64) -> Self {
        Self {
            value: Some(segmenter_value::Value::Real(value)),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListSegmenterValue {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<SegmenterValue>,
}

impl FromIterator<SegmenterValue> for ListSegmenterValue {
    fn from_iter<I: IntoIterator<Item = SegmenterValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExperimentVariables {
    #[prost(string, repeated, tag = "1")]
    pub value: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListExperimentVariables {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<ExperimentVariables>,
}

/// Prerequisite segmenter values that activate a constraint
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreRequisite {
    #[prost(string, tag = "1")]
    pub segmenter_name: String,
    #[prost(message, optional, tag = "2")]
    pub segmenter_values: Option<ListSegmenterValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Constraint {
    #[prost(message, repeated, tag = "1")]
    pub pre_requisites: Vec<PreRequisite>,
    #[prost(message, optional, tag = "2")]
    pub allowed_values: Option<ListSegmenterValue>,
    #[prost(map = "string, message", tag = "3")]
    pub options: HashMap<String, SegmenterValue>,
}

/// Value type of a segmenter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SegmenterValueType {
    String = 0,
    Bool = 1,
    Integer = 2,
    Real = 3,
}

impl SegmenterValueType {
    /// Name of the variant as declared in the protobuf schema
    pub fn as_str_name(&self) -> &'static str {
        match self {
            SegmenterValueType::String => "STRING",
            SegmenterValueType::Bool => "BOOL",
            SegmenterValueType::Integer => "INTEGER",
            SegmenterValueType::Real => "REAL",
        }
    }
}

/// Full configuration of a project segmenter
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmenterConfiguration {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "SegmenterValueType", tag = "2")]
    pub r#type: i32,
    #[prost(map = "string, message", tag = "3")]
    pub options: HashMap<String, SegmenterValue>,
    #[prost(bool, tag = "4")]
    pub multi_valued: bool,
    #[prost(message, repeated, tag = "5")]
    pub constraints: Vec<Constraint>,
    #[prost(bool, tag = "6")]
    pub required: bool,
    #[prost(string, tag = "7")]
    pub description: String,
    #[prost(message, optional, tag = "8")]
    pub treatment_request_fields: Option<ListExperimentVariables>,
}
