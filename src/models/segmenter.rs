use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use validator::Validate;

/// The types a segmenter's values can take
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum SegmenterValueType {
    String,
    Bool,
    Integer,
    Real,
}

/// Free-form options attached to a segmenter or a constraint
pub type Options = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreRequisite {
    /// Name of the single-valued segmenter this constraint depends on
    pub segmenter_name: String,

    /// Values of the prerequisite segmenter, one of which must match
    pub segmenter_values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    #[serde(default)]
    pub pre_requisites: Vec<PreRequisite>,

    #[serde(default)]
    pub allowed_values: Vec<Value>,

    #[serde(default)]
    pub options: Option<Options>,
}

/// A project-scoped segmenter defined by users of the management service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct CustomSegmenter {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub project_id: i64,

    #[serde(rename = "type")]
    pub value_type: SegmenterValueType,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub multi_valued: bool,

    #[serde(default)]
    pub options: Option<Options>,

    #[serde(default)]
    pub constraints: Option<Vec<Constraint>>,
}

impl CustomSegmenter {
    /// Create a segmenter with no options or constraints
    pub fn new(project_id: i64, name: impl Into<String>, value_type: SegmenterValueType) -> Self {
        Self {
            name: name.into(),
            project_id,
            value_type,
            description: None,
            required: false,
            multi_valued: false,
            options: None,
            constraints: None,
        }
    }
}
