//! Protobuf schema of the update envelopes consumed by the treatment service.
//!
//! The contract is declared in `proto/pubsub.proto` and `proto/segmenters.proto`.
//! The messages below carry prost derives mirroring those files; field tags are
//! part of the wire contract and must not be renumbered.

pub mod conversions;
pub mod pubsub;
pub mod segmenters;

pub use pubsub::{message_publish_state, MessagePublishState};

#[cfg(test)]
mod tests {
    use super::message_publish_state::Update;
    use super::pubsub::{self, experiment};
    use super::segmenters::{
        self, Constraint, ListExperimentVariables, ListSegmenterValue, PreRequisite,
        SegmenterConfiguration, SegmenterValue, SegmenterValueType,
    };
    use prost::encoding::{decode_key, skip_field, DecodeContext, WireType};
    use prost::Message;
    use prost_types::{value::Kind, Struct, Timestamp, Value};
    use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

    const PUBSUB_PROTO: &str = include_str!("../../proto/pubsub.proto");
    const SEGMENTERS_PROTO: &str = include_str!("../../proto/segmenters.proto");

    type Fields = BTreeSet<(u32, u8)>;

    fn wire_type(field_type: &str, enums: &HashSet<&str>) -> u8 {
        let wire = match field_type {
            "int32" | "int64" | "uint32" | "uint64" | "bool" => WireType::Varint,
            "double" => WireType::SixtyFourBit,
            "float" => WireType::ThirtyTwoBit,
            t if enums.contains(t) => WireType::Varint,
            _ => WireType::LengthDelimited,
        };
        wire as u8
    }

    /// Tags and wire types declared per message in a .proto file
    fn declared_fields(schema: &str) -> HashMap<String, Fields> {
        let enums: HashSet<&str> = schema
            .lines()
            .filter_map(|line| line.trim().strip_prefix("enum "))
            .filter_map(|rest| rest.split_whitespace().next())
            .collect();

        let mut messages: HashMap<String, Fields> = HashMap::new();
        let mut scopes: Vec<(&str, &str)> = Vec::new();
        for line in schema.lines() {
            let line = line.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            if let Some(block) = line.strip_suffix('{') {
                let mut words = block.split_whitespace();
                let kind = words.next().unwrap_or_default();
                scopes.push((kind, words.next().unwrap_or_default()));
                continue;
            }
            if line == "}" {
                scopes.pop();
                continue;
            }
            if matches!(scopes.last(), None | Some(("enum", _))) {
                continue;
            }
            let Some(&(_, message)) = scopes.iter().rev().find(|(kind, _)| *kind == "message")
            else {
                continue;
            };
            let Some((decl, tag)) = line.trim_end_matches(';').split_once('=') else {
                continue;
            };
            let field_type = decl
                .split_whitespace()
                .find(|word| *word != "repeated")
                .unwrap();
            messages
                .entry(message.to_string())
                .or_default()
                .insert((tag.trim().parse().unwrap(), wire_type(field_type, &enums)));
        }
        messages
    }

    /// Tags and wire types prost actually writes for the given messages
    fn encoded_fields<M: Message>(messages: &[M]) -> Fields {
        let mut fields = Fields::new();
        for message in messages {
            let bytes = message.encode_to_vec();
            let mut buf = bytes.as_slice();
            while !buf.is_empty() {
                let (tag, wire) = decode_key(&mut buf).unwrap();
                skip_field(wire, tag, &mut buf, DecodeContext::default()).unwrap();
                fields.insert((tag, wire as u8));
            }
        }
        fields
    }

    fn timestamp() -> Option<Timestamp> {
        Some(Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        })
    }

    fn values() -> ListSegmenterValue {
        [SegmenterValue::integer(1), SegmenterValue::integer(2)]
            .into_iter()
            .collect()
    }

    fn request_fields() -> ListExperimentVariables {
        ListExperimentVariables {
            values: vec![segmenters::ExperimentVariables {
                value: vec!["dow".to_string()],
            }],
        }
    }

    fn pre_requisite() -> PreRequisite {
        PreRequisite {
            segmenter_name: "country".to_string(),
            segmenter_values: Some([SegmenterValue::string("SG")].into_iter().collect()),
        }
    }

    fn constraint() -> Constraint {
        Constraint {
            pre_requisites: vec![pre_requisite()],
            allowed_values: Some(values()),
            options: HashMap::from([("Monday".to_string(), SegmenterValue::integer(1))]),
        }
    }

    fn segmenter() -> SegmenterConfiguration {
        SegmenterConfiguration {
            name: "days_of_week".to_string(),
            r#type: SegmenterValueType::Integer as i32,
            options: HashMap::from([("Monday".to_string(), SegmenterValue::integer(1))]),
            multi_valued: true,
            constraints: vec![constraint()],
            required: true,
            description: "Day of the week".to_string(),
            treatment_request_fields: Some(request_fields()),
        }
    }

    fn treatment() -> pubsub::ExperimentTreatment {
        pubsub::ExperimentTreatment {
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
        }
    }

    fn experiment() -> pubsub::Experiment {
        pubsub::Experiment {
            id: 1,
            project_id: 2,
            status: experiment::Status::Inactive as i32,
            name: "exp-1".to_string(),
            r#type: experiment::Type::Switchback as i32,
            interval: 30,
            start_time: timestamp(),
            end_time: timestamp(),
            segments: HashMap::from([("days_of_week".to_string(), values())]),
            treatments: vec![treatment()],
            updated_at: timestamp(),
            tier: experiment::Tier::Override as i32,
            version: 3,
        }
    }

    fn segmenters_list() -> pubsub::Segmenters {
        pubsub::Segmenters {
            names: vec!["days_of_week".to_string()],
            variables: HashMap::from([(
                "days_of_week".to_string(),
                pubsub::ExperimentVariables {
                    value: vec!["dow".to_string()],
                },
            )]),
        }
    }

    fn project_settings() -> pubsub::ProjectSettings {
        pubsub::ProjectSettings {
            project_id: 2,
            created_at: timestamp(),
            updated_at: timestamp(),
            username: "client-2".to_string(),
            passkey: "secret".to_string(),
            enable_s2id_clustering: true,
            segmenters: Some(segmenters_list()),
            randomization_key: "rand-3".to_string(),
        }
    }

    fn envelopes() -> Vec<pubsub::MessagePublishState> {
        let experiment = Some(experiment());
        let project_settings = Some(project_settings());
        let project_segmenter = Some(segmenter());
        [
            Update::ExperimentCreated(pubsub::ExperimentCreated {
                experiment: experiment.clone(),
            }),
            Update::ExperimentUpdated(pubsub::ExperimentUpdated { experiment }),
            Update::ProjectSettingsCreated(pubsub::ProjectSettingsCreated {
                project_settings: project_settings.clone(),
            }),
            Update::ProjectSettingsUpdated(pubsub::ProjectSettingsUpdated { project_settings }),
            Update::ProjectSegmenterCreated(pubsub::ProjectSegmenterCreated {
                project_id: 2,
                project_segmenter: project_segmenter.clone(),
            }),
            Update::ProjectSegmenterUpdated(pubsub::ProjectSegmenterUpdated {
                project_id: 2,
                project_segmenter,
            }),
            Update::ProjectSegmenterDeleted(pubsub::ProjectSegmenterDeleted {
                project_id: 2,
                segmenter_name: "days_of_week".to_string(),
            }),
        ]
        .into_iter()
        .map(|update| pubsub::MessagePublishState {
            update: Some(update),
        })
        .collect()
    }

    #[test]
    fn test_segmenters_schema_matches_messages() {
        let declared = declared_fields(SEGMENTERS_PROTO);
        assert_eq!(declared.len(), 7);

        let typed_values = [
            SegmenterValue::string("SG"),
            SegmenterValue::bool(true),
            SegmenterValue::integer(7),
            SegmenterValue::real(0.5),
        ];
        assert_eq!(declared["SegmenterValue"], encoded_fields(&typed_values));
        assert_eq!(declared["ListSegmenterValue"], encoded_fields(&[values()]));
        assert_eq!(
            declared["ExperimentVariables"],
            encoded_fields(&request_fields().values)
        );
        assert_eq!(
            declared["ListExperimentVariables"],
            encoded_fields(&[request_fields()])
        );
        assert_eq!(declared["PreRequisite"], encoded_fields(&[pre_requisite()]));
        assert_eq!(declared["Constraint"], encoded_fields(&[constraint()]));
        assert_eq!(declared["SegmenterConfiguration"], encoded_fields(&[segmenter()]));
    }

    #[test]
    fn test_pubsub_schema_matches_messages() {
        let declared = declared_fields(PUBSUB_PROTO);
        assert_eq!(declared.len(), 13);

        assert_eq!(declared["Experiment"], encoded_fields(&[experiment()]));
        assert_eq!(declared["ExperimentTreatment"], encoded_fields(&[treatment()]));
        assert_eq!(declared["ProjectSettings"], encoded_fields(&[project_settings()]));
        assert_eq!(declared["Segmenters"], encoded_fields(&[segmenters_list()]));
        assert_eq!(
            declared["ExperimentVariables"],
            encoded_fields(&segmenters_list().variables.into_values().collect::<Vec<_>>())
        );
        assert_eq!(declared["MessagePublishState"], encoded_fields(&envelopes()));

        for envelope in envelopes() {
            let (name, fields) = match envelope.update.unwrap() {
                Update::ExperimentCreated(m) => ("ExperimentCreated", encoded_fields(&[m])),
                Update::ExperimentUpdated(m) => ("ExperimentUpdated", encoded_fields(&[m])),
                Update::ProjectSettingsCreated(m) => {
                    ("ProjectSettingsCreated", encoded_fields(&[m]))
                }
                Update::ProjectSettingsUpdated(m) => {
                    ("ProjectSettingsUpdated", encoded_fields(&[m]))
                }
                Update::ProjectSegmenterCreated(m) => {
                    ("ProjectSegmenterCreated", encoded_fields(&[m]))
                }
                Update::ProjectSegmenterUpdated(m) => {
                    ("ProjectSegmenterUpdated", encoded_fields(&[m]))
                }
                Update::ProjectSegmenterDeleted(m) => {
                    ("ProjectSegmenterDeleted", encoded_fields(&[m]))
                }
            };
            assert_eq!(declared[name], fields, "{}", name);
        }
    }

    #[test]
    fn test_value_type_enum_matches_schema() {
        let mut in_enum = false;
        let mut declared = Vec::new();
        for line in SEGMENTERS_PROTO.lines().map(str::trim) {
            if line == "enum SegmenterValueType {" {
                in_enum = true;
            } else if in_enum && line == "}" {
                break;
            } else if let Some((name, number)) = in_enum
                .then(|| line.trim_end_matches(';').split_once('='))
                .flatten()
            {
                declared.push((name.trim(), number.trim().parse::<i32>().unwrap()));
            }
        }

        assert_eq!(declared.len(), 4);
        for (name, number) in declared {
            let value_type = SegmenterValueType::try_from(number).unwrap();
            assert_eq!(value_type.as_str_name(), name);
        }
    }
}
