/// Pull a grouping proposal out of free-form model output
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ClassifyError;

/// One AI-proposed group, not yet checked against the live tabs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProposal {
    #[serde(default, deserialize_with = "deserialize_name")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_tab_ids")]
    pub tab_ids: Vec<i32>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub color: Option<String>,
}

#[derive(Deserialize)]
struct ProposalEnvelope {
    groups: Option<Value>,
}

fn json_span() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    // First '{' through last '}', across newlines
    SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Parse the model's reply into group proposals.
///
/// Tolerates prose and code fences around the JSON object. Tab ids and
/// colors are not checked here.
pub fn parse_groups(raw: &str) -> Result<Vec<GroupProposal>, ClassifyError> {
    let span = json_span()
        .find(raw)
        .ok_or_else(|| ClassifyError::parse("Unable to extract JSON from AI response"))?;

    debug!("Parsing {} bytes of JSON from AI response", span.len());

    let envelope: ProposalEnvelope = serde_json::from_str(span.as_str())
        .map_err(|e| ClassifyError::parse(format!("Invalid JSON in AI response: {}", e)))?;

    match envelope.groups {
        None => Err(ClassifyError::parse("AI response is missing the \"groups\" field")),
        Some(Value::Array(entries)) => Ok(entries.into_iter().map(proposal_from_value).collect()),
        Some(other) => {
            warn!("\"groups\" is not a list in AI response: {}", other);
            Ok(Vec::new())
        }
    }
}

// A malformed entry becomes an empty proposal, which the run drops later.
fn proposal_from_value(value: Value) -> GroupProposal {
    serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        warn!("Ignoring group {} in AI response: {}", value, e);
        GroupProposal {
            name: String::new(),
            tab_ids: Vec::new(),
            color: None,
        }
    })
}

fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

// Models sometimes quote ids; keep anything that reads as an integer.
fn deserialize_tab_ids<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!("Ignoring tabIds {} in AI response", other);
            Vec::new()
        }
    };

    Ok(values
        .into_iter()
        .filter_map(|value| {
            let id = match &value {
                Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
                Value::String(s) => s.trim().parse::<i32>().ok(),
                _ => None,
            };
            if id.is_none() {
                warn!("Ignoring tab id {} in AI response", value);
            }
            id
        })
        .collect())
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"groups":[{"name":"Shopping","tabIds":[123,456],"color":"red"}]}"#;

        let groups = parse_groups(raw).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Shopping");
        assert_eq!(groups[0].tab_ids, vec![123, 456]);
        assert_eq!(groups[0].color.as_deref(), Some("red"));
    }

    #[test]
    fn test_parse_json_wrapped_in_prose_and_fence() {
        let json = r#"{"groups":[{"name":"News","tabIds":[1,2],"color":"blue"},{"name":"Dev","tabIds":[3],"color":"green"}]}"#;
        let raw = format!("Here is the result:\n```json\n{}\n```\nThanks", json);

        assert_eq!(parse_groups(&raw).unwrap(), parse_groups(json).unwrap());
    }

    #[test]
    fn test_parse_without_json() {
        let err = parse_groups("I could not group these tabs.").unwrap_err();
        assert_eq!(err, ClassifyError::parse("Unable to extract JSON from AI response"));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_groups("{ groups: [ } ").unwrap_err();
        assert!(matches!(err, ClassifyError::Parse(msg) if msg.starts_with("Invalid JSON")));
    }

    #[test]
    fn test_parse_missing_groups_field() {
        let err = parse_groups(r#"{"result": []}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Parse(msg) if msg.contains("groups")));
    }

    #[test]
    fn test_parse_empty_groups() {
        assert_eq!(parse_groups(r#"{"groups": []}"#).unwrap(), vec![]);
    }

    #[test]
    fn test_parse_lenient_fields() {
        let raw = r#"{"groups":[{"name":"Mixed","tabIds":["7", 8, "x", 9.5, null],"color":42},{"tabIds":[1]}]}"#;

        let groups = parse_groups(raw).unwrap();

        assert_eq!(groups[0].tab_ids, vec![7, 8]);
        assert_eq!(groups[0].color, None);
        assert_eq!(groups[1].name, "");
        assert_eq!(groups[1].color, None);
    }

    #[test]
    fn test_parse_null_name_keeps_other_groups() {
        let raw = r#"{"groups":[{"name":null,"tabIds":[1],"color":"red"},{"name":"Ok","tabIds":[2]}]}"#;

        let groups = parse_groups(raw).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "");
        assert_eq!(groups[0].tab_ids, vec![1]);
        assert_eq!(groups[1].name, "Ok");
        assert_eq!(groups[1].tab_ids, vec![2]);
    }

    #[test]
    fn test_parse_scalar_tab_ids_and_stray_entries() {
        let raw = r#"{"groups":[{"name":"A","tabIds":123},"oops",{"name":"B","tabIds":[4]}]}"#;

        let groups = parse_groups(raw).unwrap();

        assert_eq!(groups.len(), 3);
        assert!(groups[0].tab_ids.is_empty());
        assert_eq!(groups[1].name, "");
        assert!(groups[1].tab_ids.is_empty());
        assert_eq!(groups[2].tab_ids, vec![4]);
    }

    #[test]
    fn test_parse_groups_not_a_list() {
        assert_eq!(parse_groups(r#"{"groups": "none"}"#).unwrap(), vec![]);
    }

    #[test]
    fn test_parse_keeps_unknown_color_for_later() {
        let raw = r#"{"groups":[{"name":"X","tabIds":[1],"color":"neon"}]}"#;
        let groups = parse_groups(raw).unwrap();
        assert_eq!(groups[0].color.as_deref(), Some("neon"));
    }
}
