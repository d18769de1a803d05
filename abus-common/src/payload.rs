//! Upsert payload decoding
//!
//! Incoming payloads are loosely shaped JSON. They are decoded exactly once,
//! here, into typed values; nothing downstream inspects raw JSON.
//!
//! ```text
//! { "name": "...",
//!   "categories": {
//!     "<category>": { "weight": 20, "subfeatures": { "<sub>": 2 | {"score": 2, "note": "..."} } },
//!     "<legacy>":   { "<sub>": 1, ... }
//!   } }
//! ```

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// A subfeature value: a bare number or a score with an optional note
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubfeatureValue {
    Bare(f64),
    Detailed { score: f64, note: Option<String> },
}

impl SubfeatureValue {
    pub fn score(&self) -> f64 {
        match self {
            SubfeatureValue::Bare(score) => *score,
            SubfeatureValue::Detailed { score, .. } => *score,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            SubfeatureValue::Bare(_) => None,
            SubfeatureValue::Detailed { note, .. } => note.as_deref(),
        }
    }

    /// Decode one subfeature value; `path` names it in error messages
    pub fn from_json(raw: &Value, path: &str) -> Result<Self> {
        match raw {
            Value::Number(n) => n
                .as_f64()
                .map(SubfeatureValue::Bare)
                .ok_or_else(|| Error::Validation(format!("Score at {} is not finite", path))),
            Value::Object(map) if map.contains_key("score") => {
                let score = coerce_f64(&map["score"]).ok_or_else(|| {
                    Error::Validation(format!(
                        "Score at {} must be numeric; got {}",
                        path, map["score"]
                    ))
                })?;
                let note = match map.get("note") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                };
                Ok(SubfeatureValue::Detailed { score, note })
            }
            other => Err(Error::Validation(format!(
                "Expected number or {{\"score\": number, ...}} at {}; got {}",
                path, other
            ))),
        }
    }
}

/// One category of an upsert payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryPayload {
    /// `None` leaves any stored weight untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub subfeatures: BTreeMap<String, SubfeatureValue>,
}

/// A decoded upsert payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub name: String,
    pub categories: BTreeMap<String, CategoryPayload>,
}

impl Payload {
    /// Decode a raw JSON payload, failing with [`Error::Validation`] on any
    /// structural problem
    pub fn from_json(raw: &Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::Validation("payload must be an object".to_string()))?;

        let name = match obj.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(Error::Validation("payload.name is required".to_string())),
        };

        let categories = match obj.get("categories") {
            None => BTreeMap::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(cat_name, cat_val)| {
                    decode_category(&name, cat_name, cat_val).map(|c| (cat_name.clone(), c))
                })
                .collect::<Result<_>>()?,
            Some(_) => {
                return Err(Error::Validation(
                    "payload.categories must be an object".to_string(),
                ))
            }
        };

        Ok(Self { name, categories })
    }

    /// Decode a bare `categories` mapping for `name` (the seed-file shape)
    pub fn from_categories(name: &str, categories: &Value) -> Result<Self> {
        let mut raw = serde_json::Map::new();
        raw.insert("name".to_string(), Value::String(name.to_string()));
        raw.insert("categories".to_string(), categories.clone());
        Self::from_json(&Value::Object(raw))
    }

    /// Number of subfeature values across all categories
    pub fn score_count(&self) -> usize {
        self.categories.values().map(|c| c.subfeatures.len()).sum()
    }
}

fn decode_category(model: &str, cat_name: &str, raw: &Value) -> Result<CategoryPayload> {
    let obj = raw.as_object().ok_or_else(|| {
        Error::Validation(format!(
            "Category value must be an object for {}/{}; got {}",
            model, cat_name, raw
        ))
    })?;

    let weight = match obj.get("weight") {
        None | Some(Value::Null) => None,
        Some(w) => {
            let parsed = coerce_f64(w);
            if parsed.is_none() {
                warn!(model, category = cat_name, weight = %w, "Ignoring non-numeric weight");
            }
            parsed
        }
    };

    let mut subfeatures = BTreeMap::new();
    match obj.get("subfeatures") {
        Some(Value::Object(subs)) => {
            for (sub_name, sub_val) in subs {
                let path = format!("{}/{}", cat_name, sub_name);
                subfeatures.insert(sub_name.clone(), SubfeatureValue::from_json(sub_val, &path)?);
            }
        }
        Some(other) => {
            return Err(Error::Validation(format!(
                "subfeatures for {}/{} must be an object; got {}",
                model, cat_name, other
            )))
        }
        None => {
            // Legacy flat shape: the category object maps subfeature -> value
            for (sub_name, sub_val) in obj.iter().filter(|(k, _)| k.as_str() != "weight") {
                let path = format!("{}/{}", cat_name, sub_name);
                subfeatures.insert(sub_name.clone(), SubfeatureValue::from_json(sub_val, &path)?);
            }
        }
    }

    Ok(CategoryPayload {
        weight,
        subfeatures,
    })
}

/// Numbers pass through; numeric strings are parsed
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_wrapped_shape() {
        let payload = Payload::from_json(&json!({
            "name": "MULAN",
            "categories": {
                "adaptability": {
                    "weight": 20,
                    "subfeatures": {
                        "transferability": {"score": 2, "note": "few-shot"},
                        "modular_architecture": 1
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(payload.name, "MULAN");
        let cat = &payload.categories["adaptability"];
        assert_eq!(cat.weight, Some(20.0));
        assert_eq!(
            cat.subfeatures["transferability"],
            SubfeatureValue::Detailed {
                score: 2.0,
                note: Some("few-shot".to_string())
            }
        );
        assert_eq!(cat.subfeatures["modular_architecture"], SubfeatureValue::Bare(1.0));
        assert_eq!(payload.score_count(), 2);
    }

    #[test]
    fn test_decodes_legacy_flat_shape() {
        let payload = Payload::from_json(&json!({
            "name": "X",
            "categories": {"usability": {"setup_ease": 2, "code_availability": {"score": "1"}}}
        }))
        .unwrap();

        let cat = &payload.categories["usability"];
        assert_eq!(cat.weight, None);
        assert_eq!(cat.subfeatures["setup_ease"].score(), 2.0);
        assert_eq!(cat.subfeatures["code_availability"].score(), 1.0);
        assert_eq!(cat.subfeatures["code_availability"].note(), None);
    }

    #[test]
    fn test_flat_shape_treats_weight_key_as_weight() {
        let payload = Payload::from_json(&json!({
            "name": "X",
            "categories": {"usability": {"weight": 3, "setup_ease": 2}}
        }))
        .unwrap();

        let cat = &payload.categories["usability"];
        assert_eq!(cat.weight, Some(3.0));
        assert_eq!(cat.subfeatures.len(), 1);
    }

    #[test]
    fn test_missing_name_rejected() {
        let err = Payload::from_json(&json!({"categories": {}})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = Payload::from_json(&json!({"name": 42})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_non_mapping_categories_rejected() {
        let err = Payload::from_json(&json!({"name": "X", "categories": "not-a-dict"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_bad_subfeature_shape_names_path() {
        let err = Payload::from_json(&json!({
            "name": "X",
            "categories": {"usability": {"subfeatures": {"setup_ease": "high"}}}
        }))
        .unwrap_err();

        match err {
            Error::Validation(msg) => assert!(msg.contains("usability/setup_ease"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_object_without_score_rejected() {
        let err = Payload::from_json(&json!({
            "name": "X",
            "categories": {"c": {"subfeatures": {"s": {"note": "only a note"}}}}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_non_numeric_weight_is_ignored() {
        let payload = Payload::from_json(&json!({
            "name": "X",
            "categories": {"c": {"weight": "heavy", "subfeatures": {}}}
        }))
        .unwrap();

        assert_eq!(payload.categories["c"].weight, None);
    }

    #[test]
    fn test_serializes_back_to_payload_shape() {
        let payload = Payload::from_json(&json!({
            "name": "X",
            "categories": {"c": {"subfeatures": {"a": 1, "b": {"score": 2, "note": null}}}}
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "name": "X",
                "categories": {"c": {"subfeatures": {"a": 1.0, "b": {"score": 2.0, "note": null}}}}
            })
        );
    }
}
