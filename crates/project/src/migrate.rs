//! Normalizes a raw project document before typed deserialization.
//!
//! Documents written by older versions of the editor carry a single
//! `dialogue` string per row, `null` media fields, fractional metric scores
//! and the odd stray key. Everything here works on `serde_json::Value` so a
//! single bad row can be repaired instead of failing the whole import.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use storyboard::{
    clamp_metric, default_metric_columns, is_reserved_metric_key, ProjectSettings, MAX_LEVEL,
};

use crate::error::{ProjectError, ProjectResult};

/// Written on export, ignored on import.
pub const EXPORTED_AT_KEY: &str = "exportedAt";

const STRING_FIELDS: &[&str] = &[
    "segment",
    "music",
    "musicTitle",
    "referenceVideo",
    "referenceVideoTitle",
    "shotSize",
    "shotType",
    "cameraMotion",
    "mainCharacters",
];

const DURATION_FIELDS: &[&str] = &["musicDuration", "referenceVideoDuration"];

/// Bring `value` into the shape `ProjectState` deserializes from.
///
/// Fails only when the document is not an object or has no `scriptData`
/// array; every other defect is repaired in place.
pub fn migrate_document(value: &mut Value) -> ProjectResult<()> {
    let root = value
        .as_object_mut()
        .ok_or_else(|| ProjectError::invalid("project root must be a JSON object"))?;

    if !matches!(root.get("scriptData"), Some(Value::Array(_))) {
        return Err(ProjectError::invalid("missing scriptData array"));
    }

    root.remove(EXPORTED_AT_KEY);

    if root.get("projectSettings").map_or(true, Value::is_null) {
        root.insert(
            "projectSettings".to_string(),
            serde_json::to_value(ProjectSettings::default())?,
        );
    }
    if root.get("emotionColumns").map_or(true, Value::is_null) {
        debug!("Document has no metric columns, using defaults");
        root.insert(
            "emotionColumns".to_string(),
            serde_json::to_value(default_metric_columns())?,
        );
    }

    let metric_keys = column_keys(root.get("emotionColumns"))?;

    if let Some(Value::Array(rows)) = root.get_mut("scriptData") {
        for (index, row) in rows.iter_mut().enumerate() {
            let row = row
                .as_object_mut()
                .ok_or_else(|| ProjectError::invalid(format!("row {index} is not an object")))?;
            migrate_row(row, &metric_keys, index)?;
        }
    }
    Ok(())
}

fn column_keys(columns: Option<&Value>) -> ProjectResult<BTreeSet<String>> {
    let Some(Value::Array(columns)) = columns else {
        return Err(ProjectError::invalid("emotionColumns must be an array"));
    };
    let mut keys = BTreeSet::new();
    for column in columns {
        let key = column
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| ProjectError::invalid("metric column without a key"))?;
        if is_reserved_metric_key(key) {
            return Err(ProjectError::invalid(format!(
                "metric key `{key}` collides with a segment field"
            )));
        }
        if !keys.insert(key.to_string()) {
            return Err(ProjectError::invalid(format!("duplicate metric key `{key}`")));
        }
    }
    Ok(keys)
}

fn migrate_row(
    row: &mut Map<String, Value>,
    metric_keys: &BTreeSet<String>,
    index: usize,
) -> ProjectResult<()> {
    match row.get("id") {
        Some(Value::String(_)) => {}
        Some(Value::Number(n)) => {
            let id = n.to_string();
            row.insert("id".to_string(), Value::String(id));
        }
        _ => return Err(ProjectError::invalid(format!("row {index} has no id"))),
    }

    if let Some(legacy) = row.remove("dialogue") {
        if !row.contains_key("dialogues") {
            row.insert("dialogues".to_string(), legacy_dialogues(&legacy));
        }
    }

    let level = row
        .get("level")
        .and_then(Value::as_f64)
        .map_or(0, |l| l.round().clamp(0.0, MAX_LEVEL as f64) as u8);
    row.insert("level".to_string(), Value::from(level));

    for field in DURATION_FIELDS {
        let duration = row
            .get(*field)
            .and_then(Value::as_f64)
            .map_or(1, |d| d.round().max(1.0) as u32);
        row.insert(field.to_string(), Value::from(duration));
    }

    for field in STRING_FIELDS {
        if row.get(*field).is_some_and(|v| !v.is_string()) {
            row.remove(*field);
        }
    }

    if row
        .get("image")
        .is_some_and(|v| v.as_str().map_or(true, str::is_empty))
    {
        row.insert("image".to_string(), Value::Null);
    }

    if let Some(seconds) = row.get("durationSeconds") {
        let seconds = seconds
            .as_f64()
            .filter(|s| s.is_finite())
            .map_or(Value::Null, |s| Value::from(s.max(0.0)));
        row.insert("durationSeconds".to_string(), seconds);
    }

    if row.get("isChapterHeading").is_some_and(Value::is_null) {
        row.remove("isChapterHeading");
    }
    if row.get("dialogues").is_some_and(|v| !v.is_array()) {
        row.remove("dialogues");
    }

    let extra: Vec<String> = row
        .keys()
        .filter(|key| !is_reserved_metric_key(key))
        .cloned()
        .collect();
    for key in extra {
        if metric_keys.contains(&key) {
            let score = row.get(&key).map_or(0, metric_score);
            row.insert(key, Value::from(score));
        } else {
            debug!(row = index, %key, "Dropping unknown row field");
            row.remove(&key);
        }
    }
    Ok(())
}

/// One dialogue entry per non-empty line of the old free-text field.
fn legacy_dialogues(legacy: &Value) -> Value {
    let lines = legacy.as_str().unwrap_or_default();
    Value::Array(
        lines
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::json!({ "speaker": "", "line": line }))
            .collect(),
    )
}

fn metric_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
        .map_or(0, |v| clamp_metric(v.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn migrated(mut value: Value) -> ProjectResult<Value> {
        migrate_document(&mut value)?;
        Ok(value)
    }

    #[test]
    fn requires_script_data() {
        let err = migrated(json!({ "emotionColumns": [] })).unwrap_err();
        assert!(err.to_string().contains("scriptData"));
        assert!(migrated(json!({ "scriptData": {} })).is_err());
        assert!(migrated(json!([1, 2])).is_err());
    }

    #[test]
    fn fills_missing_sections() {
        let value = migrated(json!({ "scriptData": [], "exportedAt": "2025-01-01T00:00:00Z" }))
            .unwrap();
        assert!(value.get("exportedAt").is_none());
        assert_eq!(value["projectSettings"]["imageFolderName"], "");
        assert_eq!(value["emotionColumns"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn legacy_dialogue_becomes_entries() {
        let value = migrated(json!({
            "scriptData": [{ "id": "a", "dialogue": "Hold on.\n\n  Not a drop spills. " }]
        }))
        .unwrap();
        let row = &value["scriptData"][0];
        assert!(row.get("dialogue").is_none());
        assert_eq!(
            row["dialogues"],
            json!([
                { "speaker": "", "line": "Hold on." },
                { "speaker": "", "line": "Not a drop spills." }
            ])
        );
    }

    #[test]
    fn existing_dialogues_win_over_legacy_field() {
        let value = migrated(json!({
            "scriptData": [{
                "id": "a",
                "dialogue": "old",
                "dialogues": [{ "speaker": "Driver", "line": "new" }]
            }]
        }))
        .unwrap();
        assert_eq!(value["scriptData"][0]["dialogues"][0]["line"], "new");
    }

    #[test]
    fn row_fields_normalized() {
        let value = migrated(json!({
            "scriptData": [{
                "id": 7,
                "level": 9,
                "music": null,
                "musicDuration": 0,
                "referenceVideoDuration": "3",
                "image": "",
                "durationSeconds": -4.0,
                "tension": 7.6,
                "coolFactor": "12",
                "boredom": "meh",
                "legacyNote": "x"
            }]
        }))
        .unwrap();
        let row = &value["scriptData"][0];
        assert_eq!(row["id"], "7");
        assert_eq!(row["level"], 5);
        assert!(row.get("music").is_none());
        assert_eq!(row["musicDuration"], 1);
        assert_eq!(row["referenceVideoDuration"], 1);
        assert!(row["image"].is_null());
        assert_eq!(row["durationSeconds"], 0.0);
        assert_eq!(row["tension"], 8);
        assert_eq!(row["coolFactor"], 10);
        assert_eq!(row["boredom"], 0);
        assert!(row.get("legacyNote").is_none());
    }

    #[test]
    fn rows_need_ids() {
        let err = migrated(json!({ "scriptData": [{ "segment": "no id" }] })).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn reserved_column_keys_rejected() {
        let err = migrated(json!({
            "scriptData": [],
            "emotionColumns": [{ "key": "level", "label": "Level" }]
        }))
        .unwrap_err();
        assert!(matches!(err, ProjectError::InvalidProject { .. }));
    }
}
