//! Metric columns: project-level score definitions shown as per-segment 0-10 graphs.

use serde::{Deserialize, Serialize};

pub const METRIC_MIN: u8 = 0;
pub const METRIC_MAX: u8 = 10;

/// JSON keys owned by [`crate::Segment`]. A metric with one of these keys
/// would be indistinguishable from the field once flattened.
pub const RESERVED_SEGMENT_KEYS: &[&str] = &[
    "id",
    "level",
    "segment",
    "isChapterHeading",
    "isHeading",
    "image",
    "music",
    "musicTitle",
    "musicDuration",
    "referenceVideo",
    "referenceVideoTitle",
    "referenceVideoDuration",
    "shotSize",
    "shotType",
    "cameraMotion",
    "dialogues",
    "dialogue",
    "mainCharacters",
    "durationSeconds",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricColumn {
    pub key: String,
    pub label: String,

    /// Color in hex format (e.g., "#f87171")
    #[serde(default = "default_metric_color")]
    pub color: String,
}

fn default_metric_color() -> String {
    "#9ca3af".to_string() // Gray
}

impl MetricColumn {
    /// Column for a user-entered label; key and color are derived from it.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let key = metric_key(&label);
        let color = metric_color(&key);
        Self { key, label, color }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

pub fn default_metric_columns() -> Vec<MetricColumn> {
    vec![
        MetricColumn::new("Cool Factor")
            .with_key("coolFactor")
            .with_color("#f87171"),
        MetricColumn::new("Tension")
            .with_key("tension")
            .with_color("#22d3ee"),
        MetricColumn::new("Hype Factor")
            .with_key("hypeFactor")
            .with_color("#facc15"),
        MetricColumn::new("Resonance")
            .with_key("resonance")
            .with_color("#a78bfa"),
        MetricColumn::new("Boredom")
            .with_key("boredom")
            .with_color("#9ca3af"),
    ]
}

/// Lowercased label with each whitespace run replaced by `-`.
pub fn metric_key(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Stable color for a metric key (FNV-1a over the key bytes).
pub fn metric_color(key: &str) -> String {
    let hash = key
        .bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    format!("#{:06x}", hash & 0x00ff_ffff)
}

pub fn is_reserved_metric_key(key: &str) -> bool {
    RESERVED_SEGMENT_KEYS.contains(&key)
}

pub fn clamp_metric(value: i64) -> u8 {
    value.clamp(METRIC_MIN as i64, METRIC_MAX as i64) as u8
}
