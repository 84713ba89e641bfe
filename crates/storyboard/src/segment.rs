use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use uuid::Uuid;

use crate::metrics::{default_metric_columns, MetricColumn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SegmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SegmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two time-linked attachments a segment can carry. Both span a number of
/// consecutive segments; images never do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Music,
    #[serde(alias = "reference", alias = "referenceVideo")]
    ReferenceVideo,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Music, MediaKind::ReferenceVideo];
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Music => write!(f, "music"),
            MediaKind::ReferenceVideo => write!(f, "reference video"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "music" => Ok(MediaKind::Music),
            "reference" | "reference_video" | "reference-video" | "referencevideo" | "video" => {
                Ok(MediaKind::ReferenceVideo)
            }
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// Borrowed view of one attachment triple on a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRef<'a> {
    pub link: &'a str,
    pub title: &'a str,
    pub duration: u32,
}

impl MediaRef<'_> {
    pub fn is_empty(&self) -> bool {
        self.link.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dialogue {
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub line: String,
}

impl Dialogue {
    pub fn new(speaker: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            line: line.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogueField {
    Speaker,
    Line,
}

fn default_media_duration() -> u32 {
    1
}

/// One row of the script. Metric scores are flattened into the same JSON
/// object, keyed by the project's metric column keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: SegmentId,
    #[serde(default)]
    pub level: u8,
    #[serde(rename = "segment", default)]
    pub text: String,
    #[serde(rename = "isChapterHeading", alias = "isHeading", default)]
    pub is_heading: bool,
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub music: String,
    #[serde(default)]
    pub music_title: String,
    #[serde(default = "default_media_duration")]
    pub music_duration: u32,

    #[serde(default)]
    pub reference_video: String,
    #[serde(default)]
    pub reference_video_title: String,
    #[serde(default = "default_media_duration")]
    pub reference_video_duration: u32,

    #[serde(default)]
    pub shot_size: String,
    #[serde(default)]
    pub shot_type: String,
    #[serde(default)]
    pub camera_motion: String,
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub main_characters: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(flatten)]
    pub metrics: BTreeMap<String, u8>,
}

impl Segment {
    pub fn new(id: impl Into<SegmentId>) -> Self {
        Self {
            id: id.into(),
            level: 0,
            text: String::new(),
            is_heading: false,
            image: None,
            music: String::new(),
            music_title: String::new(),
            music_duration: 1,
            reference_video: String::new(),
            reference_video_title: String::new(),
            reference_video_duration: 1,
            shot_size: String::new(),
            shot_type: String::new(),
            camera_motion: String::new(),
            dialogues: Vec::new(),
            main_characters: String::new(),
            duration_seconds: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level.min(crate::MAX_LEVEL);
        self
    }

    pub fn with_media(
        mut self,
        kind: MediaKind,
        link: impl Into<String>,
        title: impl Into<String>,
        duration: u32,
    ) -> Self {
        self.set_media(kind, link.into(), title.into(), duration);
        self
    }

    pub fn media(&self, kind: MediaKind) -> MediaRef<'_> {
        match kind {
            MediaKind::Music => MediaRef {
                link: &self.music,
                title: &self.music_title,
                duration: self.music_duration,
            },
            MediaKind::ReferenceVideo => MediaRef {
                link: &self.reference_video,
                title: &self.reference_video_title,
                duration: self.reference_video_duration,
            },
        }
    }

    pub fn has_media(&self, kind: MediaKind) -> bool {
        !self.media(kind).is_empty()
    }

    pub fn set_media(&mut self, kind: MediaKind, link: String, title: String, duration: u32) {
        let duration = duration.max(1);
        match kind {
            MediaKind::Music => {
                self.music = link;
                self.music_title = title;
                self.music_duration = duration;
            }
            MediaKind::ReferenceVideo => {
                self.reference_video = link;
                self.reference_video_title = title;
                self.reference_video_duration = duration;
            }
        }
    }

    /// Clearing a link always clears its title and resets the span to one segment.
    pub fn clear_media(&mut self, kind: MediaKind) {
        self.set_media(kind, String::new(), String::new(), 1);
    }

    pub(crate) fn media_link_mut(&mut self, kind: MediaKind) -> &mut String {
        match kind {
            MediaKind::Music => &mut self.music,
            MediaKind::ReferenceVideo => &mut self.reference_video,
        }
    }

    pub(crate) fn media_title_mut(&mut self, kind: MediaKind) -> &mut String {
        match kind {
            MediaKind::Music => &mut self.music_title,
            MediaKind::ReferenceVideo => &mut self.reference_video_title,
        }
    }

    pub(crate) fn media_duration_mut(&mut self, kind: MediaKind) -> &mut u32 {
        match kind {
            MediaKind::Music => &mut self.music_duration,
            MediaKind::ReferenceVideo => &mut self.reference_video_duration,
        }
    }

    /// Metric score for `key`; absent keys read as zero.
    pub fn metric(&self, key: &str) -> u8 {
        self.metrics.get(key).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Display only; the folder itself is resolved outside the core.
    #[serde(default)]
    pub image_folder_name: String,
}

/// Whole-application state captured by each history snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectState {
    #[serde(rename = "projectSettings", default)]
    pub project_settings: ProjectSettings,
    #[serde(rename = "emotionColumns", default = "default_metric_columns")]
    pub metric_columns: Vec<MetricColumn>,
    #[serde(rename = "scriptData")]
    pub segments: Vec<Segment>,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            project_settings: ProjectSettings::default(),
            metric_columns: default_metric_columns(),
            segments: Vec::new(),
        }
    }
}

impl ProjectState {
    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    pub fn index_of(&self, id: &SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| &s.id == id)
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn has_metric(&self, key: &str) -> bool {
        self.metric_columns.iter().any(|c| c.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_json_uses_document_keys() {
        let mut segment = Segment::new("s1").with_text("Opening").with_media(
            MediaKind::Music,
            "https://example.com/track",
            "Theme",
            2,
        );
        segment.is_heading = true;
        segment.metrics.insert("tension".to_string(), 4);

        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["id"], "s1");
        assert_eq!(value["segment"], "Opening");
        assert_eq!(value["isChapterHeading"], true);
        assert_eq!(value["musicTitle"], "Theme");
        assert_eq!(value["musicDuration"], 2);
        assert_eq!(value["tension"], 4);
        assert!(value.get("metrics").is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let segment: Segment =
            serde_json::from_str(r#"{"id":"a","segment":"x","isHeading":true,"boredom":3}"#)
                .unwrap();
        assert_eq!(segment.level, 0);
        assert!(segment.is_heading);
        assert_eq!(segment.music_duration, 1);
        assert_eq!(segment.reference_video_duration, 1);
        assert_eq!(segment.metric("boredom"), 3);
        assert_eq!(segment.metric("tension"), 0);
    }

    #[test]
    fn clear_media_resets_title_and_duration() {
        let mut segment =
            Segment::new("a").with_media(MediaKind::ReferenceVideo, "ref", "Ref title", 3);
        assert!(segment.has_media(MediaKind::ReferenceVideo));
        segment.clear_media(MediaKind::ReferenceVideo);
        let media = segment.media(MediaKind::ReferenceVideo);
        assert!(media.is_empty());
        assert_eq!(media.title, "");
        assert_eq!(media.duration, 1);
    }

    #[test]
    fn media_kind_parses_cli_spellings() {
        assert_eq!("music".parse::<MediaKind>(), Ok(MediaKind::Music));
        assert_eq!("reference".parse::<MediaKind>(), Ok(MediaKind::ReferenceVideo));
        assert_eq!(
            "reference_video".parse::<MediaKind>(),
            Ok(MediaKind::ReferenceVideo)
        );
        assert!("image".parse::<MediaKind>().is_err());
    }

    #[test]
    fn state_without_columns_gets_defaults() {
        let state: ProjectState = serde_json::from_str(r#"{"scriptData":[]}"#).unwrap();
        assert_eq!(state.metric_columns.len(), 5);
        assert!(state.has_metric("coolFactor"));
    }
}
