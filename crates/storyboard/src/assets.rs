use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{MediaKind, Segment, SegmentId};

/// A music or reference-video link and the segments that attach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub title: String,
    pub used_by: Vec<SegmentId>,
}

/// Distinct asset identifiers currently referenced by the script, in order of
/// first use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIndex {
    pub images: IndexMap<String, Vec<SegmentId>>,
    pub music: IndexMap<String, MediaAsset>,
    pub references: IndexMap<String, MediaAsset>,
}

impl AssetIndex {
    pub fn media(&self, kind: MediaKind) -> &IndexMap<String, MediaAsset> {
        match kind {
            MediaKind::Music => &self.music,
            MediaKind::ReferenceVideo => &self.references,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.music.is_empty() && self.references.is_empty()
    }
}

pub fn aggregate_assets(segments: &[Segment]) -> AssetIndex {
    let mut index = AssetIndex::default();
    for segment in segments {
        if let Some(image) = segment.image.as_deref().filter(|i| !i.is_empty()) {
            index
                .images
                .entry(image.to_string())
                .or_default()
                .push(segment.id.clone());
        }
        for kind in MediaKind::ALL {
            let media = segment.media(kind);
            if media.is_empty() {
                continue;
            }
            let map = match kind {
                MediaKind::Music => &mut index.music,
                MediaKind::ReferenceVideo => &mut index.references,
            };
            map.entry(media.link.to_string())
                .or_insert_with(|| MediaAsset {
                    title: media.title.to_string(),
                    used_by: Vec::new(),
                })
                .used_by
                .push(segment.id.clone());
        }
    }
    index
}

/// Asset identifiers picked for removal, per asset type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSelection {
    #[serde(default)]
    pub image: BTreeSet<String>,
    #[serde(default)]
    pub music: BTreeSet<String>,
    #[serde(default)]
    pub reference: BTreeSet<String>,
}

impl AssetSelection {
    pub fn media(&self, kind: MediaKind) -> &BTreeSet<String> {
        match kind {
            MediaKind::Music => &self.music,
            MediaKind::ReferenceVideo => &self.reference,
        }
    }

    pub fn media_mut(&mut self, kind: MediaKind) -> &mut BTreeSet<String> {
        match kind {
            MediaKind::Music => &mut self.music,
            MediaKind::ReferenceVideo => &mut self.reference,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty() && self.music.is_empty() && self.reference.is_empty()
    }
}
