//! Media spans: a music or reference-video attachment covers its own segment
//! plus the following `duration - 1` segments.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{MediaKind, Segment, StoryboardError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    #[default]
    None,
    Start,
    Middle,
    End,
}

/// Consecutive run of segment indices covered by one attachment. The owner is
/// the segment at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSpan {
    pub start: usize,
    pub len: usize,
}

impl MediaSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    fn overlaps(&self, start: usize, len: usize) -> bool {
        self.start < start + len && start < self.end()
    }
}

/// Spans of `kind` in sequence order. Durations are clipped to the end of the
/// sequence, and a span still open when the next attachment starts is closed
/// just before it.
pub fn span_ranges(segments: &[Segment], kind: MediaKind) -> Vec<MediaSpan> {
    ranges_where(segments, kind, |_| true)
}

fn ranges_where(
    segments: &[Segment],
    kind: MediaKind,
    include: impl Fn(usize) -> bool,
) -> Vec<MediaSpan> {
    let total = segments.len();
    let mut ranges: Vec<MediaSpan> = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let media = segment.media(kind);
        if media.is_empty() || !include(index) {
            continue;
        }
        if let Some(open) = ranges.last_mut() {
            if open.end() > index {
                open.len = index - open.start;
            }
        }
        let len = (media.duration.max(1) as usize).min(total - index);
        ranges.push(MediaSpan { start: index, len });
    }
    ranges
}

/// Per-index span status for `kind`.
pub fn spans(segments: &[Segment], kind: MediaKind) -> Vec<SpanStatus> {
    let mut statuses = vec![SpanStatus::None; segments.len()];
    for span in span_ranges(segments, kind) {
        for offset in 0..span.len {
            statuses[span.start + offset] = if offset == 0 {
                SpanStatus::Start
            } else if offset == span.len - 1 {
                SpanStatus::End
            } else {
                SpanStatus::Middle
            };
        }
    }
    statuses
}

/// Index of the segment whose attachment covers `index`.
pub fn span_owner(segments: &[Segment], kind: MediaKind, index: usize) -> Option<usize> {
    span_ranges(segments, kind)
        .into_iter()
        .find(|span| span.contains(index))
        .map(|span| span.start)
}

/// Reject a write that would make the span `[start, start + len)` share any
/// index with another span of `kind`. The segment at `ignore` (the attachment
/// being moved, if any) and the segment at `start` are not counted as owners.
pub fn check_span_write(
    segments: &[Segment],
    kind: MediaKind,
    start: usize,
    len: usize,
    ignore: Option<usize>,
) -> Result<(), StoryboardError> {
    let others = ranges_where(segments, kind, |i| i != start && Some(i) != ignore);
    match others.iter().find(|span| span.overlaps(start, len.max(1))) {
        Some(conflict) => Err(StoryboardError::MediaOverlap {
            kind,
            segment: segments[start].id.clone(),
            owner: segments[conflict.start].id.clone(),
        }),
        None => Ok(()),
    }
}

/// Reconcile both media kinds. Returns the number of durations shortened.
pub fn normalize_spans(segments: &mut [Segment]) -> usize {
    MediaKind::ALL
        .into_iter()
        .map(|kind| reconcile_spans(segments, kind))
        .sum()
}

/// Shrink stored durations after indices shift so that every span ends at or
/// before the sequence end and before the next attachment of the same kind.
/// Returns the number of segments adjusted.
pub(crate) fn reconcile_spans(segments: &mut [Segment], kind: MediaKind) -> usize {
    let total = segments.len();
    let starts: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_media(kind))
        .map(|(i, _)| i)
        .collect();

    let mut adjusted = 0;
    for (n, &start) in starts.iter().enumerate() {
        let limit = starts.get(n + 1).copied().unwrap_or(total) - start;
        let current = segments[start].media(kind).duration as usize;
        if current > limit {
            warn!(
                segment = %segments[start].id,
                %kind,
                from = current,
                to = limit,
                "Span shortened after reorder"
            );
            *segments[start].media_duration_mut(kind) = limit as u32;
            adjusted += 1;
        }
    }
    adjusted
}
