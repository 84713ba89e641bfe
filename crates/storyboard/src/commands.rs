use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    check_span_write, clamp_metric, is_reserved_metric_key, metric_key, normalize_spans,
    AssetSelection, Dialogue, DialogueField, MediaKind, MetricColumn, ProjectSettings,
    ProjectState, Segment, SegmentId, StoryboardError, MAX_LEVEL, NEW_SEGMENT_TEXT,
};

/// Every edit the script editor can make. Commands are pure: applying one
/// never touches the input state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    Add {
        #[serde(default)]
        after: Option<SegmentId>,
        #[serde(default)]
        id: Option<SegmentId>,
    },
    Delete {
        id: SegmentId,
    },
    Indent {
        id: SegmentId,
    },
    Outdent {
        id: SegmentId,
    },
    MoveSegment {
        id: SegmentId,
        index: usize,
    },
    ToggleHeading {
        id: SegmentId,
    },
    SetText {
        id: SegmentId,
        text: String,
    },
    SetImage {
        id: SegmentId,
        image: Option<String>,
    },
    SetShotSize {
        id: SegmentId,
        value: String,
    },
    SetShotType {
        id: SegmentId,
        value: String,
    },
    SetCameraMotion {
        id: SegmentId,
        value: String,
    },
    SetMainCharacters {
        id: SegmentId,
        value: String,
    },
    SetDurationSeconds {
        id: SegmentId,
        seconds: Option<f64>,
    },
    SetMetric {
        id: SegmentId,
        key: String,
        value: i64,
    },
    SetMediaLink {
        id: SegmentId,
        kind: MediaKind,
        link: String,
        #[serde(default)]
        title: Option<String>,
    },
    SetMediaTitle {
        id: SegmentId,
        kind: MediaKind,
        title: String,
    },
    SetMediaDuration {
        id: SegmentId,
        kind: MediaKind,
        duration: u32,
    },
    MoveMedia {
        source: SegmentId,
        target: SegmentId,
        kind: MediaKind,
    },
    RemoveAssets {
        selection: AssetSelection,
    },
    AddDialogue {
        id: SegmentId,
    },
    UpdateDialogue {
        id: SegmentId,
        index: usize,
        field: DialogueField,
        content: String,
    },
    RemoveDialogue {
        id: SegmentId,
        index: usize,
    },
    AddMetric {
        label: String,
    },
    RemoveMetric {
        key: String,
    },
    UpdateSettings {
        settings: ProjectSettings,
    },
}

impl EditCommand {
    /// Short name used as the history label.
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::Add { .. } => "add",
            EditCommand::Delete { .. } => "delete",
            EditCommand::Indent { .. } => "indent",
            EditCommand::Outdent { .. } => "outdent",
            EditCommand::MoveSegment { .. } => "move_segment",
            EditCommand::ToggleHeading { .. } => "toggle_heading",
            EditCommand::SetText { .. } => "set_text",
            EditCommand::SetImage { .. } => "set_image",
            EditCommand::SetShotSize { .. } => "set_shot_size",
            EditCommand::SetShotType { .. } => "set_shot_type",
            EditCommand::SetCameraMotion { .. } => "set_camera_motion",
            EditCommand::SetMainCharacters { .. } => "set_main_characters",
            EditCommand::SetDurationSeconds { .. } => "set_duration_seconds",
            EditCommand::SetMetric { .. } => "set_metric",
            EditCommand::SetMediaLink { .. } => "set_media_link",
            EditCommand::SetMediaTitle { .. } => "set_media_title",
            EditCommand::SetMediaDuration { .. } => "set_media_duration",
            EditCommand::MoveMedia { .. } => "move_media",
            EditCommand::RemoveAssets { .. } => "remove_assets",
            EditCommand::AddDialogue { .. } => "add_dialogue",
            EditCommand::UpdateDialogue { .. } => "update_dialogue",
            EditCommand::RemoveDialogue { .. } => "remove_dialogue",
            EditCommand::AddMetric { .. } => "add_metric",
            EditCommand::RemoveMetric { .. } => "remove_metric",
            EditCommand::UpdateSettings { .. } => "update_settings",
        }
    }
}

/// Apply `command` to `state`.
///
/// `Ok(None)` means the command does not apply: unknown segment id, or an edit
/// the current state does not allow (deleting the last segment, indenting the
/// first one, ...). Only writes that would overlap media spans and metric keys
/// that collide with segment fields are reported as errors.
pub fn apply_command(
    state: &ProjectState,
    command: &EditCommand,
) -> Result<Option<ProjectState>, StoryboardError> {
    let next = dispatch(state, command)?;
    if next.is_none() {
        debug!(command = command.name(), "Command had no effect");
    }
    Ok(next)
}

fn dispatch(
    state: &ProjectState,
    command: &EditCommand,
) -> Result<Option<ProjectState>, StoryboardError> {
    let next = match command {
        EditCommand::Add { after, id } => add_segment(state, after.as_ref(), id.clone()),
        EditCommand::Delete { id } => delete_segment(state, id),
        EditCommand::Indent { id } => indent(state, id),
        EditCommand::Outdent { id } => edit_segment(state, id, |s| {
            s.level = s.level.saturating_sub(1);
            true
        }),
        EditCommand::MoveSegment { id, index } => move_segment(state, id, *index),
        EditCommand::ToggleHeading { id } => edit_segment(state, id, |s| {
            s.is_heading = !s.is_heading;
            true
        }),
        EditCommand::SetText { id, text } => edit_segment(state, id, |s| {
            s.text = text.clone();
            true
        }),
        EditCommand::SetImage { id, image } => edit_segment(state, id, |s| {
            s.image = image.clone().filter(|i| !i.is_empty());
            true
        }),
        EditCommand::SetShotSize { id, value } => edit_segment(state, id, |s| {
            s.shot_size = value.clone();
            true
        }),
        EditCommand::SetShotType { id, value } => edit_segment(state, id, |s| {
            s.shot_type = value.clone();
            true
        }),
        EditCommand::SetCameraMotion { id, value } => edit_segment(state, id, |s| {
            s.camera_motion = value.clone();
            true
        }),
        EditCommand::SetMainCharacters { id, value } => edit_segment(state, id, |s| {
            s.main_characters = value.clone();
            true
        }),
        EditCommand::SetDurationSeconds { id, seconds } => {
            set_duration_seconds(state, id, *seconds)
        }
        EditCommand::SetMetric { id, key, value } => {
            if !state.has_metric(key) {
                return Ok(None);
            }
            edit_segment(state, id, |s| {
                s.metrics.insert(key.clone(), clamp_metric(*value));
                true
            })
        }
        EditCommand::SetMediaLink {
            id,
            kind,
            link,
            title,
        } => return set_media_link(state, id, *kind, link, title.as_deref()),
        EditCommand::SetMediaTitle { id, kind, title } => edit_segment(state, id, |s| {
            *s.media_title_mut(*kind) = title.clone();
            true
        }),
        EditCommand::SetMediaDuration { id, kind, duration } => {
            return set_media_duration(state, id, *kind, *duration)
        }
        EditCommand::MoveMedia {
            source,
            target,
            kind,
        } => return move_media(state, source, target, *kind),
        EditCommand::RemoveAssets { selection } => remove_assets(state, selection),
        EditCommand::AddDialogue { id } => edit_segment(state, id, |s| {
            s.dialogues.push(Dialogue::default());
            true
        }),
        EditCommand::UpdateDialogue {
            id,
            index,
            field,
            content,
        } => edit_segment(state, id, |s| {
            // A stale index appends one blank entry and edits that.
            let slot = if *index < s.dialogues.len() {
                *index
            } else {
                s.dialogues.push(Dialogue::default());
                s.dialogues.len() - 1
            };
            let entry = &mut s.dialogues[slot];
            match field {
                DialogueField::Speaker => entry.speaker = content.clone(),
                DialogueField::Line => entry.line = content.clone(),
            }
            true
        }),
        EditCommand::RemoveDialogue { id, index } => edit_segment(state, id, |s| {
            if *index < s.dialogues.len() {
                s.dialogues.remove(*index);
                true
            } else {
                false
            }
        }),
        EditCommand::AddMetric { label } => return add_metric(state, label),
        EditCommand::RemoveMetric { key } => remove_metric(state, key),
        EditCommand::UpdateSettings { settings } => Some(ProjectState {
            project_settings: settings.clone(),
            ..state.clone()
        }),
    };
    Ok(next)
}

/// Copy `state` and run `edit` on the copy of segment `id`. `edit` returns
/// false to decline the change.
fn edit_segment<F>(state: &ProjectState, id: &SegmentId, edit: F) -> Option<ProjectState>
where
    F: FnOnce(&mut Segment) -> bool,
{
    let index = state.index_of(id)?;
    let mut next = state.clone();
    edit(&mut next.segments[index]).then_some(next)
}

fn add_segment(
    state: &ProjectState,
    after: Option<&SegmentId>,
    id: Option<SegmentId>,
) -> Option<ProjectState> {
    let id = id.unwrap_or_default();
    if state.index_of(&id).is_some() {
        debug!(%id, "Segment id already in use");
        return None;
    }

    let (position, level) = match after {
        Some(after) => {
            let index = state.index_of(after)?;
            (index + 1, state.segments[index].level)
        }
        // Appending continues at the depth of the current last segment.
        None => match state.segments.last() {
            Some(last) => (state.segments.len(), last.level),
            None => (0, 0),
        },
    };

    let mut segment = Segment::new(id)
        .with_text(NEW_SEGMENT_TEXT)
        .with_level(level);
    for column in &state.metric_columns {
        segment.metrics.insert(column.key.clone(), 0);
    }

    let mut next = state.clone();
    next.segments.insert(position, segment);
    Some(next)
}

fn delete_segment(state: &ProjectState, id: &SegmentId) -> Option<ProjectState> {
    if state.segments.len() <= 1 {
        return None;
    }
    let index = state.index_of(id)?;
    let mut next = state.clone();
    next.segments.remove(index);
    settle_after_shift(&mut next.segments);
    Some(next)
}

fn indent(state: &ProjectState, id: &SegmentId) -> Option<ProjectState> {
    // The first segment has nothing to nest under.
    if state.index_of(id)? == 0 {
        return None;
    }
    edit_segment(state, id, |s| {
        s.level = (s.level + 1).min(MAX_LEVEL);
        true
    })
}

fn move_segment(state: &ProjectState, id: &SegmentId, index: usize) -> Option<ProjectState> {
    let from = state.index_of(id)?;
    let to = index.min(state.segments.len() - 1);
    if from == to {
        return None;
    }
    let mut next = state.clone();
    let segment = next.segments.remove(from);
    next.segments.insert(to, segment);
    settle_after_shift(&mut next.segments);
    Some(next)
}

/// Restore the order-dependent invariants once indices have shifted: the
/// first segment sits at level 0 and spans fit between their neighbours.
fn settle_after_shift(segments: &mut [Segment]) {
    if let Some(first) = segments.first_mut() {
        first.level = 0;
    }
    normalize_spans(segments);
}

fn set_duration_seconds(
    state: &ProjectState,
    id: &SegmentId,
    seconds: Option<f64>,
) -> Option<ProjectState> {
    let seconds = match seconds {
        Some(value) if !value.is_finite() => return None,
        other => other.map(|value| value.max(0.0)),
    };
    edit_segment(state, id, |s| {
        s.duration_seconds = seconds;
        true
    })
}

fn set_media_link(
    state: &ProjectState,
    id: &SegmentId,
    kind: MediaKind,
    link: &str,
    title: Option<&str>,
) -> Result<Option<ProjectState>, StoryboardError> {
    let Some(index) = state.index_of(id) else {
        return Ok(None);
    };
    let remaining = (state.segments.len() - index) as u32;
    let duration = state.segments[index]
        .media(kind)
        .duration
        .clamp(1, remaining);

    if !link.is_empty() {
        check_span_write(&state.segments, kind, index, duration as usize, None)?;
    }

    let mut next = state.clone();
    let segment = &mut next.segments[index];
    if link.is_empty() {
        segment.clear_media(kind);
    } else {
        *segment.media_link_mut(kind) = link.to_string();
        *segment.media_duration_mut(kind) = duration;
        if let Some(title) = title {
            *segment.media_title_mut(kind) = title.to_string();
        }
    }
    Ok(Some(next))
}

fn set_media_duration(
    state: &ProjectState,
    id: &SegmentId,
    kind: MediaKind,
    duration: u32,
) -> Result<Option<ProjectState>, StoryboardError> {
    let Some(index) = state.index_of(id) else {
        return Ok(None);
    };
    let remaining = (state.segments.len() - index) as u32;
    let duration = duration.clamp(1, remaining);

    if state.segments[index].has_media(kind) {
        check_span_write(&state.segments, kind, index, duration as usize, None)?;
    }

    let mut next = state.clone();
    *next.segments[index].media_duration_mut(kind) = duration;
    Ok(Some(next))
}

fn move_media(
    state: &ProjectState,
    source: &SegmentId,
    target: &SegmentId,
    kind: MediaKind,
) -> Result<Option<ProjectState>, StoryboardError> {
    let (Some(from), Some(to)) = (state.index_of(source), state.index_of(target)) else {
        return Ok(None);
    };
    if from == to || !state.segments[from].has_media(kind) {
        return Ok(None);
    }
    if state.segments[to].has_media(kind) {
        debug!(%target, %kind, "Move refused: target already has an attachment");
        return Ok(None);
    }

    let media = state.segments[from].media(kind);
    let remaining = (state.segments.len() - to) as u32;
    let duration = media.duration.clamp(1, remaining);
    check_span_write(&state.segments, kind, to, duration as usize, Some(from))?;

    let link = media.link.to_string();
    let title = media.title.to_string();
    let mut next = state.clone();
    next.segments[to].set_media(kind, link, title, duration);
    next.segments[from].clear_media(kind);
    Ok(Some(next))
}

fn remove_assets(state: &ProjectState, selection: &AssetSelection) -> Option<ProjectState> {
    if selection.is_empty() {
        return None;
    }

    let mut next = state.clone();
    let mut cleared = 0usize;
    for segment in next.segments.iter_mut() {
        if let Some(image) = &segment.image {
            if selection.image.contains(image) {
                segment.image = None;
                cleared += 1;
            }
        }
        for kind in MediaKind::ALL {
            let media = segment.media(kind);
            if !media.is_empty() && selection.media(kind).contains(media.link) {
                segment.clear_media(kind);
                cleared += 1;
            }
        }
    }

    debug!(cleared, "Removed assets from script");
    (cleared > 0).then_some(next)
}

fn add_metric(
    state: &ProjectState,
    label: &str,
) -> Result<Option<ProjectState>, StoryboardError> {
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }
    let key = metric_key(label);
    if is_reserved_metric_key(&key) {
        return Err(StoryboardError::InvalidMetricKey(key));
    }
    if state.has_metric(&key) {
        warn!(%key, "Metric already exists");
        return Ok(None);
    }

    let mut next = state.clone();
    next.metric_columns.push(MetricColumn::new(label));
    for segment in next.segments.iter_mut() {
        segment.metrics.insert(key.clone(), 0);
    }
    Ok(Some(next))
}

fn remove_metric(state: &ProjectState, key: &str) -> Option<ProjectState> {
    let position = state.metric_columns.iter().position(|c| c.key == key)?;
    let mut next = state.clone();
    next.metric_columns.remove(position);
    for segment in next.segments.iter_mut() {
        segment.metrics.remove(key);
    }
    Some(next)
}
