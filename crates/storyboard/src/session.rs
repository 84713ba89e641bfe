use std::collections::HashMap;

use crate::{
    aggregate_assets, apply_command, numbering, outline, spans, AssetIndex, EditCommand,
    HistoryManager, MediaKind, ProjectState, Segment, SegmentId, SpanStatus, StoryboardError,
};

/// An open project: the current state plus its undo history. Every edit goes
/// through [`mutate`](Self::mutate) so that it lands in the history.
#[derive(Debug, Clone)]
pub struct EditorSession {
    history: HistoryManager<ProjectState>,
}

impl EditorSession {
    pub fn new(state: ProjectState) -> Self {
        Self {
            history: HistoryManager::new(state),
        }
    }

    pub fn with_history_limit(state: ProjectState, limit: usize) -> Self {
        Self {
            history: HistoryManager::with_limit(state, limit),
        }
    }

    /// Apply `command` and record the result. Returns whether a new history
    /// entry was committed.
    pub fn mutate(&mut self, command: EditCommand) -> Result<bool, StoryboardError> {
        self.history
            .try_commit_with(command.name(), |state| apply_command(state, &command))
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the project, e.g. after an import. Clears undo and redo.
    pub fn reset(&mut self, state: ProjectState) {
        self.history.reset(state);
    }

    pub fn state(&self) -> &ProjectState {
        self.history.current()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.state().segments
    }

    pub fn history(&self) -> &HistoryManager<ProjectState> {
        &self.history
    }

    pub fn numbering(&self) -> HashMap<SegmentId, String> {
        numbering(self.segments())
    }

    pub fn spans(&self, kind: MediaKind) -> Vec<SpanStatus> {
        spans(self.segments(), kind)
    }

    pub fn assets(&self) -> AssetIndex {
        aggregate_assets(self.segments())
    }

    pub fn outline(&self) -> String {
        outline(self.segments())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(ProjectState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditorSession {
        let segments = vec![
            Segment::new("a").with_text("EXT. MOUNTAIN TOP"),
            Segment::new("b").with_text("Engine roars"),
        ];
        EditorSession::new(ProjectState::with_segments(segments))
    }

    #[test]
    fn mutate_records_labelled_entry() {
        let mut session = session();
        assert!(session
            .mutate(EditCommand::Indent { id: "b".into() })
            .unwrap());
        assert_eq!(session.history().undo_label(), Some("indent"));
        assert_eq!(session.numbering()[&SegmentId::from("b")], "1.1");
    }

    #[test]
    fn noop_commands_leave_history_alone() {
        let mut session = session();
        assert!(!session
            .mutate(EditCommand::Indent { id: "a".into() })
            .unwrap());
        assert!(!session
            .mutate(EditCommand::Outdent { id: "a".into() })
            .unwrap());
        assert!(!session
            .mutate(EditCommand::Delete { id: "ghost".into() })
            .unwrap());
        assert!(!session.can_undo());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn rejected_command_is_not_committed() {
        let mut session = session();
        session
            .mutate(EditCommand::SetMediaLink {
                id: "a".into(),
                kind: MediaKind::Music,
                link: "song".into(),
                title: None,
            })
            .unwrap();
        session
            .mutate(EditCommand::SetMediaDuration {
                id: "a".into(),
                kind: MediaKind::Music,
                duration: 2,
            })
            .unwrap();

        let before = session.state().clone();
        let result = session.mutate(EditCommand::SetMediaLink {
            id: "b".into(),
            kind: MediaKind::Music,
            link: "other".into(),
            title: None,
        });
        assert!(matches!(result, Err(StoryboardError::MediaOverlap { .. })));
        assert_eq!(session.state(), &before);
        assert_eq!(
            session.spans(MediaKind::Music),
            vec![SpanStatus::Start, SpanStatus::End]
        );
    }

    #[test]
    fn reset_clears_history() {
        let mut session = session();
        session
            .mutate(EditCommand::SetText {
                id: "a".into(),
                text: "INT. GARAGE".into(),
            })
            .unwrap();
        session.reset(ProjectState::default());
        assert!(!session.can_undo());
        assert!(session.segments().is_empty());
        assert!(session.assets().is_empty());
        assert_eq!(session.outline(), "");
    }

    #[test]
    fn history_limit_applies() {
        let mut session =
            EditorSession::with_history_limit(ProjectState::with_segments(vec![Segment::new("a")]), 2);
        for text in ["one", "two", "three"] {
            session
                .mutate(EditCommand::SetText {
                    id: "a".into(),
                    text: text.into(),
                })
                .unwrap();
        }
        assert!(session.undo());
        assert!(!session.undo());
        assert_eq!(session.segments()[0].text, "two");
    }
}
