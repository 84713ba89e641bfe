use storyboard::{
    segment_numbers, EditCommand, EditorSession, MediaKind, ProjectState, Segment, SegmentId,
    SpanStatus,
};

fn id(s: &str) -> SegmentId {
    SegmentId::from(s)
}

fn three_shots() -> EditorSession {
    let segments = vec![
        Segment::new("opening").with_text("EXT. MOUNTAIN TOP - NIGHT"),
        Segment::new("engine").with_text("Engine roars"),
        Segment::new("drift").with_text("Hairpin drift"),
    ];
    EditorSession::new(ProjectState::with_segments(segments))
}

fn set_text(target: &str, text: &str) -> EditCommand {
    EditCommand::SetText {
        id: id(target),
        text: text.to_string(),
    }
}

#[test]
fn undo_then_new_edit_drops_redo_branch() {
    let mut session = three_shots();
    session.mutate(set_text("opening", "A")).unwrap();
    session.mutate(set_text("opening", "B")).unwrap();
    assert!(session.undo());
    session.mutate(set_text("opening", "C")).unwrap();

    assert!(!session.can_redo());
    assert_eq!(session.segments()[0].text, "C");
    assert!(session.undo());
    assert_eq!(session.segments()[0].text, "A");
    assert!(session.undo());
    assert_eq!(session.segments()[0].text, "EXT. MOUNTAIN TOP - NIGHT");
    assert!(!session.undo());
}

#[test]
fn undo_restores_exact_snapshot() {
    let mut session = three_shots();
    let original = session.state().clone();

    session
        .mutate(EditCommand::Add {
            after: Some(id("engine")),
            id: Some(id("tyres")),
        })
        .unwrap();
    session.mutate(EditCommand::Indent { id: id("tyres") }).unwrap();
    session
        .mutate(EditCommand::AddMetric {
            label: "Plot Twist".into(),
        })
        .unwrap();
    session
        .mutate(EditCommand::SetMetric {
            id: id("tyres"),
            key: "plot-twist".into(),
            value: 7,
        })
        .unwrap();

    assert_eq!(
        segment_numbers(session.segments()),
        vec!["1", "2", "2.1", "3"]
    );

    while session.undo() {}
    assert_eq!(session.state(), &original);

    while session.redo() {}
    assert_eq!(session.state().segments[2].metric("plot-twist"), 7);
}

#[test]
fn media_span_follows_moves() {
    let mut session = three_shots();
    session
        .mutate(EditCommand::SetMediaLink {
            id: id("opening"),
            kind: MediaKind::Music,
            link: "https://example.com/song.mp3".into(),
            title: Some("Night Drive".into()),
        })
        .unwrap();
    session
        .mutate(EditCommand::SetMediaDuration {
            id: id("opening"),
            kind: MediaKind::Music,
            duration: 3,
        })
        .unwrap();
    assert_eq!(
        session.spans(MediaKind::Music),
        vec![SpanStatus::Start, SpanStatus::Middle, SpanStatus::End]
    );

    session
        .mutate(EditCommand::MoveMedia {
            source: id("opening"),
            target: id("engine"),
            kind: MediaKind::Music,
        })
        .unwrap();
    assert_eq!(
        session.spans(MediaKind::Music),
        vec![SpanStatus::None, SpanStatus::Start, SpanStatus::End]
    );
    assert_eq!(session.history().undo_label(), Some("move_media"));

    let assets = session.assets();
    let song = &assets.music["https://example.com/song.mp3"];
    assert_eq!(song.title, "Night Drive");
    assert_eq!(song.used_by, vec![id("engine")]);
}

#[test]
fn reorder_keeps_spans_inside_sequence() {
    let mut session = three_shots();
    session
        .mutate(EditCommand::SetMediaLink {
            id: id("engine"),
            kind: MediaKind::ReferenceVideo,
            link: "ref".into(),
            title: None,
        })
        .unwrap();
    session
        .mutate(EditCommand::SetMediaDuration {
            id: id("engine"),
            kind: MediaKind::ReferenceVideo,
            duration: 2,
        })
        .unwrap();

    session
        .mutate(EditCommand::MoveSegment {
            id: id("engine"),
            index: 2,
        })
        .unwrap();
    let moved = &session.segments()[2];
    assert_eq!(moved.id, id("engine"));
    assert_eq!(moved.reference_video_duration, 1);
    assert_eq!(
        session.spans(MediaKind::ReferenceVideo),
        vec![SpanStatus::None, SpanStatus::None, SpanStatus::Start]
    );
}

#[test]
fn commands_replay_from_json() {
    let steps = r#"[
        {"command": "add", "after": "drift", "id": "finish"},
        {"command": "set_text", "id": "finish", "text": "Cup stays full"},
        {"command": "toggle_heading", "id": "opening"},
        {"command": "indent", "id": "finish"}
    ]"#;
    let commands: Vec<EditCommand> = serde_json::from_str(steps).unwrap();

    let mut session = three_shots();
    for command in commands {
        assert!(session.mutate(command).unwrap());
    }
    assert_eq!(
        session.outline(),
        "1 EXT. MOUNTAIN TOP - NIGHT\n2 Engine roars\n3 Hairpin drift\n    3.1 Cup stays full"
    );
    assert!(session.segments()[0].is_heading);
    assert_eq!(session.history().len(), 5);
}
