use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use storyboard::options::{option_label, CAMERA_MOTIONS, SHOT_SIZES, SHOT_TYPES};
use storyboard::{
    segment_numbers, EditCommand, EditorSession, MediaKind, ProjectState, Segment, SegmentId,
    SpanStatus,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod steps;

#[derive(Parser)]
#[command(name = "storyboard-cli")]
#[command(about = "Storyboard script editor - headless editing of storyboard projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project file (defaults to the application data directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Number of undo snapshots kept while replaying edits
    #[arg(long, global = true, default_value = "100")]
    history_limit: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project
    New {
        /// Overwrite an existing project
        #[arg(long)]
        force: bool,
    },

    /// Add a segment
    Add {
        /// Insert after this segment (defaults to the end)
        #[arg(long)]
        after: Option<String>,

        /// Text for the new segment
        #[arg(long)]
        text: Option<String>,
    },

    /// Delete a segment
    Delete { id: String },

    /// Nest a segment one level deeper
    Indent { id: String },

    /// Move a segment one level up
    Outdent { id: String },

    /// Toggle the chapter-heading flag
    Heading { id: String },

    /// Replace a segment's text
    SetText { id: String, text: String },

    /// Set a metric score (0-10)
    SetMetric { id: String, key: String, value: i64 },

    /// Attach music or a reference video
    SetMedia {
        id: String,

        /// music or reference
        kind: MediaKind,

        /// Link to attach; an empty string clears the attachment
        link: String,

        #[arg(long)]
        title: Option<String>,

        /// Number of segments the attachment spans
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Move an attachment to another segment
    MoveMedia {
        source: String,
        target: String,
        kind: MediaKind,
    },

    /// Replay a JSON array of edit commands, "undo" and "redo"
    Apply { file: PathBuf },

    /// Print the numbered script
    Outline {
        /// Append shot size, shot type and camera motion labels
        #[arg(long)]
        tags: bool,
    },

    /// Print span status per segment
    Spans { kind: MediaKind },

    /// Print the asset index as JSON
    Assets,

    /// Replace the project with an exported document
    Import { file: PathBuf },

    /// Write the project as a document (stdout when no file is given)
    Export { file: Option<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = cli.project.unwrap_or_else(project::default_project_path);
    let limit = cli.history_limit;

    match cli.command {
        Commands::New { force } => new_command(&path, force),
        Commands::Add { after, text } => add_command(&path, limit, after, text),
        Commands::Delete { id } => edit_command(&path, limit, EditCommand::Delete { id: id.into() }),
        Commands::Indent { id } => edit_command(&path, limit, EditCommand::Indent { id: id.into() }),
        Commands::Outdent { id } => {
            edit_command(&path, limit, EditCommand::Outdent { id: id.into() })
        }
        Commands::Heading { id } => edit_command(
            &path,
            limit,
            EditCommand::ToggleHeading { id: id.into() },
        ),
        Commands::SetText { id, text } => edit_command(
            &path,
            limit,
            EditCommand::SetText { id: id.into(), text },
        ),
        Commands::SetMetric { id, key, value } => edit_command(
            &path,
            limit,
            EditCommand::SetMetric {
                id: id.into(),
                key,
                value,
            },
        ),
        Commands::SetMedia {
            id,
            kind,
            link,
            title,
            duration,
        } => set_media_command(&path, limit, id.into(), kind, link, title, duration),
        Commands::MoveMedia {
            source,
            target,
            kind,
        } => edit_command(
            &path,
            limit,
            EditCommand::MoveMedia {
                source: source.into(),
                target: target.into(),
                kind,
            },
        ),
        Commands::Apply { file } => replay_command(&path, limit, &file),
        Commands::Outline { tags } => outline_command(&path, limit, tags),
        Commands::Spans { kind } => spans_command(&path, limit, kind),
        Commands::Assets => {
            let session = open_session(&path, limit)?;
            println!("{}", serde_json::to_string_pretty(&session.assets())?);
            Ok(())
        }
        Commands::Import { file } => import_command(&path, &file),
        Commands::Export { file } => export_command(&path, file.as_deref()),
    }
}

fn open_session(path: &Path, limit: usize) -> Result<EditorSession> {
    let state = project::load_project(path).with_context(|| {
        format!(
            "failed to open {} (run `storyboard-cli new` first?)",
            path.display()
        )
    })?;
    Ok(EditorSession::with_history_limit(state, limit))
}

fn save_session(path: &Path, session: &EditorSession) -> Result<()> {
    project::save_project(session.state(), path)
        .with_context(|| format!("failed to save {}", path.display()))
}

fn new_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    project::save_project(&ProjectState::default(), path)?;
    info!("Created empty project at {}", path.display());
    Ok(())
}

fn edit_command(path: &Path, limit: usize, command: EditCommand) -> Result<()> {
    let mut session = open_session(path, limit)?;
    let name = command.name();
    if session.mutate(command)? {
        save_session(path, &session)?;
        info!("Applied {}", name);
    } else {
        warn!("{} made no change", name);
    }
    Ok(())
}

fn add_command(
    path: &Path,
    limit: usize,
    after: Option<String>,
    text: Option<String>,
) -> Result<()> {
    let mut session = open_session(path, limit)?;
    let id = SegmentId::new();
    let added = session.mutate(EditCommand::Add {
        after: after.map(SegmentId::from),
        id: Some(id.clone()),
    })?;
    if !added {
        bail!("no segment was added; check the --after id");
    }
    if let Some(text) = text {
        session.mutate(EditCommand::SetText {
            id: id.clone(),
            text,
        })?;
    }
    save_session(path, &session)?;
    println!("{id}");
    Ok(())
}

fn set_media_command(
    path: &Path,
    limit: usize,
    id: SegmentId,
    kind: MediaKind,
    link: String,
    title: Option<String>,
    duration: Option<u32>,
) -> Result<()> {
    let mut session = open_session(path, limit)?;
    let clearing = link.is_empty();
    let mut changed = session.mutate(EditCommand::SetMediaLink {
        id: id.clone(),
        kind,
        link,
        title,
    })?;
    if let Some(duration) = duration.filter(|_| !clearing) {
        changed |= session.mutate(EditCommand::SetMediaDuration { id, kind, duration })?;
    }
    if changed {
        save_session(path, &session)?;
        info!("Updated {} attachment", kind);
    } else {
        warn!("{} attachment unchanged", kind);
    }
    Ok(())
}

fn replay_command(path: &Path, limit: usize, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let steps = steps::parse_steps(&json)?;

    let mut session = open_session(path, limit)?;
    let summary = steps::replay(&mut session, steps)?;
    save_session(path, &session)?;

    info!(
        committed = summary.committed,
        skipped = summary.skipped,
        undone = summary.undone,
        redone = summary.redone,
        "Replay finished"
    );
    Ok(())
}

fn outline_command(path: &Path, limit: usize, tags: bool) -> Result<()> {
    let session = open_session(path, limit)?;
    if !tags {
        println!("{}", session.outline());
        return Ok(());
    }
    let numbers = segment_numbers(session.segments());
    for (segment, number) in session.segments().iter().zip(numbers) {
        let indent = "    ".repeat(number.matches('.').count());
        match shot_tags(segment) {
            Some(tags) => println!("{indent}{number} {} [{tags}]", segment.text),
            None => println!("{indent}{number} {}", segment.text),
        }
    }
    Ok(())
}

/// Labels for the segment's shot tags; unknown values are shown as stored.
fn shot_tags(segment: &Segment) -> Option<String> {
    let labels: Vec<&str> = [
        (SHOT_SIZES, segment.shot_size.as_str()),
        (SHOT_TYPES, segment.shot_type.as_str()),
        (CAMERA_MOTIONS, segment.camera_motion.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(options, value)| option_label(options, value).unwrap_or(value))
    .collect();
    (!labels.is_empty()).then(|| labels.join(" | "))
}

fn spans_command(path: &Path, limit: usize, kind: MediaKind) -> Result<()> {
    let session = open_session(path, limit)?;
    let numbers = segment_numbers(session.segments());
    let statuses = session.spans(kind);
    for ((segment, number), status) in session.segments().iter().zip(numbers).zip(statuses) {
        let marker = match status {
            SpanStatus::None => "",
            SpanStatus::Start => "start",
            SpanStatus::Middle => "middle",
            SpanStatus::End => "end",
        };
        let media = segment.media(kind);
        if status == SpanStatus::Start {
            println!("{number}\t{marker}\t{}", media.link);
        } else {
            println!("{number}\t{marker}");
        }
    }
    Ok(())
}

fn import_command(path: &Path, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let state = project::import_project(&json)
        .with_context(|| format!("{} is not a valid project document", file.display()))?;
    project::save_project(&state, path)?;
    info!(
        "Imported {} segments from {}",
        state.segments.len(),
        file.display()
    );
    Ok(())
}

fn export_command(path: &Path, file: Option<&Path>) -> Result<()> {
    let session = open_session(path, 1)?;
    let json = project::export_project(session.state())?;
    match file {
        Some(file) => {
            std::fs::write(file, json)
                .with_context(|| format!("failed to write {}", file.display()))?;
            info!("Exported project to {}", file.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
