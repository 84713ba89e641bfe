use anyhow::{Context, Result};
use serde::Deserialize;
use storyboard::{EditCommand, EditorSession};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStep {
    Undo,
    Redo,
}

/// One entry of a replay file: an edit command object or `"undo"` / `"redo"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    History(HistoryStep),
    Edit(EditCommand),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub committed: usize,
    pub skipped: usize,
    pub undone: usize,
    pub redone: usize,
}

pub fn parse_steps(json: &str) -> Result<Vec<Step>> {
    serde_json::from_str(json).context("replay file must be a JSON array of steps")
}

/// Run `steps` against `session` in order. Stops at the first rejected edit.
pub fn replay(session: &mut EditorSession, steps: Vec<Step>) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, step) in steps.into_iter().enumerate() {
        match step {
            Step::History(HistoryStep::Undo) => {
                if session.undo() {
                    summary.undone += 1;
                } else {
                    warn!(step = index, "Nothing to undo");
                }
            }
            Step::History(HistoryStep::Redo) => {
                if session.redo() {
                    summary.redone += 1;
                } else {
                    warn!(step = index, "Nothing to redo");
                }
            }
            Step::Edit(command) => {
                let name = command.name();
                let committed = session
                    .mutate(command)
                    .with_context(|| format!("step {index} ({name}) was rejected"))?;
                if committed {
                    summary.committed += 1;
                } else {
                    debug!(step = index, command = name, "Step made no change");
                    summary.skipped += 1;
                }
            }
        }
    }
    Ok(summary)
}
