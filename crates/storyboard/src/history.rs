//! Snapshot-based undo/redo.
//!
//! The history is a linear list of whole-state snapshots plus a cursor:
//! - committing a state equal to the current one is ignored
//! - committing after an undo discards every snapshot past the cursor
//! - `reset` replaces the whole list, so it cannot be undone
//!
//! ```ignore
//! let mut history = HistoryManager::new(ProjectState::default());
//! history.try_commit_with("add", |state| apply_command(state, &command))?;
//! history.undo();
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

/// Label of the first entry of a fresh or reset history.
pub const INITIAL_LABEL: &str = "initial";

#[derive(Debug, Clone)]
pub struct HistoryEntry<S> {
    /// Action that produced this snapshot.
    pub label: String,
    pub state: S,
    pub committed_at: DateTime<Utc>,
}

impl<S> HistoryEntry<S> {
    fn new(label: &str, state: S) -> Self {
        Self {
            label: label.to_string(),
            state,
            committed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryManager<S> {
    entries: Vec<HistoryEntry<S>>,
    cursor: usize,
    /// Maximum number of snapshots kept; the oldest are dropped first.
    limit: Option<usize>,
}

impl<S: Clone + PartialEq> HistoryManager<S> {
    pub fn new(initial: S) -> Self {
        Self {
            entries: vec![HistoryEntry::new(INITIAL_LABEL, initial)],
            cursor: 0,
            limit: None,
        }
    }

    /// History that keeps at most `limit` snapshots (at least one).
    pub fn with_limit(initial: S, limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new(initial)
        }
    }

    pub fn current(&self) -> &S {
        &self.entries[self.cursor].state
    }

    /// Record `state` as the newest snapshot. Returns false when it equals the
    /// current snapshot and nothing was recorded.
    pub fn commit(&mut self, label: &str, state: S) -> bool {
        if *self.current() == state {
            debug!(label, "Commit suppressed: state unchanged");
            return false;
        }

        let discarded = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(label, state));
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();

        debug!(
            label,
            discarded,
            depth = self.entries.len(),
            "History entry committed"
        );
        true
    }

    /// Commit the result of `update` applied to the current snapshot.
    pub fn commit_with<F>(&mut self, label: &str, update: F) -> bool
    where
        F: FnOnce(&S) -> S,
    {
        let next = update(self.current());
        self.commit(label, next)
    }

    /// Like [`commit_with`](Self::commit_with) for fallible updates that may
    /// also decline to produce a new state.
    pub fn try_commit_with<E, F>(&mut self, label: &str, update: F) -> Result<bool, E>
    where
        F: FnOnce(&S) -> Result<Option<S>, E>,
    {
        match update(self.current())? {
            Some(next) => Ok(self.commit(label, next)),
            None => {
                debug!(label, "Commit skipped: update declined");
                Ok(false)
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        debug!(label = %self.entries[self.cursor].label, "Undo");
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        debug!(label = %self.entries[self.cursor].label, "Redo");
        true
    }

    /// Replace the whole history with a single snapshot.
    pub fn reset(&mut self, state: S) {
        self.entries = vec![HistoryEntry::new(INITIAL_LABEL, state)];
        self.cursor = 0;
        debug!("History reset");
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Label of the action the next `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.cursor].label.as_str())
    }

    /// Label of the action the next `redo` would reapply.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries
            .get(self.cursor + 1)
            .map(|e| e.label.as_str())
    }

    pub fn entries(&self) -> &[HistoryEntry<S>] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
            self.cursor -= excess;
        }
    }
}
