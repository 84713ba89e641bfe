use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use storyboard::{normalize_spans, ProjectState};

use crate::error::{ProjectError, ProjectResult};
use crate::migrate::migrate_document;

/// Parse an exported project document.
///
/// The document is normalized first (see [`migrate_document`]), so older
/// exports load as long as they carry a `scriptData` array.
pub fn import_project(json: &str) -> ProjectResult<ProjectState> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    migrate_document(&mut value)?;

    let mut state: ProjectState = serde_json::from_value(value)?;
    validate_project(&state)?;

    let shortened = normalize_spans(&mut state.segments);
    if shortened > 0 {
        warn!(shortened, "Imported media spans overlapped or ran past the end");
    }

    debug!(
        segments = state.segments.len(),
        metrics = state.metric_columns.len(),
        "Imported project document"
    );
    Ok(state)
}

pub fn load_project(path: &Path) -> ProjectResult<ProjectState> {
    if !path.exists() {
        return Err(ProjectError::NotFound {
            path: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read project file");
        ProjectError::Io(e)
    })?;
    let state = import_project(&json)?;

    info!(
        path = %path.display(),
        segments = state.segments.len(),
        "Project loaded"
    );
    Ok(state)
}

fn validate_project(state: &ProjectState) -> ProjectResult<()> {
    let mut seen = HashSet::new();
    for segment in &state.segments {
        if segment.id.as_str().is_empty() {
            return Err(ProjectError::invalid("segment with empty id"));
        }
        if !seen.insert(segment.id.as_str()) {
            return Err(ProjectError::invalid(format!(
                "duplicate segment id `{}`",
                segment.id
            )));
        }
    }
    Ok(())
}
