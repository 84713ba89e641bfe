use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use storyboard::ProjectState;

use crate::error::{ProjectError, ProjectResult};
use crate::migrate::EXPORTED_AT_KEY;

/// Pretty-printed project document with an `exportedAt` timestamp.
pub fn export_project(state: &ProjectState) -> ProjectResult<String> {
    let mut value = serde_json::to_value(state)?;
    if let Some(root) = value.as_object_mut() {
        root.insert(
            EXPORTED_AT_KEY.to_string(),
            serde_json::Value::String(Utc::now().to_rfc3339()),
        );
    }
    let json = serde_json::to_string_pretty(&value)?;
    debug!(
        segments = state.segments.len(),
        json_len = json.len(),
        "Exported project document"
    );
    Ok(json)
}

/// Write the project to `path` through a sibling temp file and a rename, so
/// an interrupted save never leaves a truncated document behind.
pub fn save_project(state: &ProjectState, path: &Path) -> ProjectResult<()> {
    let json = export_project(state)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let temp_path = temp_path(path);
    std::fs::write(&temp_path, json.as_bytes()).map_err(|e| {
        tracing::error!(path = %temp_path.display(), error = %e, "Failed to write temp file");
        ProjectError::Io(e)
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        tracing::error!(
            from = %temp_path.display(),
            to = %path.display(),
            error = %e,
            "Failed to move temp file into place"
        );
        ProjectError::Io(e)
    })?;

    info!(
        path = %path.display(),
        segments = state.segments.len(),
        "Project saved"
    );
    Ok(())
}

pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard::Segment;

    #[test]
    fn export_carries_sections_and_timestamp() {
        let state = ProjectState::with_segments(vec![Segment::new("a").with_text("Opening")]);
        let json = export_project(&state).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["exportedAt"].is_string());
        assert_eq!(value["scriptData"][0]["segment"], "Opening");
        assert_eq!(value["emotionColumns"][0]["key"], "coolFactor");
        assert!(value["projectSettings"].is_object());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("project.json");

        save_project(&ProjectState::default(), &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn temp_path_keeps_extension() {
        assert_eq!(
            temp_path(Path::new("/data/project.json")),
            PathBuf::from("/data/project.json.tmp")
        );
    }
}
