use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but is not a usable project.
    #[error("Invalid project file: {reason}")]
    InvalidProject { reason: String },

    #[error("Project file not found: {path}")]
    NotFound { path: String },
}

impl ProjectError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ProjectError::InvalidProject {
            reason: reason.into(),
        }
    }
}

pub type ProjectResult<T> = Result<T, ProjectError>;
