//! Project documents: the JSON file a storyboard is exported to and imported
//! from, plus the on-disk location the CLI keeps its working project in.

use std::path::PathBuf;

pub mod error;
pub mod load;
pub mod migrate;
pub mod save;

pub use error::{ProjectError, ProjectResult};
pub use load::{import_project, load_project};
pub use migrate::migrate_document;
pub use save::{export_project, save_project};

pub const PROJECT_FILE_NAME: &str = "project.json";

pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    base.join("storyboard")
}

/// Where the working project lives when no path is given.
pub fn default_project_path() -> PathBuf {
    app_data_dir().join(PROJECT_FILE_NAME)
}
