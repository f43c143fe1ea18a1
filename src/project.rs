//! Project information dump.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_name: String,
    pub project_version: String,
    pub authors: String,
}

impl ProjectInfo {
    /// Information about this build, taken from the package metadata.
    pub fn current() -> Self {
        Self {
            project_name: env!("CARGO_PKG_NAME").to_string(),
            project_version: env!("CARGO_PKG_VERSION").to_string(),
            authors: env!("CARGO_PKG_AUTHORS").to_string(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, self)?;
        info!("Project info written to {}", path.display());
        Ok(())
    }
}
