use serde::{Deserialize, Serialize};

use crate::domain::value_objects::BuildStatus;

#[derive(Debug, Default, Deserialize)]
pub struct BuildIndexRequestDto {
    pub document_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexStatusDto {
    pub exists: bool,
    pub location: String,
    pub build_running: bool,
}

/// Payload of one `build_status` server-sent event.
#[derive(Debug, Serialize)]
pub struct BuildStatusDto {
    #[serde(flatten)]
    pub status: BuildStatus,
    pub label: String,
    pub terminal: bool,
}

impl From<BuildStatus> for BuildStatusDto {
    fn from(status: BuildStatus) -> Self {
        Self {
            label: status.label(),
            terminal: status.is_terminal(),
            status,
        }
    }
}
