use serde::{Deserialize, Serialize};

/// Progress of a single index build, reported stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum BuildStatus {
    Loading { document: String },
    Chunking { pages: usize },
    Embedding { chunks: usize },
    Saving { location: String },
    Completed { pages: usize, chunks: usize },
    /// `code` is the machine-readable error code, e.g. `DOCUMENT_NOT_FOUND`.
    Failed { code: String, error: String },
}

impl BuildStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Completed { .. } | BuildStatus::Failed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BuildStatus::Failed { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Short human label, e.g. for a spinner next to the build button.
    pub fn label(&self) -> String {
        match self {
            BuildStatus::Loading { document } => format!("Loading {document}..."),
            BuildStatus::Chunking { pages } => {
                format!("Splitting {pages} pages into chunks...")
            }
            BuildStatus::Embedding { chunks } => {
                format!("Creating embeddings for {chunks} chunks...")
            }
            BuildStatus::Saving { .. } => "Saving index...".to_string(),
            BuildStatus::Completed { .. } => "Document processed successfully!".to_string(),
            BuildStatus::Failed { error, .. } => format!("Processing failed: {error}"),
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!BuildStatus::Loading { document: "m.pdf".into() }.is_terminal());
        assert!(!BuildStatus::Embedding { chunks: 3 }.is_terminal());
        assert!(BuildStatus::Completed { pages: 1, chunks: 2 }.is_terminal());

        let failed = BuildStatus::Failed {
            code: "GENERATION_FAILED".into(),
            error: "boom".into(),
        };
        assert!(failed.is_terminal());
        assert!(failed.is_failed());
        assert_eq!(failed.error_message(), Some("boom"));
    }

    #[test]
    fn test_serialized_with_stage_tag() {
        let json = serde_json::to_value(BuildStatus::Chunking { pages: 10 }).unwrap();
        assert_eq!(json["stage"], "chunking");
        assert_eq!(json["pages"], 10);

        let json = serde_json::to_value(BuildStatus::Failed {
            code: "DOCUMENT_NOT_FOUND".into(),
            error: "document not found: m.pdf".into(),
        })
        .unwrap();
        assert_eq!(json["stage"], "failed");
        assert_eq!(json["code"], "DOCUMENT_NOT_FOUND");
    }
}
