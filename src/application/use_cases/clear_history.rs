use tracing::info;

use crate::domain::entities::Session;

/// Empties the running conversation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClearHistoryUseCase;

impl ClearHistoryUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Returns how many turns were removed.
    pub fn execute(&self, session: &mut Session) -> usize {
        let removed = session.clear();
        info!(session_id = %session.id(), removed, "cleared chat history");
        removed
    }
}
