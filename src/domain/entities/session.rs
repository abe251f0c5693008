use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ChatTurn;

/// The conversation of one interactive session. Lives in memory only.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    turns: Vec<ChatTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Drops every turn and returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.turns.len();
        self.turns.clear();
        removed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
