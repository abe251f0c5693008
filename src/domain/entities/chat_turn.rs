use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Citation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    id: Uuid,
    role: Role,
    content: String,
    citations: Vec<Citation>,
    failed: bool,
    created_at: DateTime<Utc>,
}

impl ChatTurn {
    fn new(role: Role, content: String, citations: Vec<Citation>, failed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            citations,
            failed,
            created_at: Utc::now(),
        }
    }

    pub fn user(question: impl Into<String>) -> Self {
        Self::new(Role::User, question.into(), Vec::new(), false)
    }

    /// An answer with its citations. Callers pass citations built with
    /// [`derive_citations`](super::derive_citations); duplicates are dropped
    /// here as well so a turn never lists a page twice.
    pub fn assistant(answer: impl Into<String>, citations: Vec<Citation>) -> Self {
        let mut distinct: Vec<Citation> = Vec::with_capacity(citations.len());
        for citation in citations {
            if !distinct.iter().any(|c| c.key() == citation.key()) {
                distinct.push(citation);
            }
        }
        Self::new(Role::Assistant, answer.into(), distinct, false)
    }

    /// An assistant turn that reports an error instead of an answer.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(Role::Assistant, message.into(), Vec::new(), true)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn is_failure(&self) -> bool {
        self.failed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PageNumber;

    fn citation(page: u32) -> Citation {
        Citation {
            document_name: "manual.pdf".to_string(),
            page: PageNumber::new(page),
            preview: format!("page {page}"),
        }
    }

    #[test]
    fn test_user_turn() {
        let turn = ChatTurn::user("How do I adjust the belt?");
        assert_eq!(turn.role(), Role::User);
        assert!(turn.citations().is_empty());
        assert!(!turn.is_failure());
    }

    #[test]
    fn test_assistant_turn_drops_duplicate_pages() {
        let turn = ChatTurn::assistant("Loosen the bolts.", vec![citation(2), citation(2), citation(5)]);
        assert_eq!(turn.citations().len(), 2);
        assert_eq!(turn.citations()[0].page.index(), 2);
        assert_eq!(turn.citations()[1].page.index(), 5);
    }

    #[test]
    fn test_failure_turn() {
        let turn = ChatTurn::failure("Error processing your question: timeout");
        assert_eq!(turn.role(), Role::Assistant);
        assert!(turn.is_failure());
        assert!(turn.citations().is_empty());
    }
}
