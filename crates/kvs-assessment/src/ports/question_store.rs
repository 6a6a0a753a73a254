//! Question bank port.

use async_trait::async_trait;

use crate::domain::{DomainError, Question};

/// Read access to the question bank plus the ranked draw.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Lists every known topic name.
    async fn get_topics(&self) -> Result<Vec<String>, DomainError>;

    /// Draws questions for the topic set, fairly mixed across
    /// (topic, variant) partitions and biased toward least-used rows.
    ///
    /// The draw and the usage accounting must be atomic: a drawn row's
    /// usage counter is incremented in the same statement.
    async fn select_questions(&self, topics: &[String]) -> Result<Vec<Question>, DomainError>;

    /// Fetches questions by identifier, for session reconstruction.
    async fn get_questions_by_ids(&self, ids: &[String]) -> Result<Vec<Question>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn QuestionStore) {}
    }
}
