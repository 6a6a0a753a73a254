//! Session aggregate.
//!
//! Holds identity, owner, and topic set; every operation forwards to the
//! current state, and `change_state` is the only place the state is
//! replaced.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, Question, SessionResult, SessionState, UserAnswer};

/// Produces session identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Answers "has this user already completed a session today for an
/// intersecting topic set?".
#[async_trait]
pub trait DailyQuotaGuard: Send + Sync {
    async fn is_daily_session_limit_reached(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<bool, DomainError>;
}

/// A one-shot timed knowledge test for one user over a fixed topic set.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    session_id: String,
    user_id: String,
    topics: Vec<String>,
    state: SessionState,
}

impl Session {
    /// Creates a session in the Init state with a generated identifier.
    ///
    /// # Errors
    ///
    /// - `InvalidParam` if the user id or topic set is empty
    pub fn new(
        user_id: impl Into<String>,
        topics: Vec<String>,
        generator: &dyn IdGenerator,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(DomainError::invalid_param("invalid userID"));
        }
        if topics.is_empty() {
            return Err(DomainError::invalid_param("topics was not selected"));
        }

        Ok(Self {
            session_id: generator.generate_id(),
            user_id,
            topics,
            state: SessionState::Init,
        })
    }

    /// Builds a session with a prescribed state; used by the repository
    /// when reconstructing and by tests.
    pub fn with_custom_state(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        topics: Vec<String>,
        state: SessionState,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            topics,
            state,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn status(&self) -> &'static str {
        self.state.status()
    }

    fn change_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Init → Active with the drawn questions and the duration limit.
    pub fn set_questions(
        &mut self,
        questions: HashMap<String, Question>,
        duration: Duration,
    ) -> Result<(), DomainError> {
        let next = self.state.set_questions(questions, duration)?;
        self.change_state(next);
        Ok(())
    }

    /// Active → Completed, recording the expiration flag.
    pub fn set_user_answer(&mut self, answers: Vec<UserAnswer>) -> Result<(), DomainError> {
        let next = self.state.set_user_answer(answers)?;
        self.change_state(next);
        Ok(())
    }

    pub fn questions(&self) -> Result<&HashMap<String, Question>, DomainError> {
        self.state.questions()
    }

    pub fn started_at(&self) -> Result<DateTime<Utc>, DomainError> {
        self.state.started_at()
    }

    pub fn session_duration_limit(&self) -> Result<Duration, DomainError> {
        self.state.duration_limit()
    }

    pub fn user_answers(&self) -> Result<&[UserAnswer], DomainError> {
        self.state.user_answers()
    }

    pub fn is_expired(&self) -> Result<bool, DomainError> {
        self.state.is_expired()
    }

    /// Grades the completed session, or reports `"session expired"`.
    pub fn session_result(&self) -> Result<SessionResult, DomainError> {
        let (is_success, grade) = self.state.score()?;

        let questions = self
            .state
            .questions()?
            .iter()
            .map(|(id, question)| (id.clone(), question.variants()))
            .collect();
        let user_answers = self
            .state
            .user_answers()?
            .iter()
            .map(|answer| {
                (
                    answer.question_id().to_string(),
                    answer.selections().to_vec(),
                )
            })
            .collect();

        Ok(SessionResult {
            user_id: self.user_id.clone(),
            topics: self.topics.clone(),
            questions,
            user_answers,
            is_expired: self.state.is_expired()?,
            is_success,
            grade,
        })
    }

    /// Delegates the daily-quota question to the guard; valid only while
    /// the session is still in Init.
    pub async fn is_daily_session_limit_reached(
        &self,
        guard: &dyn DailyQuotaGuard,
        user_id: &str,
        topics: &[String],
    ) -> Result<bool, DomainError> {
        self.state.ensure_quota_checkable()?;
        guard.is_daily_session_limit_reached(user_id, topics).await
    }
}
