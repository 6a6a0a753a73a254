//! Session orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{error, info};

use crate::domain::{
    DailyQuotaGuard, DomainError, IdGenerator, Question, Session, SessionResult, UserAnswer,
};
use crate::ports::{QuestionStore, SessionStore};

/// Default time limit for a session, regardless of topic count.
pub const DEFAULT_TOPIC_DURATION_SECS: i64 = 10 * 60;

/// Session lifecycle operations exposed to the HTTP port.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn show_topics(&self) -> Result<Vec<String>, DomainError>;

    /// Creates a session for the user over the topic set and draws its
    /// questions; returns the session id and the drawn questions.
    async fn create_session(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<(String, HashMap<String, Question>), DomainError>;

    /// Completes the session with the submitted answers and grades it.
    async fn complete_session(
        &self,
        session_id: &str,
        answers: Vec<UserAnswer>,
    ) -> Result<SessionResult, DomainError>;

    /// Lists the user's completed sessions, newest first.
    async fn get_all_completed_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DomainError>;
}

/// Base session service: coordinates the state machine, the question
/// selector, the quota guard, and persistence.
pub struct SessionManager {
    question_store: Arc<dyn QuestionStore>,
    session_store: Arc<dyn SessionStore>,
    quota_guard: Arc<dyn DailyQuotaGuard>,
    generator: Arc<dyn IdGenerator>,
    topic_duration: Duration,
}

impl SessionManager {
    pub fn new(
        question_store: Arc<dyn QuestionStore>,
        session_store: Arc<dyn SessionStore>,
        quota_guard: Arc<dyn DailyQuotaGuard>,
        generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            question_store,
            session_store,
            quota_guard,
            generator,
            topic_duration: Duration::seconds(DEFAULT_TOPIC_DURATION_SECS),
        }
    }

    pub fn with_topic_duration(mut self, duration: Duration) -> Self {
        self.topic_duration = duration;
        self
    }
}

#[async_trait]
impl SessionService for SessionManager {
    async fn show_topics(&self) -> Result<Vec<String>, DomainError> {
        info!("ShowTopics started");

        let topics = self
            .question_store
            .get_topics()
            .await
            .map_err(|e| e.context("GetTopics"))?;

        info!("ShowTopics completed");
        Ok(topics)
    }

    async fn create_session(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<(String, HashMap<String, Question>), DomainError> {
        info!(user_id, "CreateSession started");

        let mut session = Session::new(user_id, topics.to_vec(), self.generator.as_ref())
            .map_err(|e| e.context("NewSession"))?;

        let forbidden = session
            .is_daily_session_limit_reached(self.quota_guard.as_ref(), user_id, topics)
            .await
            .map_err(|e| e.context("IsDailySessionLimitReached"))?;
        if forbidden {
            let err = DomainError::forbidden("creating new session for this user");
            error!(user_id, "{err}");
            return Err(err);
        }

        let questions = self
            .question_store
            .select_questions(topics)
            .await
            .map_err(|e| e.context("GetQuestions"))?;

        let questions_map: HashMap<String, Question> = questions
            .into_iter()
            .map(|question| (question.id().to_string(), question))
            .collect();

        session
            .set_questions(questions_map.clone(), self.topic_duration)
            .map_err(|e| e.context("SetQuestions"))?;

        self.session_store
            .store_session(&session)
            .await
            .map_err(|e| e.context("StoreSession"))?;

        info!(session_id = session.session_id(), "CreateSession completed");
        Ok((session.session_id().to_string(), questions_map))
    }

    async fn complete_session(
        &self,
        session_id: &str,
        answers: Vec<UserAnswer>,
    ) -> Result<SessionResult, DomainError> {
        info!(session_id, "CompleteSession started");

        let mut session = self
            .session_store
            .get_session_by_id(session_id)
            .await
            .map_err(|e| e.context("GetSessionBySessionID"))?;

        session
            .set_user_answer(answers)
            .map_err(|e| e.context("SetUserAnswer"))?;

        let result = session
            .session_result()
            .map_err(|e| e.context("GetSessionResult"))?;

        self.session_store
            .store_session(&session)
            .await
            .map_err(|e| e.context("StoreSession"))?;

        info!(session_id, "CompleteSession completed");
        Ok(result)
    }

    async fn get_all_completed_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DomainError> {
        info!(user_id, "GetAllCompletedUserSessions started");

        if user_id.is_empty() {
            let err = DomainError::invalid_param("userID not set");
            error!("{err}");
            return Err(err);
        }

        let sessions = self
            .session_store
            .get_all_completed_user_sessions(user_id)
            .await
            .map_err(|e| e.context("GetAllCompletedUserSessions"))?;

        info!(user_id, "GetAllCompletedUserSessions completed");
        Ok(sessions)
    }
}
