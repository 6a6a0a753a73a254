//! PostgreSQL session persistence.
//!
//! One row per session; the populated column set varies with the stored
//! state. Loading reconstructs the aggregate through the state constructors
//! and a secondary question lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::adapters::http::dto::UserAnswersListDto;
use crate::domain::{
    DailyQuotaGuard, DomainError, Question, Session, SessionState, ACTIVE_STATE, COMPLETED_STATE,
    INIT_STATE,
};
use crate::ports::{QuestionStore, SessionStore};

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
    questions: Arc<dyn QuestionStore>,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool, questions: Arc<dyn QuestionStore>) -> Self {
        Self { pool, questions }
    }

    fn question_ids(session: &Session) -> Result<Vec<String>, DomainError> {
        Ok(session.questions()?.keys().cloned().collect())
    }

    async fn question_map(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Question>, DomainError> {
        let questions = self
            .questions
            .get_questions_by_ids(ids)
            .await
            .map_err(|e| e.context("GetQuestionsByIDs"))?;

        Ok(questions
            .into_iter()
            .map(|question| (question.id().to_string(), question))
            .collect())
    }

    async fn row_to_session(&self, row: &sqlx::postgres::PgRow) -> Result<Session, DomainError> {
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| DomainError::internal(format!("scan session_id failure: {e}")))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| DomainError::internal(format!("scan user_id failure: {e}")))?;
        let state_tag: String = row
            .try_get("state")
            .map_err(|e| DomainError::internal(format!("scan state failure: {e}")))?;
        let topics: Vec<String> = row
            .try_get("topics")
            .map_err(|e| DomainError::internal(format!("scan topics failure: {e}")))?;
        let question_ids: Option<Vec<String>> = row
            .try_get("questions")
            .map_err(|e| DomainError::internal(format!("scan questions failure: {e}")))?;
        let answers_raw: Option<serde_json::Value> = row
            .try_get("answers")
            .map_err(|e| DomainError::internal(format!("scan answers failure: {e}")))?;
        let created_at: Option<DateTime<Utc>> = row
            .try_get("created_at")
            .map_err(|e| DomainError::internal(format!("scan created_at failure: {e}")))?;
        let duration_limit: Option<i64> = row
            .try_get("duration_limit")
            .map_err(|e| DomainError::internal(format!("scan duration_limit failure: {e}")))?;
        let is_expired: Option<bool> = row
            .try_get("is_expired")
            .map_err(|e| DomainError::internal(format!("scan is_expired failure: {e}")))?;

        let questions = match &question_ids {
            Some(ids) if !ids.is_empty() => self.question_map(ids).await?,
            _ => HashMap::new(),
        };

        let state = build_state(
            &state_tag,
            questions,
            answers_raw,
            created_at,
            duration_limit,
            is_expired,
        )?;

        Ok(Session::with_custom_state(session_id, user_id, topics, state))
    }
}

/// Rebuilds a session state from its stored columns.
fn build_state(
    state_tag: &str,
    questions: HashMap<String, Question>,
    answers_raw: Option<serde_json::Value>,
    created_at: Option<DateTime<Utc>>,
    duration_limit: Option<i64>,
    is_expired: Option<bool>,
) -> Result<SessionState, DomainError> {
    match state_tag {
        INIT_STATE => Ok(SessionState::Init),

        ACTIVE_STATE => {
            let started_at = created_at
                .ok_or_else(|| DomainError::internal("active session without created_at"))?;
            let duration_secs = duration_limit
                .ok_or_else(|| DomainError::internal("active session without duration_limit"))?;

            Ok(SessionState::active(
                questions,
                started_at,
                Duration::seconds(duration_secs),
            ))
        }

        COMPLETED_STATE => {
            let started_at = created_at
                .ok_or_else(|| DomainError::internal("completed session without created_at"))?;
            let is_expired = is_expired
                .ok_or_else(|| DomainError::internal("completed session without is_expired"))?;
            let answers_raw = answers_raw
                .ok_or_else(|| DomainError::internal("completed session without answers"))?;

            let answers_list: UserAnswersListDto = serde_json::from_value(answers_raw)
                .map_err(|e| DomainError::internal(format!("unmarshalling failure: {e}")))?;
            let answers = answers_list
                .into_answers()
                .map_err(|e| e.context("creating user answer failure"))?;

            Ok(SessionState::completed(
                questions, answers, started_at, is_expired,
            ))
        }

        other => Err(DomainError::internal(format!(
            "unknown session state: {other}"
        ))),
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn store_session(&self, session: &Session) -> Result<(), DomainError> {
        info!(session_id = session.session_id(), "StoreSession started");

        match session.status() {
            INIT_STATE => {
                sqlx::query(
                    r#"
                    INSERT INTO kvs.sessions (session_id, user_id, state, topics)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(session.session_id())
                .bind(session.user_id())
                .bind(session.status())
                .bind(session.topics())
                .execute(&self.pool)
                .await
                .map_err(map_insert_error)?;
            }

            ACTIVE_STATE => {
                let question_ids = Self::question_ids(session)?;
                let started_at = session.started_at()?;
                let duration_secs = session.session_duration_limit()?.num_seconds();

                sqlx::query(
                    r#"
                    INSERT INTO kvs.sessions (
                        session_id, user_id, state, topics,
                        questions, created_at, duration_limit
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(session.session_id())
                .bind(session.user_id())
                .bind(session.status())
                .bind(session.topics())
                .bind(&question_ids)
                .bind(started_at)
                .bind(duration_secs)
                .execute(&self.pool)
                .await
                .map_err(map_insert_error)?;
            }

            COMPLETED_STATE => {
                let question_ids = Self::question_ids(session)?;
                let answers = UserAnswersListDto::from_answers(session.user_answers()?);
                let answers_json = serde_json::to_value(&answers)
                    .map_err(|e| DomainError::internal(format!("marshalling failure: {e}")))?;
                let is_expired = session.is_expired()?;
                let result = session.session_result()?;

                let outcome = sqlx::query(
                    r#"
                    UPDATE kvs.sessions
                    SET state = $2,
                        questions = $3,
                        answers = $4,
                        is_expired = $5,
                        is_passed = $6,
                        grade = $7,
                        updated_at = now()
                    WHERE session_id = $1
                    "#,
                )
                .bind(session.session_id())
                .bind(session.status())
                .bind(&question_ids)
                .bind(answers_json)
                .bind(is_expired)
                .bind(result.is_success)
                .bind(&result.grade)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::internal(format!("store session finished with failure: {e}"))
                })?;

                if outcome.rows_affected() == 0 {
                    return Err(DomainError::not_found(format!(
                        "session not found: {}",
                        session.session_id()
                    )));
                }
            }

            other => {
                return Err(DomainError::internal(format!(
                    "unknown session state: {other}"
                )));
            }
        }

        info!(session_id = session.session_id(), "StoreSession completed");
        Ok(())
    }

    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DomainError> {
        info!(session_id, "GetSessionBySessionID started");

        let row = sqlx::query(
            r#"
            SELECT
                s.session_id,
                s.user_id,
                s.state,
                s.topics,
                s.questions,
                s.answers,
                s.created_at,
                s.duration_limit,
                s.is_expired
            FROM kvs.sessions s
            WHERE s.session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("scan session data failure: {e}")))?
        .ok_or_else(|| DomainError::not_found(format!("session not found: {session_id}")))?;

        let session = self.row_to_session(&row).await?;

        info!(session_id, "GetSessionBySessionID completed");
        Ok(session)
    }

    async fn get_all_completed_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DomainError> {
        info!(user_id, "GetAllCompletedUserSessions started");

        let rows = sqlx::query(
            r#"
            SELECT
                s.session_id,
                s.user_id,
                s.state,
                s.topics,
                s.questions,
                s.answers,
                s.created_at,
                s.duration_limit,
                s.is_expired
            FROM kvs.sessions s
            WHERE s.user_id = $1 AND s.state = $2
            ORDER BY s.updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(COMPLETED_STATE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("fetch completed sessions failure: {e}")))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            sessions.push(self.row_to_session(row).await?);
        }

        info!(count = sessions.len(), "GetAllCompletedUserSessions completed");
        Ok(sessions)
    }
}

#[async_trait]
impl DailyQuotaGuard for PostgresSessionStore {
    async fn is_daily_session_limit_reached(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<bool, DomainError> {
        info!(user_id, "IsDailySessionLimitReached started");

        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM kvs.sessions s
                WHERE s.user_id = $1
                  AND s.state = $2
                  AND s.updated_at::date >= CURRENT_DATE
                  AND s.topics && $3
            ) AS reached
            "#,
        )
        .bind(user_id)
        .bind(COMPLETED_STATE)
        .bind(topics)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("daily limit query failure: {e}")))?;

        let reached: bool = row
            .try_get("reached")
            .map_err(|e| DomainError::internal(format!("scan daily limit failure: {e}")))?;

        info!(user_id, reached, "IsDailySessionLimitReached completed");
        Ok(reached)
    }
}

/// Unique-violation on insert means the generator produced a colliding id.
fn map_insert_error(err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return DomainError::internal(format!("session id collision: {db_err}"));
        }
    }
    DomainError::internal(format!("store session finished with failure: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, QuestionFactory, QuestionType};

    fn question_map() -> HashMap<String, Question> {
        let question = QuestionFactory::new()
            .create(
                "q1",
                QuestionType::SingleSelection,
                "Go",
                "Go is a ...?",
                vec!["Language".to_string(), "Game".to_string()],
                vec!["Language".to_string()],
            )
            .unwrap();
        HashMap::from([("q1".to_string(), question)])
    }

    #[test]
    fn init_state_rebuilds_from_tag_alone() {
        let state = build_state(INIT_STATE, HashMap::new(), None, None, None, None).unwrap();
        assert_eq!(state.status(), INIT_STATE);
    }

    #[test]
    fn active_state_restores_started_at_and_duration() {
        let started_at = Utc::now();
        let state = build_state(
            ACTIVE_STATE,
            question_map(),
            None,
            Some(started_at),
            Some(600),
            None,
        )
        .unwrap();

        assert_eq!(state.status(), ACTIVE_STATE);
        assert_eq!(state.started_at().unwrap(), started_at);
        assert_eq!(state.duration_limit().unwrap(), Duration::seconds(600));
    }

    #[test]
    fn active_state_without_created_at_is_internal() {
        let err =
            build_state(ACTIVE_STATE, question_map(), None, None, Some(600), None).unwrap_err();
        assert!(err.is(ErrorKind::Internal));
    }

    #[test]
    fn completed_state_decodes_the_answers_blob() {
        let answers = serde_json::json!({
            "user_answers": [{"question_id": "q1", "answers": ["Language"]}]
        });

        let state = build_state(
            COMPLETED_STATE,
            question_map(),
            Some(answers),
            Some(Utc::now()),
            None,
            Some(false),
        )
        .unwrap();

        assert_eq!(state.status(), COMPLETED_STATE);
        assert_eq!(state.user_answers().unwrap().len(), 1);
        assert!(!state.is_expired().unwrap());
        let (is_success, grade) = state.score().unwrap();
        assert!(is_success);
        assert_eq!(grade, "100.00 percents");
    }

    #[test]
    fn completed_state_revalidates_answers() {
        let answers = serde_json::json!({
            "user_answers": [{"question_id": "", "answers": ["Language"]}]
        });

        let err = build_state(
            COMPLETED_STATE,
            question_map(),
            Some(answers),
            Some(Utc::now()),
            None,
            Some(false),
        )
        .unwrap_err();
        assert!(err.is(ErrorKind::UnprocessableEntity));
    }

    #[test]
    fn unknown_state_tag_is_internal() {
        let err =
            build_state("paused state", HashMap::new(), None, None, None, None).unwrap_err();
        assert!(err.is(ErrorKind::Internal));
        assert!(err.message().contains("unknown session state"));
    }
}
