//! Wire DTOs for the public HTTP port.
//!
//! The answers-list shape doubles as the storage blob for completed
//! sessions, so its field names must stay bit-exact.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind, Question, SessionResult, UserAnswer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsDto {
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub question_id: String,
    pub question_type: String,
    pub topic: String,
    pub subject: String,
    pub variants: Vec<String>,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id().to_string(),
            question_type: question.question_type().to_string(),
            topic: question.topic().to_string(),
            subject: question.subject().to_string(),
            variants: question.variants(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    pub session_id: String,
    pub topics: Vec<String>,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswerDto {
    pub question_id: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswersListDto {
    pub user_answers: Vec<UserAnswerDto>,
}

impl UserAnswersListDto {
    pub fn from_answers(answers: &[UserAnswer]) -> Self {
        Self {
            user_answers: answers
                .iter()
                .map(|answer| UserAnswerDto {
                    question_id: answer.question_id().to_string(),
                    answers: answer.selections().to_vec(),
                })
                .collect(),
        }
    }

    /// Re-validates every entry through the domain constructor.
    pub fn into_answers(self) -> Result<Vec<UserAnswer>, DomainError> {
        self.user_answers
            .into_iter()
            .map(|dto| UserAnswer::new(dto.question_id, dto.answers))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResultDto {
    pub is_success: bool,
    pub grade: String,
}

impl From<&SessionResult> for SessionResultDto {
    fn from(result: &SessionResult) -> Self {
        Self {
            is_success: result.is_success,
            grade: result.grade.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSessionDto {
    pub started_at: DateTime<Utc>,
    pub topics: Vec<String>,
    pub user_answers: UserAnswersListDto,
    pub is_expired: bool,
    pub session_result: SessionResultDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSessionsListDto {
    pub completed_sessions: Vec<CompletedSessionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub status_code: u16,
    pub error_message: String,
}

impl ErrorDto {
    /// Maps an error kind to the response status and body.
    pub fn from_domain_error(err: &DomainError) -> (StatusCode, Self) {
        let status = match err.kind() {
            ErrorKind::InvalidParam => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden | ErrorKind::InvalidPassword | ErrorKind::InvalidJwt => {
                StatusCode::FORBIDDEN
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Self {
                status_code: status.as_u16(),
                error_message: err.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_blob_shape_is_bit_exact() {
        let answers = vec![
            UserAnswer::new("q1", vec!["a".to_string(), "b".to_string()]).unwrap(),
        ];
        let dto = UserAnswersListDto::from_answers(&answers);

        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(
            json,
            r#"{"user_answers":[{"question_id":"q1","answers":["a","b"]}]}"#
        );
    }

    #[test]
    fn answers_blob_roundtrips_through_validation() {
        let raw = r#"{"user_answers":[{"question_id":"q1","answers":[]}]}"#;
        let dto: UserAnswersListDto = serde_json::from_str(raw).unwrap();

        let answers = dto.into_answers().unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_id(), "q1");
    }

    #[test]
    fn answers_blob_with_empty_id_fails_validation() {
        let raw = r#"{"user_answers":[{"question_id":"","answers":["a"]}]}"#;
        let dto: UserAnswersListDto = serde_json::from_str(raw).unwrap();

        let err = dto.into_answers().unwrap_err();
        assert!(err.is(ErrorKind::UnprocessableEntity));
    }

    #[test]
    fn error_mapping_follows_the_status_table() {
        let cases = [
            (DomainError::invalid_param("x"), StatusCode::BAD_REQUEST),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (
                DomainError::new(ErrorKind::InvalidPassword, "x"),
                StatusCode::FORBIDDEN,
            ),
            (
                DomainError::new(ErrorKind::InvalidJwt, "x"),
                StatusCode::FORBIDDEN,
            ),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (
                DomainError::new(ErrorKind::AlreadyExists, "x"),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::internal("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::invalid_state("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, dto) = ErrorDto::from_domain_error(&err);
            assert_eq!(status, expected);
            assert_eq!(dto.status_code, expected.as_u16());
        }
    }
}
