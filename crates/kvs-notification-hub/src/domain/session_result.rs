//! Finished-session result as consumed from the bus.

use std::collections::HashMap;

use super::DomainError;

/// Result of a completed test session, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    user_id: String,
    pub topics: Vec<String>,
    /// Question id → presented variants.
    pub questions: HashMap<String, Vec<String>>,
    /// Question label → user selections.
    pub user_answers: HashMap<String, Vec<String>>,
    pub is_expired: bool,
    pub is_success: bool,
    /// Human-readable grade line.
    pub resume: String,
}

impl SessionResult {
    /// # Errors
    ///
    /// - `InvalidParam` if any identifying field is empty
    pub fn new(
        user_id: impl Into<String>,
        topics: Vec<String>,
        questions: HashMap<String, Vec<String>>,
        user_answers: HashMap<String, Vec<String>>,
        is_expired: bool,
        is_success: bool,
        resume: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        let resume = resume.into();

        if user_id.trim().is_empty() {
            return Err(DomainError::invalid_param("user id is empty"));
        }
        if topics.is_empty() {
            return Err(DomainError::invalid_param("topics list is empty"));
        }
        if questions.is_empty() {
            return Err(DomainError::invalid_param("questions list is empty"));
        }
        if user_answers.is_empty() {
            return Err(DomainError::invalid_param("answers list is empty"));
        }
        if resume.trim().is_empty() {
            return Err(DomainError::invalid_param("resume is empty"));
        }

        Ok(Self {
            user_id: user_id.trim().to_string(),
            topics,
            questions,
            user_answers,
            is_expired,
            is_success,
            resume: resume.trim().to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn parts() -> (
        HashMap<String, Vec<String>>,
        HashMap<String, Vec<String>>,
    ) {
        (
            HashMap::from([("q1".to_string(), vec!["Language".to_string()])]),
            HashMap::from([("q1".to_string(), vec!["Language".to_string()])]),
        )
    }

    #[test]
    fn valid_result_is_constructed_trimmed() {
        let (questions, answers) = parts();
        let result = SessionResult::new(
            " u1 ",
            vec!["Go".to_string()],
            questions,
            answers,
            false,
            true,
            " 100.00 percents ",
        )
        .unwrap();

        assert_eq!(result.user_id(), "u1");
        assert_eq!(result.resume, "100.00 percents");
    }

    #[test]
    fn empty_fields_are_rejected() {
        let (questions, answers) = parts();

        let err = SessionResult::new(
            "",
            vec!["Go".to_string()],
            questions.clone(),
            answers.clone(),
            false,
            true,
            "grade",
        )
        .unwrap_err();
        assert!(err.is(ErrorKind::InvalidParam));

        let err = SessionResult::new(
            "u1",
            vec![],
            questions.clone(),
            answers.clone(),
            false,
            true,
            "grade",
        )
        .unwrap_err();
        assert!(err.is(ErrorKind::InvalidParam));

        let err = SessionResult::new(
            "u1",
            vec!["Go".to_string()],
            HashMap::new(),
            answers,
            false,
            true,
            "grade",
        )
        .unwrap_err();
        assert!(err.is(ErrorKind::InvalidParam));
    }
}
