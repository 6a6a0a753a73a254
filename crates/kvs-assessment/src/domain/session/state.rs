//! Session state machine.
//!
//! Three states expose one capability set; an operation a state does not
//! support fails with `InvalidState` and leaves the state untouched.
//! Transitions are irreversible: Init → Active (`set_questions`) →
//! Completed (`set_user_answer`). The Completed state snapshots the
//! questions by value so the frozen result can never drift.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, Question, UserAnswer};

pub const INIT_STATE: &str = "init state";
pub const ACTIVE_STATE: &str = "active state";
pub const COMPLETED_STATE: &str = "completed state";

/// Minimal percentage of correct answers for a passed session.
pub const PASS_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Init,
    Active {
        questions: HashMap<String, Question>,
        started_at: DateTime<Utc>,
        duration: Duration,
    },
    Completed {
        questions: HashMap<String, Question>,
        answers: Vec<UserAnswer>,
        started_at: DateTime<Utc>,
        is_expired: bool,
    },
}

impl SessionState {
    /// Active state with a prescribed start, used when restoring from
    /// storage.
    pub fn active(
        questions: HashMap<String, Question>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        SessionState::Active {
            questions,
            started_at,
            duration,
        }
    }

    /// Completed state with prescribed contents, used when restoring from
    /// storage.
    pub fn completed(
        questions: HashMap<String, Question>,
        answers: Vec<UserAnswer>,
        started_at: DateTime<Utc>,
        is_expired: bool,
    ) -> Self {
        SessionState::Completed {
            questions,
            answers,
            started_at,
            is_expired,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            SessionState::Init => INIT_STATE,
            SessionState::Active { .. } => ACTIVE_STATE,
            SessionState::Completed { .. } => COMPLETED_STATE,
        }
    }

    fn unsupported(&self, operation: &str) -> DomainError {
        DomainError::invalid_state(format!(
            "{} not support `{}`",
            self.status(),
            operation
        ))
    }

    /// Init → Active. The drawn questions map must be non-empty.
    pub fn set_questions(
        &self,
        questions: HashMap<String, Question>,
        duration: Duration,
    ) -> Result<SessionState, DomainError> {
        match self {
            SessionState::Init => {
                if questions.is_empty() {
                    return Err(DomainError::invalid_param(
                        "questions for selected topics not changed",
                    ));
                }

                Ok(SessionState::Active {
                    questions,
                    started_at: Utc::now(),
                    duration,
                })
            }
            _ => Err(self.unsupported("SetQuestions")),
        }
    }

    /// Active → Completed. The expiration flag is computed here, at
    /// submission time; the answer list is recorded verbatim.
    pub fn set_user_answer(&self, answers: Vec<UserAnswer>) -> Result<SessionState, DomainError> {
        match self {
            SessionState::Active {
                questions,
                started_at,
                duration,
            } => {
                let is_expired = Utc::now() > *started_at + *duration;

                Ok(SessionState::Completed {
                    questions: questions.clone(),
                    answers,
                    started_at: *started_at,
                    is_expired,
                })
            }
            _ => Err(self.unsupported("SetUserAnswer")),
        }
    }

    pub fn questions(&self) -> Result<&HashMap<String, Question>, DomainError> {
        match self {
            SessionState::Active { questions, .. } | SessionState::Completed { questions, .. } => {
                Ok(questions)
            }
            SessionState::Init => Err(self.unsupported("GetQuestions")),
        }
    }

    pub fn started_at(&self) -> Result<DateTime<Utc>, DomainError> {
        match self {
            SessionState::Active { started_at, .. }
            | SessionState::Completed { started_at, .. } => Ok(*started_at),
            SessionState::Init => Err(self.unsupported("GetStartedAt")),
        }
    }

    pub fn duration_limit(&self) -> Result<Duration, DomainError> {
        match self {
            SessionState::Active { duration, .. } => Ok(*duration),
            _ => Err(self.unsupported("GetSessionDurationLimit")),
        }
    }

    pub fn user_answers(&self) -> Result<&[UserAnswer], DomainError> {
        match self {
            SessionState::Completed { answers, .. } => Ok(answers),
            _ => Err(self.unsupported("GetUserAnswers")),
        }
    }

    pub fn is_expired(&self) -> Result<bool, DomainError> {
        match self {
            SessionState::Completed { is_expired, .. } => Ok(*is_expired),
            _ => Err(self.unsupported("IsExpired")),
        }
    }

    /// Verifies the quota check is valid for this state; only Init may
    /// consult the daily limit.
    pub(crate) fn ensure_quota_checkable(&self) -> Result<(), DomainError> {
        match self {
            SessionState::Init => Ok(()),
            _ => Err(self.unsupported("IsDailySessionLimitReached")),
        }
    }

    /// Computes the graded outcome of a completed session.
    pub(crate) fn score(&self) -> Result<(bool, String), DomainError> {
        match self {
            SessionState::Completed {
                questions,
                answers,
                is_expired,
                ..
            } => {
                if *is_expired {
                    return Ok((false, "session expired".to_string()));
                }

                let mut correct_count = 0usize;
                for answer in answers {
                    let question = questions.get(answer.question_id()).ok_or_else(|| {
                        DomainError::invalid_param(format!(
                            "user answer has invalid question id: {}",
                            answer.question_id()
                        ))
                    })?;

                    if question.is_answer_correct(answer) {
                        correct_count += 1;
                    }
                }

                let percent = correct_count as f64 / questions.len() as f64 * 100.0;
                let grade = format!("{percent:.2} percents");

                Ok((percent >= PASS_THRESHOLD, grade))
            }
            _ => Err(self.unsupported("GetSessionResult")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, QuestionFactory, QuestionType};

    fn question(id: &str, correct: &str) -> Question {
        QuestionFactory::new()
            .create(
                id,
                QuestionType::SingleSelection,
                "Go",
                "Go is a ...?",
                vec![
                    "Language".to_string(),
                    "Game".to_string(),
                    "Tool".to_string(),
                    "Framework".to_string(),
                ],
                vec![correct.to_string()],
            )
            .unwrap()
    }

    fn question_map(ids: &[&str]) -> HashMap<String, Question> {
        ids.iter()
            .map(|id| (id.to_string(), question(id, "Language")))
            .collect()
    }

    fn answer(id: &str, selections: &[&str]) -> UserAnswer {
        UserAnswer::new(id, selections.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn statuses_are_bit_exact() {
        assert_eq!(SessionState::Init.status(), "init state");

        let active = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap();
        assert_eq!(active.status(), "active state");

        let completed = active.set_user_answer(vec![]).unwrap();
        assert_eq!(completed.status(), "completed state");
    }

    #[test]
    fn init_rejects_empty_questions_map() {
        let err = SessionState::Init
            .set_questions(HashMap::new(), Duration::minutes(10))
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidParam));
    }

    #[test]
    fn init_supports_only_set_questions_and_quota_check() {
        let state = SessionState::Init;

        assert!(state.ensure_quota_checkable().is_ok());

        let failures = [
            state.set_user_answer(vec![]).map(|_| ()).unwrap_err(),
            state.questions().map(|_| ()).unwrap_err(),
            state.started_at().map(|_| ()).unwrap_err(),
            state.duration_limit().map(|_| ()).unwrap_err(),
            state.user_answers().map(|_| ()).unwrap_err(),
            state.is_expired().map(|_| ()).unwrap_err(),
            state.score().map(|_| ()).unwrap_err(),
        ];
        for err in failures {
            assert!(err.is(ErrorKind::InvalidState));
            assert!(err.message().starts_with("init state not support"));
        }
        assert_eq!(state.status(), INIT_STATE);
    }

    #[test]
    fn scoring_error_names_the_operation() {
        let err = SessionState::Init.score().unwrap_err();
        assert!(err
            .message()
            .contains("init state not support `GetSessionResult`"));
    }

    #[test]
    fn active_rejects_foreign_operations() {
        let state = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap();

        let failures = [
            state
                .set_questions(question_map(&["q1"]), Duration::minutes(10))
                .map(|_| ())
                .unwrap_err(),
            state.user_answers().map(|_| ()).unwrap_err(),
            state.is_expired().map(|_| ()).unwrap_err(),
            state.score().map(|_| ()).unwrap_err(),
            state.ensure_quota_checkable().unwrap_err(),
        ];
        for err in failures {
            assert!(err.is(ErrorKind::InvalidState));
            assert!(err.message().starts_with("active state not support"));
        }
        assert_eq!(state.status(), ACTIVE_STATE);
    }

    #[test]
    fn active_exposes_questions_start_and_duration() {
        let state = SessionState::Init
            .set_questions(question_map(&["q1", "q2"]), Duration::minutes(7))
            .unwrap();

        assert_eq!(state.questions().unwrap().len(), 2);
        assert_eq!(state.duration_limit().unwrap(), Duration::minutes(7));
        assert!(state.started_at().is_ok());
    }

    #[test]
    fn completed_rejects_transitions_and_duration_limit() {
        let completed = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap()
            .set_user_answer(vec![answer("q1", &["Language"])])
            .unwrap();

        let failures = [
            completed
                .set_questions(question_map(&["q1"]), Duration::minutes(10))
                .map(|_| ())
                .unwrap_err(),
            completed.set_user_answer(vec![]).map(|_| ()).unwrap_err(),
            completed.duration_limit().map(|_| ()).unwrap_err(),
            completed.ensure_quota_checkable().unwrap_err(),
        ];
        for err in failures {
            assert!(err.is(ErrorKind::InvalidState));
            assert!(err.message().starts_with("completed state not support"));
        }
        assert_eq!(completed.status(), COMPLETED_STATE);
    }

    #[test]
    fn full_score_passes() {
        let completed = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap()
            .set_user_answer(vec![answer("q1", &["Language"])])
            .unwrap();

        let (is_success, grade) = completed.score().unwrap();
        assert!(is_success);
        assert_eq!(grade, "100.00 percents");
    }

    #[test]
    fn threshold_sits_at_sixty_percent() {
        let questions = question_map(&["q1", "q2", "q3", "q4", "q5"]);

        let three_correct = vec![
            answer("q1", &["Language"]),
            answer("q2", &["Language"]),
            answer("q3", &["Language"]),
            answer("q4", &["Game"]),
            answer("q5", &["Game"]),
        ];
        let completed = SessionState::Init
            .set_questions(questions.clone(), Duration::minutes(10))
            .unwrap()
            .set_user_answer(three_correct)
            .unwrap();
        let (is_success, grade) = completed.score().unwrap();
        assert!(is_success);
        assert_eq!(grade, "60.00 percents");

        let two_correct = vec![
            answer("q1", &["Language"]),
            answer("q2", &["Language"]),
            answer("q3", &["Game"]),
            answer("q4", &["Game"]),
            answer("q5", &["Game"]),
        ];
        let completed = SessionState::Init
            .set_questions(questions, Duration::minutes(10))
            .unwrap()
            .set_user_answer(two_correct)
            .unwrap();
        let (is_success, grade) = completed.score().unwrap();
        assert!(!is_success);
        assert_eq!(grade, "40.00 percents");
    }

    #[test]
    fn unanswered_questions_count_against_the_grade() {
        let completed = SessionState::Init
            .set_questions(question_map(&["q1", "q2"]), Duration::minutes(10))
            .unwrap()
            .set_user_answer(vec![answer("q1", &["Language"])])
            .unwrap();

        let (is_success, grade) = completed.score().unwrap();
        assert!(!is_success);
        assert_eq!(grade, "50.00 percents");
    }

    #[test]
    fn expired_session_grades_as_expired() {
        let active = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::milliseconds(10))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));

        let completed = active
            .set_user_answer(vec![answer("q1", &["Language"])])
            .unwrap();

        assert!(completed.is_expired().unwrap());
        let (is_success, grade) = completed.score().unwrap();
        assert!(!is_success);
        assert_eq!(grade, "session expired");
    }

    #[test]
    fn unknown_question_id_in_answers_is_invalid_param() {
        let completed = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap()
            .set_user_answer(vec![answer("ghost", &["Language"])])
            .unwrap();

        let err = completed.score().unwrap_err();
        assert!(err.is(ErrorKind::InvalidParam));
        assert!(err
            .message()
            .contains("user answer has invalid question id: ghost"));
    }

    #[test]
    fn completed_snapshot_is_independent_of_active_source() {
        let active = SessionState::Init
            .set_questions(question_map(&["q1"]), Duration::minutes(10))
            .unwrap();

        let completed = active
            .set_user_answer(vec![answer("q1", &["Language"])])
            .unwrap();

        // Both states hold their own copy of the drawn questions.
        assert_eq!(active.questions().unwrap().len(), 1);
        assert_eq!(completed.questions().unwrap().len(), 1);
    }
}
