//! User answer value object.

use super::{DomainError, ErrorKind};

/// One user's answer to one question: the question id plus the selected
/// variants. An empty selection list is allowed and simply scores as
/// incorrect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAnswer {
    question_id: String,
    selections: Vec<String>,
}

impl UserAnswer {
    /// # Errors
    ///
    /// - `UnprocessableEntity` if the question id is empty
    pub fn new(
        question_id: impl Into<String>,
        selections: Vec<String>,
    ) -> Result<Self, DomainError> {
        let question_id = question_id.into();
        if question_id.is_empty() {
            return Err(DomainError::new(
                ErrorKind::UnprocessableEntity,
                "invalid id",
            ));
        }

        Ok(Self {
            question_id,
            selections,
        })
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn selections(&self) -> &[String] {
        &self.selections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_keeps_id_and_selections() {
        let answer = UserAnswer::new("q-1", vec!["Language".to_string()]).unwrap();
        assert_eq!(answer.question_id(), "q-1");
        assert_eq!(answer.selections(), ["Language".to_string()]);
    }

    #[test]
    fn empty_id_is_unprocessable() {
        let err = UserAnswer::new("", vec![]).unwrap_err();
        assert!(err.is(ErrorKind::UnprocessableEntity));
    }

    #[test]
    fn empty_selection_list_is_allowed() {
        let answer = UserAnswer::new("q-1", vec![]).unwrap();
        assert!(answer.selections().is_empty());
    }
}
