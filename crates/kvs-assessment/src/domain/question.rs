//! Question model: three polymorphic variants behind one scoring contract.

use std::fmt;

use super::{DomainError, UserAnswer};

/// Maximum number of answer variants a selection question may carry.
pub const MAX_VARIANTS: usize = 4;

/// Question variant tag.
///
/// The string tokens are part of the storage layout and the wire DTO, so
/// they must stay bit-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    SingleSelection,
    MultiSelection,
    TrueOrFalse,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleSelection => "single selection",
            QuestionType::MultiSelection => "multi selection",
            QuestionType::TrueOrFalse => "true or false",
        }
    }

    /// Parses the storage token back into a tag.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "single selection" => Some(QuestionType::SingleSelection),
            "multi selection" => Some(QuestionType::MultiSelection),
            "true or false" => Some(QuestionType::TrueOrFalse),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one correct variant; a correct answer selects it and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelectionQuestion {
    id: String,
    topic: String,
    subject: String,
    variants: Vec<String>,
    correct_answer: String,
}

impl SingleSelectionQuestion {
    fn is_answer_correct(&self, answer: &UserAnswer) -> bool {
        let selections = answer.selections();
        if selections.len() != 1 {
            return false;
        }
        self.correct_answer == selections[0]
    }
}

/// One or more correct variants; the selection set must equal the correct set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelectionQuestion {
    id: String,
    topic: String,
    subject: String,
    variants: Vec<String>,
    correct_answers: Vec<String>,
}

impl MultiSelectionQuestion {
    // Count-sensitive comparison: a duplicated selection must not stand in
    // for a missing correct answer.
    fn is_answer_correct(&self, answer: &UserAnswer) -> bool {
        let selections = answer.selections();
        if selections.len() != self.correct_answers.len() {
            return false;
        }

        let mut correct: Vec<&str> = self.correct_answers.iter().map(String::as_str).collect();
        correct.sort_unstable();

        let mut selected: Vec<&str> = selections.iter().map(String::as_str).collect();
        selected.sort_unstable();

        correct == selected
    }
}

/// Boolean question; user input is matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueOrFalseQuestion {
    id: String,
    topic: String,
    subject: String,
    correct_answer: bool,
}

impl TrueOrFalseQuestion {
    const VARIANTS: [&'static str; 2] = ["true", "false"];

    fn is_answer_correct(&self, answer: &UserAnswer) -> bool {
        let selections = answer.selections();
        if selections.len() != 1 {
            return false;
        }

        let expected = if self.correct_answer { "true" } else { "false" };
        selections[0].eq_ignore_ascii_case(expected)
    }
}

/// A question from the bank, immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Single(SingleSelectionQuestion),
    Multi(MultiSelectionQuestion),
    TrueOrFalse(TrueOrFalseQuestion),
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::Single(q) => &q.id,
            Question::Multi(q) => &q.id,
            Question::TrueOrFalse(q) => &q.id,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::Single(_) => QuestionType::SingleSelection,
            Question::Multi(_) => QuestionType::MultiSelection,
            Question::TrueOrFalse(_) => QuestionType::TrueOrFalse,
        }
    }

    pub fn topic(&self) -> &str {
        match self {
            Question::Single(q) => &q.topic,
            Question::Multi(q) => &q.topic,
            Question::TrueOrFalse(q) => &q.topic,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            Question::Single(q) => &q.subject,
            Question::Multi(q) => &q.subject,
            Question::TrueOrFalse(q) => &q.subject,
        }
    }

    pub fn variants(&self) -> Vec<String> {
        match self {
            Question::Single(q) => q.variants.clone(),
            Question::Multi(q) => q.variants.clone(),
            Question::TrueOrFalse(_) => TrueOrFalseQuestion::VARIANTS
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }

    /// Applies the variant's own correctness predicate.
    pub fn is_answer_correct(&self, answer: &UserAnswer) -> bool {
        match self {
            Question::Single(q) => q.is_answer_correct(answer),
            Question::Multi(q) => q.is_answer_correct(answer),
            Question::TrueOrFalse(q) => q.is_answer_correct(answer),
        }
    }
}

/// Validates inputs and constructs the matching question variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFactory;

impl QuestionFactory {
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// - `InvalidParam` on empty id/topic/subject, variant overflow, or a
    ///   correct-answer count the variant does not allow
    pub fn create(
        &self,
        id: impl Into<String>,
        question_type: QuestionType,
        topic: impl Into<String>,
        subject: impl Into<String>,
        variants: Vec<String>,
        correct_answers: Vec<String>,
    ) -> Result<Question, DomainError> {
        let id = id.into();
        let topic = topic.into();
        let subject = subject.into();

        if id.is_empty() {
            return Err(DomainError::invalid_param("invalid id"));
        }
        if topic.is_empty() {
            return Err(DomainError::invalid_param("topic is empty"));
        }
        if subject.is_empty() {
            return Err(DomainError::invalid_param("subject is empty"));
        }

        match question_type {
            QuestionType::SingleSelection => {
                if variants.len() > MAX_VARIANTS {
                    return Err(DomainError::invalid_param(format!(
                        "variants count must not exceed {MAX_VARIANTS}"
                    )));
                }
                if correct_answers.len() != 1 {
                    return Err(DomainError::invalid_param(
                        "only one correct answer for this question type",
                    ));
                }

                let mut correct_answers = correct_answers;
                Ok(Question::Single(SingleSelectionQuestion {
                    id,
                    topic,
                    subject,
                    variants,
                    correct_answer: correct_answers.remove(0),
                }))
            }

            QuestionType::MultiSelection => {
                if variants.len() > MAX_VARIANTS {
                    return Err(DomainError::invalid_param(format!(
                        "variants count must not exceed {MAX_VARIANTS}"
                    )));
                }
                if correct_answers.is_empty() {
                    return Err(DomainError::invalid_param(
                        "minimum one correct answer for multi selection question",
                    ));
                }

                Ok(Question::Multi(MultiSelectionQuestion {
                    id,
                    topic,
                    subject,
                    variants,
                    correct_answers,
                }))
            }

            QuestionType::TrueOrFalse => {
                if correct_answers.len() != 1 {
                    return Err(DomainError::invalid_param(
                        "only one correct answer for this question type",
                    ));
                }

                // Unrecognised text leaves the stored truth value false.
                let correct_answer = correct_answers[0].eq_ignore_ascii_case("true");
                Ok(Question::TrueOrFalse(TrueOrFalseQuestion {
                    id,
                    topic,
                    subject,
                    correct_answer,
                }))
            }
        }
    }
}
