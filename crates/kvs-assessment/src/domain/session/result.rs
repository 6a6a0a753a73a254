//! Graded outcome of a completed session.

use std::collections::HashMap;

/// Result of a completed session.
///
/// `is_success` and `grade` are what the user sees; the identifying fields
/// travel with the result when it is packaged for the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub user_id: String,
    pub topics: Vec<String>,
    /// Question id → presented variants.
    pub questions: HashMap<String, Vec<String>>,
    /// Question id → user selections.
    pub user_answers: HashMap<String, Vec<String>>,
    pub is_expired: bool,
    pub is_success: bool,
    /// `"XX.XX percents"`, or `"session expired"`.
    pub grade: String,
}
