//! PostgreSQL question bank: topics, the ranked sampler, and id lookup.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::domain::{DomainError, Question, QuestionFactory, QuestionType};
use crate::ports::QuestionStore;

/// Default per-(topic, variant) draw size.
pub const DEFAULT_PER_PARTITION_LIMIT: i64 = 10;

/// Ranked, usage-balanced sampler over `kvs.questions`.
///
/// The draw and the usage accounting run in one statement: the CTE ranks
/// candidates per (topic, variant) partition by ascending usage with random
/// tie-breaks, increments `usage_count` for exactly the selected rows, and
/// returns them. Row-level locks taken by the update keep two concurrent
/// draws from double-counting the same rows.
#[derive(Clone)]
pub struct PostgresQuestionStore {
    pool: PgPool,
    per_partition_limit: i64,
    factory: QuestionFactory,
}

impl PostgresQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            per_partition_limit: DEFAULT_PER_PARTITION_LIMIT,
            factory: QuestionFactory::new(),
        }
    }

    pub fn with_per_partition_limit(mut self, limit: i64) -> Self {
        self.per_partition_limit = limit;
        self
    }

    fn row_to_question(&self, row: &sqlx::postgres::PgRow) -> Result<Question, DomainError> {
        let question_id: String = row
            .try_get("question_id")
            .map_err(|e| DomainError::internal(format!("scan question_id failure: {e}")))?;
        let type_token: String = row
            .try_get("question_type")
            .map_err(|e| DomainError::internal(format!("scan question_type failure: {e}")))?;
        let topic: String = row
            .try_get("topic")
            .map_err(|e| DomainError::internal(format!("scan topic failure: {e}")))?;
        let subject: String = row
            .try_get("subject")
            .map_err(|e| DomainError::internal(format!("scan subject failure: {e}")))?;
        let variants: Vec<String> = row
            .try_get("variants")
            .map_err(|e| DomainError::internal(format!("scan variants failure: {e}")))?;
        let correct_answers: Vec<String> = row
            .try_get("correct_answers")
            .map_err(|e| DomainError::internal(format!("scan correct_answers failure: {e}")))?;

        let question_type = QuestionType::parse(&type_token).ok_or_else(|| {
            DomainError::internal(format!("unknown question type: {type_token}"))
        })?;

        self.factory
            .create(
                question_id,
                question_type,
                topic,
                subject,
                variants,
                correct_answers,
            )
            .map_err(|e| DomainError::internal(format!("creating question failure: {e}")))
    }
}

#[async_trait]
impl QuestionStore for PostgresQuestionStore {
    async fn get_topics(&self) -> Result<Vec<String>, DomainError> {
        info!("GetTopics started");

        let rows = sqlx::query("SELECT t.name FROM kvs.topics t")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("getting topic names failure: {e}")))?;

        let topics = rows
            .iter()
            .map(|row| {
                row.try_get("name")
                    .map_err(|e| DomainError::internal(format!("scan topic name failure: {e}")))
            })
            .collect::<Result<Vec<String>, DomainError>>()?;

        info!("GetTopics completed");
        Ok(topics)
    }

    async fn select_questions(&self, topics: &[String]) -> Result<Vec<Question>, DomainError> {
        info!(?topics, "GetQuestions started");

        let rows = sqlx::query(
            r#"
            WITH ranked_questions AS (
                SELECT
                    q.question_id,
                    qt.name AS question_type,
                    t.name AS topic,
                    q.subject,
                    q.variants,
                    q.correct_answers,
                    ROW_NUMBER() OVER (
                        PARTITION BY q.topic_id, q.question_type_id
                        ORDER BY q.usage_count ASC, RANDOM()
                    ) AS rn
                FROM kvs.questions q
                JOIN kvs.topics t ON q.topic_id = t.topic_id
                JOIN kvs.question_types qt ON q.question_type_id = qt.id
                WHERE t.name = ANY($1)
            ),
            to_update AS (
                SELECT question_id
                FROM ranked_questions
                WHERE rn <= $2
            ),
            updated AS (
                UPDATE kvs.questions
                SET usage_count = usage_count + 1
                WHERE question_id IN (SELECT question_id FROM to_update)
                RETURNING question_id
            )
            SELECT
                rq.question_id,
                rq.question_type,
                rq.topic,
                rq.subject,
                rq.variants,
                rq.correct_answers
            FROM ranked_questions rq
            JOIN updated u ON rq.question_id = u.question_id
            ORDER BY rq.topic, rq.question_type
            "#,
        )
        .bind(topics)
        .bind(self.per_partition_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("get questions from db failure: {e}")))?;

        let questions = rows
            .iter()
            .map(|row| self.row_to_question(row))
            .collect::<Result<Vec<Question>, DomainError>>()?;

        info!(count = questions.len(), "GetQuestions completed");
        Ok(questions)
    }

    async fn get_questions_by_ids(&self, ids: &[String]) -> Result<Vec<Question>, DomainError> {
        info!(count = ids.len(), "GetQuestionsByIDs started");

        let rows = sqlx::query(
            r#"
            SELECT
                q.question_id,
                qt.name AS question_type,
                t.name AS topic,
                q.subject,
                q.variants,
                q.correct_answers
            FROM kvs.questions q
            JOIN kvs.question_types qt ON q.question_type_id = qt.id
            JOIN kvs.topics t ON q.topic_id = t.topic_id
            WHERE q.question_id = ANY($1)
            ORDER BY q.question_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("get questions from db failure: {e}")))?;

        let questions = rows
            .iter()
            .map(|row| self.row_to_question(row))
            .collect::<Result<Vec<Question>, DomainError>>()?;

        info!("GetQuestionsByIDs completed");
        Ok(questions)
    }
}
