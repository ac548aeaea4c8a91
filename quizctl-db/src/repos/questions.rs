//! Question repository
//!
//! Handles question CRUD with:
//! - Atomic creation of a question and its responses (transaction)
//! - Full-replace updates: the stored response set becomes exactly the supplied one
//! - Idempotent deletes, responses first
//! - Topic search with responses nested under each question

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use quizctl_core::{Question, QuestionId, Quiz, Response};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::DbError;

/// Question record from database
#[derive(Debug, Clone, FromRow)]
struct QuestionRow {
    id: QuestionId,
    content: String,
    quiz_id: i32,
}

impl QuestionRow {
    fn with_responses(self, responses: Vec<Response>) -> Question {
        Question {
            id: Some(self.id),
            content: self.content,
            quiz_id: self.quiz_id,
            responses,
        }
    }
}

/// Response record from database
#[derive(Debug, Clone, FromRow)]
struct ResponseRow {
    id: i32,
    text: String,
    correct: bool,
}

impl From<ResponseRow> for Response {
    fn from(row: ResponseRow) -> Self {
        Self {
            id: Some(row.id),
            text: row.text,
            correct: row.correct,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct QuizRow {
    id: i32,
    topic: String,
    difficulty: i32,
}

/// Result of [`QuestionRepo::delete_by_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The question existed and is gone, along with `responses` child rows.
    Deleted { responses: u64 },
    /// Nothing stored under that id. Not an error: deletes are idempotent.
    Absent,
}

/// Absolute cut-off for one operation.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    limit: Duration,
    at: Instant,
}

/// Run `fut`, giving up at `deadline` if one is set.
async fn bounded<T, F>(deadline: Option<Deadline>, op: &'static str, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match deadline {
        Some(Deadline { limit, at }) => tokio::time::timeout_at(at, fut).await.map_err(|_| {
            warn!(op, ?limit, "deadline elapsed before commit");
            DbError::Timeout(limit)
        })?,
        None => fut.await,
    }
}

/// Question repository
pub struct QuestionRepo<'a> {
    pool: &'a PgPool,
    deadline: Option<Duration>,
}

impl<'a> QuestionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            deadline: None,
        }
    }

    /// Bound every operation by `limit`.
    ///
    /// For writes the limit covers connection checkout and every statement
    /// up to, but not including, `COMMIT`. An elapsed deadline drops the open
    /// transaction, which rolls it back, so [`DbError::Timeout`] always means
    /// nothing was written. Once `COMMIT` is sent the outcome is reported as is.
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    fn start(&self) -> Option<Deadline> {
        self.deadline.map(|limit| Deadline {
            limit,
            at: Instant::now() + limit,
        })
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        bounded(self.start(), op, fut).await
    }

    async fn begin(
        &self,
        deadline: Option<Deadline>,
        op: &'static str,
    ) -> Result<Transaction<'static, Postgres>, DbError> {
        bounded(deadline, op, async { self.pool.begin().await.map_err(DbError::from) }).await
    }

    /// Create a question with its responses (atomic).
    ///
    /// On success the generated id is written to `question.id` and each
    /// response gets its own id. On any failure the entity is left untouched
    /// and nothing is persisted.
    #[instrument(skip_all, fields(quiz_id = question.quiz_id))]
    pub async fn create(&self, question: &mut Question) -> Result<QuestionId, DbError> {
        if let Some(id) = question.id {
            return Err(DbError::AlreadyPersisted(id));
        }
        question.validate()?;

        let deadline = self.start();
        let mut tx = self.begin(deadline, "create").await?;
        let (id, response_ids) =
            bounded(deadline, "create", insert_question(&mut tx, question)).await?;
        tx.commit().await?;

        question.id = Some(id);
        stamp_response_ids(question, response_ids);
        debug!(question_id = id, responses = question.responses.len(), "question created");
        Ok(id)
    }

    /// Overwrite content and quiz, then replace the whole response set.
    ///
    /// Prior response rows are deleted and the current ones inserted as
    /// fresh rows, so response ids change. The `UPDATE` takes the question's
    /// row lock first, which serializes concurrent updates of one question.
    ///
    /// # Errors
    ///
    /// - [`DbError::Unsaved`] if the question was never created
    /// - [`DbError::NotFound`] if no row has that id (nothing is changed)
    #[instrument(skip_all, fields(question_id = ?question.id))]
    pub async fn update(&self, question: &mut Question) -> Result<(), DbError> {
        let id = question.id.ok_or(DbError::Unsaved)?;
        question.validate()?;

        let deadline = self.start();
        let mut tx = self.begin(deadline, "update").await?;
        let response_ids =
            bounded(deadline, "update", replace_question(&mut tx, id, question)).await?;
        tx.commit().await?;

        stamp_response_ids(question, response_ids);
        debug!(question_id = id, responses = question.responses.len(), "question updated");
        Ok(())
    }

    /// Delete a question and its responses (atomic, idempotent).
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: QuestionId) -> Result<DeleteOutcome, DbError> {
        let deadline = self.start();
        let mut tx = self.begin(deadline, "delete").await?;
        let (responses, questions) =
            bounded(deadline, "delete", delete_question(&mut tx, id)).await?;
        tx.commit().await?;

        if questions == 0 {
            debug!(question_id = id, "delete target already absent");
            Ok(DeleteOutcome::Absent)
        } else {
            debug!(question_id = id, responses, "question deleted");
            Ok(DeleteOutcome::Deleted { responses })
        }
    }

    /// Get a single question with its responses.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: QuestionId) -> Result<Question, DbError> {
        self.run("find_by_id", async {
            let mut conn = self.pool.acquire().await?;

            let row: QuestionRow = sqlx::query_as(
                r#"
                SELECT id, content, quiz_id
                FROM question
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::question_not_found(id))?;

            let responses = fetch_responses(&mut conn, id).await?;
            Ok::<_, DbError>(row.with_responses(responses))
        })
        .await
    }

    /// Responses owned by a question, in insertion order.
    ///
    /// An unknown question simply has no responses.
    #[instrument(skip(self))]
    pub async fn responses_for(&self, id: QuestionId) -> Result<Vec<Response>, DbError> {
        self.run("responses_for", async {
            let mut conn = self.pool.acquire().await?;
            fetch_responses(&mut conn, id).await
        })
        .await
    }

    /// All questions belonging to quizzes with the given topic.
    ///
    /// Responses are fetched per question on the same connection (N+1).
    /// Fine for quiz-sized result sets; a joined query would be needed for
    /// large ones.
    #[instrument(skip(self))]
    pub async fn find_by_topic(&self, topic: &str) -> Result<Vec<Question>, DbError> {
        self.run("find_by_topic", async {
            let mut conn = self.pool.acquire().await?;
            let questions = fetch_questions_by_topic(&mut conn, topic).await?;
            debug!(topic, found = questions.len(), "topic search");
            Ok::<_, DbError>(questions)
        })
        .await
    }

    /// Quizzes with the given topic, each carrying its questions.
    ///
    /// Quizzes with no questions are included with an empty list.
    #[instrument(skip(self))]
    pub async fn find_quizzes_by_topic(&self, topic: &str) -> Result<Vec<Quiz>, DbError> {
        self.run("find_quizzes_by_topic", async {
            let mut conn = self.pool.acquire().await?;

            let quizzes: Vec<QuizRow> = sqlx::query_as(
                r#"
                SELECT id, topic, difficulty
                FROM quiz
                WHERE topic = $1
                ORDER BY id
                "#,
            )
            .bind(topic)
            .fetch_all(&mut *conn)
            .await?;

            let mut by_quiz: HashMap<i32, Vec<Question>> = HashMap::new();
            for question in fetch_questions_by_topic(&mut conn, topic).await? {
                by_quiz.entry(question.quiz_id).or_default().push(question);
            }

            let quizzes = quizzes
                .into_iter()
                .map(|row| Quiz {
                    questions: by_quiz.remove(&row.id).unwrap_or_default(),
                    id: row.id,
                    topic: row.topic,
                    difficulty: row.difficulty,
                })
                .collect::<Vec<_>>();
            Ok::<_, DbError>(quizzes)
        })
        .await
    }
}

async fn insert_question(
    conn: &mut PgConnection,
    question: &Question,
) -> Result<(QuestionId, Vec<i32>), DbError> {
    let id: QuestionId = sqlx::query_scalar(
        r#"
        INSERT INTO question (content, quiz_id)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&question.content)
    .bind(question.quiz_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::NoRowsAffected)?;

    let response_ids = insert_responses(conn, id, &question.responses).await?;
    Ok((id, response_ids))
}

async fn replace_question(
    conn: &mut PgConnection,
    id: QuestionId,
    question: &Question,
) -> Result<Vec<i32>, DbError> {
    let updated = sqlx::query(
        r#"
        UPDATE question
        SET content = $1, quiz_id = $2
        WHERE id = $3
        "#,
    )
    .bind(&question.content)
    .bind(question.quiz_id)
    .bind(id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        warn!(question_id = id, "update target missing");
        return Err(DbError::question_not_found(id));
    }

    let removed = sqlx::query("DELETE FROM response WHERE question_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let response_ids = insert_responses(conn, id, &question.responses).await?;
    debug!(question_id = id, removed, inserted = response_ids.len(), "responses replaced");
    Ok(response_ids)
}

/// Returns `(responses, questions)` rows removed.
async fn delete_question(conn: &mut PgConnection, id: QuestionId) -> Result<(u64, u64), DbError> {
    // children first so the foreign key never sees an orphan
    let responses = sqlx::query("DELETE FROM response WHERE question_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let questions = sqlx::query("DELETE FROM question WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok((responses, questions))
}

/// Insert responses in order, stamping `question_id`. Returns generated ids.
async fn insert_responses(
    conn: &mut PgConnection,
    question_id: QuestionId,
    responses: &[Response],
) -> Result<Vec<i32>, DbError> {
    let mut ids = Vec::with_capacity(responses.len());

    for response in responses {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO response (text, correct, question_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&response.text)
        .bind(response.correct)
        .bind(question_id)
        .fetch_one(&mut *conn)
        .await?;

        ids.push(id);
    }

    Ok(ids)
}

async fn fetch_responses(
    conn: &mut PgConnection,
    question_id: QuestionId,
) -> Result<Vec<Response>, DbError> {
    let rows: Vec<ResponseRow> = sqlx::query_as(
        r#"
        SELECT id, text, correct
        FROM response
        WHERE question_id = $1
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Response::from).collect())
}

async fn fetch_questions_by_topic(
    conn: &mut PgConnection,
    topic: &str,
) -> Result<Vec<Question>, DbError> {
    let rows: Vec<QuestionRow> = sqlx::query_as(
        r#"
        SELECT id, content, quiz_id
        FROM question
        WHERE quiz_id IN (SELECT id FROM quiz WHERE topic = $1)
        ORDER BY id
        "#,
    )
    .bind(topic)
    .fetch_all(&mut *conn)
    .await?;

    let mut questions = Vec::with_capacity(rows.len());
    for row in rows {
        let responses = fetch_responses(conn, row.id).await?;
        questions.push(row.with_responses(responses));
    }
    Ok(questions)
}

fn stamp_response_ids(question: &mut Question, ids: Vec<i32>) {
    for (response, id) in question.responses.iter_mut().zip(ids) {
        response.id = Some(id);
    }
}
