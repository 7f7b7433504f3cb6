use sqlx::{Error, Executor, Sqlite};
use time::Date;

use crate::db::models::{DbId, Exam, EXAM_STATUS_PASSED, EXAM_STATUS_SCHEDULED};

pub struct ExamRepository;

impl ExamRepository {
    /// A trainee's exams, soonest first.
    pub async fn find_by_trainee<'e, E>(executor: E, trainee_id: DbId) -> Result<Vec<Exam>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, exam_type, scheduled_date, status, trainee_id
            FROM exams
            WHERE trainee_id = ?
            ORDER BY scheduled_date ASC, id ASC
            "#,
        )
        .bind(trainee_id)
        .fetch_all(executor)
        .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM exams")
            .fetch_one(executor)
            .await
    }

    pub async fn count_passed<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM exams WHERE status = ?")
            .bind(EXAM_STATUS_PASSED)
            .fetch_one(executor)
            .await
    }

    /// Scheduled exams on or after `today`.
    pub async fn count_upcoming<'e, E>(executor: E, today: Date) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM exams WHERE status = ? AND scheduled_date >= ?")
            .bind(EXAM_STATUS_SCHEDULED)
            .bind(today)
            .fetch_one(executor)
            .await
    }
}
