use sqlx::{Error, Executor, Sqlite, Transaction};
use time::PrimitiveDateTime;

use crate::db::models::{
    DbId, Session, SessionDetails, SessionFilter, SessionRecord, SessionStatistics, SessionStatus,
    SessionType,
};

const SESSION_COLUMNS: &str = r#"
    s.id, s.session_type, s.start_date_time, s.end_date_time, s.status,
    s.instructor_feedback, s.instructor_id, s.trainee_id
"#;

// Display names and roster size on top of the bare columns.
const DETAILS_SELECT: &str = r#"
    SELECT
        s.id, s.session_type, s.start_date_time, s.end_date_time, s.status,
        s.instructor_feedback, s.instructor_id, s.trainee_id,
        i.first_name || ' ' || i.last_name AS instructor_name,
        t.first_name || ' ' || t.last_name AS trainee_name,
        (SELECT COUNT(*) FROM session_enrollments e WHERE e.session_id = s.id) AS trainee_count
    FROM sessions s
    LEFT JOIN instructors i ON i.id = s.instructor_id
    LEFT JOIN trainees t ON t.id = s.trainee_id
"#;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        record: &SessionRecord,
    ) -> Result<DbId, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (session_type, start_date_time, end_date_time, status,
                instructor_feedback, instructor_id, trainee_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.session_type)
        .bind(record.start_date_time)
        .bind(record.end_date_time)
        .bind(record.status)
        .bind(record.instructor_feedback.as_deref())
        .bind(record.instructor_id)
        .bind(record.trainee_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: DbId,
        record: &SessionRecord,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE sessions SET
                session_type = ?,
                start_date_time = ?,
                end_date_time = ?,
                status = ?,
                instructor_feedback = ?,
                instructor_id = ?,
                trainee_id = ?
            WHERE id = ?
            "#,
        )
        .bind(record.session_type)
        .bind(record.start_date_time)
        .bind(record.end_date_time)
        .bind(record.status)
        .bind(record.instructor_feedback.as_deref())
        .bind(record.instructor_id)
        .bind(record.trainee_id)
        .bind(session_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn update_status(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: DbId,
        status: SessionStatus,
        instructor_feedback: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE sessions SET status = ?, instructor_feedback = ? WHERE id = ?")
            .bind(status)
            .bind(instructor_feedback)
            .bind(session_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Enrollment rows go with the session through `ON DELETE CASCADE`.
    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, session_id: DbId) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(executor: E, session_id: DbId) -> Result<Option<Session>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions s WHERE s.id = ?");
        sqlx::query_as::<_, Session>(&sql)
            .bind(session_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_details_by_id<'e, E>(
        executor: E,
        session_id: DbId,
    ) -> Result<Option<SessionDetails>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{DETAILS_SELECT} WHERE s.id = ?");
        sqlx::query_as::<_, SessionDetails>(&sql)
            .bind(session_id)
            .fetch_optional(executor)
            .await
    }

    /// Sessions matching `filter`, newest start first.
    pub async fn list<'e, E>(executor: E, filter: SessionFilter) -> Result<Vec<SessionDetails>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let where_clause = match filter {
            SessionFilter::All => "",
            SessionFilter::Type(_) => "WHERE s.session_type = ?",
            SessionFilter::Status(_) => "WHERE s.status = ?",
            SessionFilter::Instructor(_) => "WHERE s.instructor_id = ?",
            SessionFilter::Trainee(_) => {
                "WHERE s.trainee_id = ?
                    OR s.id IN (SELECT session_id FROM session_enrollments WHERE trainee_id = ?)"
            }
        };
        let sql = format!("{DETAILS_SELECT} {where_clause} ORDER BY s.start_date_time DESC, s.id DESC");

        let query = sqlx::query_as::<_, SessionDetails>(&sql);
        let query = match filter {
            SessionFilter::All => query,
            SessionFilter::Type(session_type) => query.bind(session_type),
            SessionFilter::Status(status) => query.bind(status),
            SessionFilter::Instructor(instructor_id) => query.bind(instructor_id),
            SessionFilter::Trainee(trainee_id) => query.bind(trainee_id).bind(trainee_id),
        };
        query.fetch_all(executor).await
    }

    /// Scheduled sessions starting strictly after `now`, soonest first.
    pub async fn upcoming<'e, E>(
        executor: E,
        now: PrimitiveDateTime,
        limit: i64,
    ) -> Result<Vec<SessionDetails>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{DETAILS_SELECT} WHERE s.status = ? AND s.start_date_time > ?
             ORDER BY s.start_date_time ASC, s.id ASC LIMIT ?"
        );
        sqlx::query_as::<_, SessionDetails>(&sql)
            .bind(SessionStatus::Scheduled)
            .bind(now)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    pub async fn count_upcoming<'e, E>(executor: E, now: PrimitiveDateTime) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE status = ? AND start_date_time > ?")
            .bind(SessionStatus::Scheduled)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn statistics<'e, E>(executor: E) -> Result<SessionStatistics, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, SessionStatistics>(
            r#"
            SELECT
                COUNT(*) AS total_sessions,
                COALESCE(SUM(CASE WHEN status = 'Scheduled' THEN 1 ELSE 0 END), 0) AS scheduled_sessions,
                COALESCE(SUM(CASE WHEN status = 'Completed' THEN 1 ELSE 0 END), 0) AS completed_sessions,
                COALESCE(SUM(CASE WHEN session_type = 'Practical' THEN 1 ELSE 0 END), 0) AS practical_sessions,
                COALESCE(SUM(CASE WHEN session_type = 'Theoretical' THEN 1 ELSE 0 END), 0) AS theoretical_sessions
            FROM sessions
            "#,
        )
        .fetch_one(executor)
        .await
    }

    pub async fn completed_practical_for_trainee<'e, E>(
        executor: E,
        trainee_id: DbId,
    ) -> Result<Vec<Session>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions s
             WHERE s.trainee_id = ? AND s.session_type = ? AND s.status = ?
             ORDER BY s.start_date_time"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(trainee_id)
            .bind(SessionType::Practical)
            .bind(SessionStatus::Completed)
            .fetch_all(executor)
            .await
    }

    /// Sessions of `instructor_id` (or, when given, practical sessions of
    /// `trainee_id`) whose time range intersects `[start, end)`.
    pub async fn count_overlapping<'e, E>(
        executor: E,
        instructor_id: DbId,
        trainee_id: Option<DbId>,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_session_id: Option<DbId>,
    ) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sessions
            WHERE start_date_time < ?
              AND end_date_time > ?
              AND (? IS NULL OR id != ?)
              AND (instructor_id = ? OR (? IS NOT NULL AND trainee_id = ?))
            "#,
        )
        .bind(end)
        .bind(start)
        .bind(exclude_session_id)
        .bind(exclude_session_id)
        .bind(instructor_id)
        .bind(trainee_id)
        .bind(trainee_id)
        .fetch_one(executor)
        .await
    }
}
