use sqlx::{Error, Executor, Sqlite};
use time::Date;

use crate::db::models::{
    InstructorPassRate, InstructorSessionLoad, TraineeScheduleDeviation, TraineeSessionCount,
    EXAM_STATUS_COMPLETED, TRAINEE_STATUS_ACTIVE,
};

/// Set-based aggregations behind the operational reports.
///
/// Threshold reports are split in two queries: the population mean, then the
/// rows compared against it. Run both on the same transaction to read one
/// snapshot. The means only cover entities with at least one counted session,
/// so they are computed over grouped rows of `sessions`, never over the full
/// entity table.
pub struct ReportsRepository;

impl ReportsRepository {
    /// Mean completed practical sessions over trainees that have at least one.
    pub async fn average_completed_practical<'e, E>(executor: E) -> Result<Option<f64>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            r#"
            SELECT AVG(CAST(session_count AS REAL))
            FROM (
                SELECT COUNT(id) AS session_count
                FROM sessions
                WHERE status = 'Completed' AND session_type = 'Practical'
                GROUP BY trainee_id
            )
            "#,
        )
        .fetch_one(executor)
        .await
    }

    /// Every trainee whose completed practical count is strictly above
    /// `threshold`, trainees without sessions counted as zero.
    pub async fn trainees_above<'e, E>(
        executor: E,
        threshold: f64,
    ) -> Result<Vec<TraineeSessionCount>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TraineeSessionCount>(
            r#"
            SELECT
                t.id AS trainee_id,
                t.first_name,
                t.last_name,
                COUNT(s.id) AS completed_sessions
            FROM trainees t
            LEFT JOIN sessions s ON s.trainee_id = t.id
                AND s.status = 'Completed'
                AND s.session_type = 'Practical'
            GROUP BY t.id, t.first_name, t.last_name
            HAVING COUNT(s.id) > ?
            ORDER BY completed_sessions DESC, t.id ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(executor)
        .await
    }

    /// Instructors with at least one assigned trainee, ranked by the share of
    /// completed exams per assigned trainee.
    pub async fn instructor_pass_rates<'e, E>(executor: E) -> Result<Vec<InstructorPassRate>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, InstructorPassRate>(
            r#"
            WITH roster AS (
                SELECT assigned_instructor_id AS instructor_id,
                       COUNT(DISTINCT id) AS total_students
                FROM trainees
                WHERE assigned_instructor_id IS NOT NULL
                GROUP BY assigned_instructor_id
            ),
            passed AS (
                SELECT t.assigned_instructor_id AS instructor_id,
                       COUNT(e.id) AS passed_exams
                FROM exams e
                JOIN trainees t ON t.id = e.trainee_id
                WHERE e.status = ? AND t.assigned_instructor_id IS NOT NULL
                GROUP BY t.assigned_instructor_id
            ),
            rated AS (
                SELECT
                    i.id AS instructor_id,
                    i.first_name,
                    i.last_name,
                    r.total_students,
                    COALESCE(p.passed_exams, 0) AS passed_exams,
                    CASE
                        WHEN r.total_students > 0
                        THEN CAST(COALESCE(p.passed_exams, 0) AS REAL) * 100.0 / r.total_students
                        ELSE 0.0
                    END AS pass_rate
                FROM instructors i
                JOIN roster r ON r.instructor_id = i.id
                LEFT JOIN passed p ON p.instructor_id = i.id
                WHERE r.total_students > 0
            )
            SELECT instructor_id, first_name, last_name, total_students, passed_exams, pass_rate
            FROM rated
            ORDER BY pass_rate DESC, passed_exams DESC, instructor_id ASC
            "#,
        )
        .bind(EXAM_STATUS_COMPLETED)
        .fetch_all(executor)
        .await
    }

    /// Mean session count over instructors that taught at least one session.
    pub async fn average_instructor_sessions<'e, E>(executor: E) -> Result<Option<f64>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            r#"
            SELECT AVG(CAST(session_count AS REAL))
            FROM (
                SELECT COUNT(id) AS session_count
                FROM sessions
                GROUP BY instructor_id
            )
            "#,
        )
        .fetch_one(executor)
        .await
    }

    pub async fn instructors_above<'e, E>(
        executor: E,
        threshold: f64,
    ) -> Result<Vec<InstructorSessionLoad>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, InstructorSessionLoad>(
            r#"
            SELECT
                i.id AS instructor_id,
                i.first_name,
                i.last_name,
                COUNT(s.id) AS session_count
            FROM instructors i
            LEFT JOIN sessions s ON s.instructor_id = i.id
            GROUP BY i.id, i.first_name, i.last_name
            HAVING COUNT(s.id) > ?
            ORDER BY session_count DESC, i.id ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(executor)
        .await
    }

    /// Mean completed practical sessions over active trainees enrolled on or
    /// before `enrolled_by` that have at least one such session.
    pub async fn average_tenured_progress<'e, E>(
        executor: E,
        enrolled_by: Date,
    ) -> Result<Option<f64>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            r#"
            SELECT AVG(CAST(session_count AS REAL))
            FROM (
                SELECT COUNT(s.id) AS session_count
                FROM trainees t
                JOIN sessions s ON s.trainee_id = t.id
                WHERE s.status = 'Completed'
                  AND s.session_type = 'Practical'
                  AND t.status = ?
                  AND t.enrollment_date <= ?
                GROUP BY t.id
            )
            "#,
        )
        .bind(TRAINEE_STATUS_ACTIVE)
        .bind(enrolled_by)
        .fetch_one(executor)
        .await
    }

    /// Active trainees enrolled on or before `enrolled_by` whose completed
    /// practical count is strictly below `threshold`, most behind first.
    pub async fn trainees_below<'e, E>(
        executor: E,
        today: Date,
        enrolled_by: Date,
        threshold: f64,
    ) -> Result<Vec<TraineeScheduleDeviation>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TraineeScheduleDeviation>(
            r#"
            SELECT
                t.id AS trainee_id,
                t.first_name,
                t.last_name,
                t.enrollment_date,
                CAST(julianday(?) - julianday(t.enrollment_date) AS INTEGER) AS days_enrolled,
                COUNT(s.id) AS completed_sessions
            FROM trainees t
            LEFT JOIN sessions s ON s.trainee_id = t.id
                AND s.status = 'Completed'
                AND s.session_type = 'Practical'
            WHERE t.status = ?
              AND t.enrollment_date <= ?
            GROUP BY t.id, t.first_name, t.last_name, t.enrollment_date
            HAVING COUNT(s.id) < ?
            ORDER BY completed_sessions ASC, t.id ASC
            "#,
        )
        .bind(today)
        .bind(TRAINEE_STATUS_ACTIVE)
        .bind(enrolled_by)
        .bind(threshold)
        .fetch_all(executor)
        .await
    }
}
