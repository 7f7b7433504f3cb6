use sqlx::{Error, Executor, Sqlite};

use crate::db::models::{DbId, Trainee, TRAINEE_STATUS_ACTIVE};

const TRAINEE_COLUMNS: &str = r#"
    id, first_name, last_name, phone, enrollment_date, license_category, status,
    assigned_instructor_id
"#;

/// Read-only access to trainee records, which are maintained elsewhere.
pub struct TraineeRepository;

impl TraineeRepository {
    pub async fn exists<'e, E>(executor: E, trainee_id: DbId) -> Result<bool, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM trainees WHERE id = ?)")
            .bind(trainee_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, trainee_id: DbId) -> Result<Option<Trainee>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {TRAINEE_COLUMNS} FROM trainees WHERE id = ?");
        sqlx::query_as::<_, Trainee>(&sql)
            .bind(trainee_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_instructor<'e, E>(
        executor: E,
        instructor_id: DbId,
    ) -> Result<Vec<Trainee>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {TRAINEE_COLUMNS} FROM trainees
             WHERE assigned_instructor_id = ?
             ORDER BY last_name, first_name, id"
        );
        sqlx::query_as::<_, Trainee>(&sql)
            .bind(instructor_id)
            .fetch_all(executor)
            .await
    }

    /// Most recently enrolled first.
    pub async fn recent_enrollments<'e, E>(executor: E, limit: i64) -> Result<Vec<Trainee>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {TRAINEE_COLUMNS} FROM trainees
             ORDER BY enrollment_date DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, Trainee>(&sql)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM trainees")
            .fetch_one(executor)
            .await
    }

    pub async fn count_active<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM trainees WHERE status = ?")
            .bind(TRAINEE_STATUS_ACTIVE)
            .fetch_one(executor)
            .await
    }
}
