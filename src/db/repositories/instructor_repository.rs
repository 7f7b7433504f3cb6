use sqlx::{Error, Executor, Sqlite};

use crate::db::models::{DbId, Instructor};

pub struct InstructorRepository;

impl InstructorRepository {
    pub async fn exists<'e, E>(executor: E, instructor_id: DbId) -> Result<bool, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM instructors WHERE id = ?)")
            .bind(instructor_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(
        executor: E,
        instructor_id: DbId,
    ) -> Result<Option<Instructor>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Instructor>(
            "SELECT id, first_name, last_name, phone, hire_date FROM instructors WHERE id = ?",
        )
        .bind(instructor_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM instructors")
            .fetch_one(executor)
            .await
    }
}
