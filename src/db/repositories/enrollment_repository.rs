use sqlx::{Error, Executor, Sqlite, Transaction};

use crate::db::models::{DbId, Enrollment};

/// Join-table access for theoretical session rosters. Callers validate
/// trainee and session ids before calling in.
pub struct EnrollmentRepository;

impl EnrollmentRepository {
    pub async fn add(tx: &mut Transaction<'_, Sqlite>, enrollment: Enrollment) -> Result<(), Error> {
        sqlx::query("INSERT INTO session_enrollments (trainee_id, session_id) VALUES (?, ?)")
            .bind(enrollment.trainee_id)
            .bind(enrollment.session_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn remove(tx: &mut Transaction<'_, Sqlite>, enrollment: Enrollment) -> Result<(), Error> {
        sqlx::query("DELETE FROM session_enrollments WHERE trainee_id = ? AND session_id = ?")
            .bind(enrollment.trainee_id)
            .bind(enrollment.session_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Roster of a session in enrollment order.
    pub async fn list_trainee_ids_for_session<'e, E>(
        executor: E,
        session_id: DbId,
    ) -> Result<Vec<DbId>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT trainee_id FROM session_enrollments WHERE session_id = ? ORDER BY rowid")
            .bind(session_id)
            .fetch_all(executor)
            .await
    }
}
