use sqlx::{Error, Executor, Sqlite};
use time::Date;

use crate::db::models::{DbId, Payment};

const PAYMENT_COLUMNS: &str = "id, amount, payment_date, payment_method, details, trainee_id";

pub struct PaymentRepository;

impl PaymentRepository {
    /// A trainee's payments, most recent first.
    pub async fn find_by_trainee<'e, E>(executor: E, trainee_id: DbId) -> Result<Vec<Payment>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE trainee_id = ?
             ORDER BY payment_date DESC, id DESC"
        );
        sqlx::query_as::<_, Payment>(&sql)
            .bind(trainee_id)
            .fetch_all(executor)
            .await
    }

    pub async fn recent<'e, E>(executor: E, limit: i64) -> Result<Vec<Payment>, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY payment_date DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, Payment>(&sql)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    pub async fn total_revenue<'e, E>(executor: E) -> Result<f64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM payments")
            .fetch_one(executor)
            .await
    }

    /// Sum of payments dated on or after `since`.
    pub async fn revenue_since<'e, E>(executor: E, since: Date) -> Result<f64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM payments WHERE payment_date >= ?",
        )
        .bind(since)
        .fetch_one(executor)
        .await
    }
}
