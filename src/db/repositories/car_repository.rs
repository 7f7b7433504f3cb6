use sqlx::{Error, Executor, Sqlite};

pub struct CarRepository;

impl CarRepository {
    pub async fn count<'e, E>(executor: E) -> Result<i64, Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(executor)
            .await
    }
}
