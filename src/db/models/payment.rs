use serde::{Deserialize, Serialize};
use time::Date;

use super::DbId;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: DbId,
    pub amount: f64,
    pub payment_date: Date,
    pub payment_method: Option<String>,
    pub details: Option<String>,
    pub trainee_id: DbId,
}
