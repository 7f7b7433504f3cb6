use serde::{Deserialize, Serialize};
use time::Date;

use super::DbId;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Instructor {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub hire_date: Option<Date>,
}
