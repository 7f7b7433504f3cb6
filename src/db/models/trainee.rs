use serde::{Deserialize, Serialize};
use time::Date;

use super::DbId;

pub const TRAINEE_STATUS_ACTIVE: &str = "Active";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Trainee {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub enrollment_date: Date,
    pub license_category: Option<String>,
    pub status: String,
    pub assigned_instructor_id: Option<DbId>,
}
