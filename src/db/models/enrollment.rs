use serde::{Deserialize, Serialize};

use super::DbId;

/// One trainee's seat in a theoretical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub trainee_id: DbId,
    pub session_id: DbId,
}
