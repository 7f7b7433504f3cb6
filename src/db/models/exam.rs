use serde::{Deserialize, Serialize};
use time::Date;

use super::DbId;

pub const EXAM_STATUS_SCHEDULED: &str = "Scheduled";
pub const EXAM_STATUS_PASSED: &str = "Passed";
/// Status counted by the instructor pass-rate report.
pub const EXAM_STATUS_COMPLETED: &str = "Completed";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: DbId,
    pub exam_type: String,
    pub scheduled_date: Date,
    pub status: String,
    pub trainee_id: DbId,
}

impl Exam {
    /// Scheduled and not yet past; today counts as upcoming.
    pub fn is_upcoming(&self, today: Date) -> bool {
        self.status == EXAM_STATUS_SCHEDULED && self.scheduled_date >= today
    }

    pub fn is_passed(&self) -> bool {
        self.status == EXAM_STATUS_PASSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn exam(status: &str, scheduled_date: Date) -> Exam {
        Exam {
            id: 1,
            exam_type: "Driving".to_string(),
            scheduled_date,
            status: status.to_string(),
            trainee_id: 1,
        }
    }

    #[test]
    fn exam_scheduled_today_is_upcoming() {
        let today = date!(2026 - 10 - 16);
        assert!(exam("Scheduled", today).is_upcoming(today));
        assert!(!exam("Scheduled", date!(2026 - 10 - 15)).is_upcoming(today));
        assert!(!exam("Passed", date!(2026 - 10 - 20)).is_upcoming(today));
    }
}
