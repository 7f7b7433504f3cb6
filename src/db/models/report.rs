use serde::{Deserialize, Serialize};
use time::Date;

use super::DbId;

/// The four operational reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    AboveAverageSessions,
    TopInstructors,
    MostActiveInstructors,
    BehindSchedule,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::AboveAverageSessions,
        ReportKind::TopInstructors,
        ReportKind::MostActiveInstructors,
        ReportKind::BehindSchedule,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::AboveAverageSessions => "above-average-sessions",
            ReportKind::TopInstructors => "top-instructors",
            ReportKind::MostActiveInstructors => "most-active-instructors",
            ReportKind::BehindSchedule => "behind-schedule",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::AboveAverageSessions => "Trainees with Above-Average Sessions",
            ReportKind::TopInstructors => "Top Instructors by Student Pass Rate",
            ReportKind::MostActiveInstructors => "Most Active Instructors (by Sessions)",
            ReportKind::BehindSchedule => "Trainees Behind Schedule",
        }
    }

    pub fn from_slug(slug: &str) -> Option<ReportKind> {
        ReportKind::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

/// Rows that passed a comparison against a population mean, together with
/// the mean that was used. No mean means no qualifying population and no rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport<T> {
    pub average: Option<f64>,
    pub rows: Vec<T>,
}

impl<T> ThresholdReport<T> {
    pub fn empty() -> Self {
        Self {
            average: None,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TraineeSessionCount {
    pub trainee_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub completed_sessions: i64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct InstructorPassRate {
    pub instructor_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub total_students: i64,
    pub passed_exams: i64,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct InstructorSessionLoad {
    pub instructor_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub session_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TraineeScheduleDeviation {
    pub trainee_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub enrollment_date: Date,
    pub days_enrolled: i64,
    pub completed_sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", content = "result", rename_all = "kebab-case")]
pub enum ReportOutput {
    AboveAverageSessions(ThresholdReport<TraineeSessionCount>),
    TopInstructors(Vec<InstructorPassRate>),
    MostActiveInstructors(ThresholdReport<InstructorSessionLoad>),
    BehindSchedule(ThresholdReport<TraineeScheduleDeviation>),
}

impl ReportOutput {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportOutput::AboveAverageSessions(_) => ReportKind::AboveAverageSessions,
            ReportOutput::TopInstructors(_) => ReportKind::TopInstructors,
            ReportOutput::MostActiveInstructors(_) => ReportKind::MostActiveInstructors,
            ReportOutput::BehindSchedule(_) => ReportKind::BehindSchedule,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ReportOutput::AboveAverageSessions(report) => report.rows.len(),
            ReportOutput::TopInstructors(rows) => rows.len(),
            ReportOutput::MostActiveInstructors(report) => report.rows.len(),
            ReportOutput::BehindSchedule(report) => report.rows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ReportKind::from_slug("most-utilized-cars"), None);
    }
}
