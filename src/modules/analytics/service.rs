use std::sync::Arc;

use sqlx::SqlitePool;
use time::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::db::models::{
    InstructorPassRate, InstructorSessionLoad, ReportKind, ReportOutput, ThresholdReport,
    TraineeScheduleDeviation, TraineeSessionCount,
};
use crate::db::repositories::ReportsRepository;
use crate::error::AppResult;

/// Read-only operational reports over sessions, trainees and exams.
///
/// Threshold reports read the mean and the compared rows inside one
/// transaction so both see the same data.
#[derive(Clone)]
pub struct AnalyticsService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    rules: SchedulingConfig,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, rules: SchedulingConfig) -> Self {
        Self { pool, clock, rules }
    }

    /// Trainees whose completed practical sessions exceed the mean over
    /// trainees that have at least one.
    pub async fn above_average_sessions(&self) -> AppResult<ThresholdReport<TraineeSessionCount>> {
        let mut tx = self.pool.begin().await?;

        let Some(average) = ReportsRepository::average_completed_practical(&mut *tx).await? else {
            debug!("No completed practical sessions, above-average report is empty");
            return Ok(ThresholdReport::empty());
        };
        let rows = ReportsRepository::trainees_above(&mut *tx, average).await?;

        tx.commit().await?;
        Ok(ThresholdReport {
            average: Some(average),
            rows,
        })
    }

    /// Instructors ranked by completed exams per assigned trainee.
    pub async fn top_instructors(&self) -> AppResult<Vec<InstructorPassRate>> {
        let rows = ReportsRepository::instructor_pass_rates(&self.pool).await?;
        Ok(rows)
    }

    /// Instructors teaching more sessions than the mean over instructors with
    /// at least one session.
    pub async fn most_active_instructors(
        &self,
    ) -> AppResult<ThresholdReport<InstructorSessionLoad>> {
        let mut tx = self.pool.begin().await?;

        let Some(average) = ReportsRepository::average_instructor_sessions(&mut *tx).await? else {
            debug!("No sessions recorded, most-active report is empty");
            return Ok(ThresholdReport::empty());
        };
        let rows = ReportsRepository::instructors_above(&mut *tx, average).await?;

        tx.commit().await?;
        Ok(ThresholdReport {
            average: Some(average),
            rows,
        })
    }

    /// Active trainees enrolled for at least the configured number of days
    /// whose completed practical count is below the mean of that same
    /// population.
    pub async fn behind_schedule(&self) -> AppResult<ThresholdReport<TraineeScheduleDeviation>> {
        let today = self.clock.today();
        let enrolled_by = today - Duration::days(self.rules.behind_schedule_min_days);

        let mut tx = self.pool.begin().await?;

        let Some(average) =
            ReportsRepository::average_tenured_progress(&mut *tx, enrolled_by).await?
        else {
            debug!(%enrolled_by, "No tenured trainee has completed a session, behind-schedule report is empty");
            return Ok(ThresholdReport::empty());
        };
        let rows = ReportsRepository::trainees_below(&mut *tx, today, enrolled_by, average).await?;

        tx.commit().await?;
        Ok(ThresholdReport {
            average: Some(average),
            rows,
        })
    }

    pub async fn run_report(&self, kind: ReportKind) -> AppResult<ReportOutput> {
        let output = match kind {
            ReportKind::AboveAverageSessions => {
                ReportOutput::AboveAverageSessions(self.above_average_sessions().await?)
            }
            ReportKind::TopInstructors => ReportOutput::TopInstructors(self.top_instructors().await?),
            ReportKind::MostActiveInstructors => {
                ReportOutput::MostActiveInstructors(self.most_active_instructors().await?)
            }
            ReportKind::BehindSchedule => {
                ReportOutput::BehindSchedule(self.behind_schedule().await?)
            }
        };

        info!(report = kind.slug(), rows = output.row_count(), "Report generated");
        Ok(output)
    }
}
