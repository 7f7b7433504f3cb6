use std::cmp::Reverse;
use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use time::{Date, PrimitiveDateTime};
use tracing::debug;

use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::db::models::{
    AdminDashboard, AdminStats, Dashboard, DashboardRole, DbId, InstructorDashboard,
    InstructorStats, SessionDetails, SessionFilter, TraineeDashboard, TraineeStats,
};
use crate::db::repositories::{
    CarRepository, ExamRepository, InstructorRepository, PaymentRepository, SessionRepository,
    TraineeRepository,
};
use crate::error::{AppError, AppResult};

/// Number of payments on the trainee dashboard.
const TRAINEE_RECENT_PAYMENTS: usize = 3;

/// Per-role summaries. Each dashboard is read inside one transaction.
#[derive(Clone)]
pub struct DashboardService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    rules: SchedulingConfig,
}

impl DashboardService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, rules: SchedulingConfig) -> Self {
        Self { pool, clock, rules }
    }

    pub async fn get_dashboard_stats(&self, role: DashboardRole) -> AppResult<Dashboard> {
        debug!(?role, "Building dashboard");
        let dashboard = match role {
            DashboardRole::Admin => Dashboard::Admin(self.admin_dashboard().await?),
            DashboardRole::Instructor(instructor_id) => {
                Dashboard::Instructor(self.instructor_dashboard(instructor_id).await?)
            }
            DashboardRole::Trainee(trainee_id) => {
                Dashboard::Trainee(self.trainee_dashboard(trainee_id).await?)
            }
        };
        Ok(dashboard)
    }

    pub async fn admin_dashboard(&self) -> AppResult<AdminDashboard> {
        let now = self.clock.now();
        let today = now.date();
        let limit = self.rules.dashboard_list_limit;

        let mut tx = self.pool.begin().await?;
        let conn: &mut SqliteConnection = &mut tx;

        let sessions = SessionRepository::statistics(&mut *conn).await?;
        let stats = AdminStats {
            total_trainees: TraineeRepository::count(&mut *conn).await?,
            active_trainees: TraineeRepository::count_active(&mut *conn).await?,
            total_instructors: InstructorRepository::count(&mut *conn).await?,
            total_cars: CarRepository::count(&mut *conn).await?,
            total_sessions: sessions.total_sessions,
            completed_sessions: sessions.completed_sessions,
            upcoming_sessions: SessionRepository::count_upcoming(&mut *conn, now).await?,
            total_exams: ExamRepository::count(&mut *conn).await?,
            passed_exams: ExamRepository::count_passed(&mut *conn).await?,
            upcoming_exams: ExamRepository::count_upcoming(&mut *conn, today).await?,
            total_revenue: PaymentRepository::total_revenue(&mut *conn).await?,
            monthly_revenue: PaymentRepository::revenue_since(&mut *conn, month_start(today))
                .await?,
        };

        let recent_trainees = TraineeRepository::recent_enrollments(&mut *conn, limit).await?;
        let recent_payments = PaymentRepository::recent(&mut *conn, limit).await?;
        let upcoming_sessions = SessionRepository::upcoming(&mut *conn, now, limit).await?;

        tx.commit().await?;

        Ok(AdminDashboard {
            stats,
            recent_trainees,
            recent_payments,
            upcoming_sessions,
        })
    }

    pub async fn instructor_dashboard(&self, instructor_id: DbId) -> AppResult<InstructorDashboard> {
        let now = self.clock.now();
        let limit = list_limit(self.rules.dashboard_list_limit);

        let mut tx = self.pool.begin().await?;

        let instructor = InstructorRepository::find_by_id(&mut *tx, instructor_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Instructor not found: {}", instructor_id))
            })?;
        let sessions =
            SessionRepository::list(&mut *tx, SessionFilter::Instructor(instructor_id)).await?;
        let assigned_trainees = TraineeRepository::find_by_instructor(&mut *tx, instructor_id).await?;

        tx.commit().await?;

        let upcoming = upcoming_sessions(&sessions, now);
        let mut completed: Vec<SessionDetails> = sessions
            .iter()
            .filter(|details| details.session.is_completed())
            .cloned()
            .collect();
        completed.sort_by_key(|details| Reverse(details.session.end_date_time));

        let stats = InstructorStats {
            total_sessions: sessions.len() as i64,
            upcoming_sessions: upcoming.len() as i64,
            completed_sessions: completed.len() as i64,
            assigned_trainees: assigned_trainees.len() as i64,
            total_hours: completed
                .iter()
                .map(|details| details.session.duration_hours())
                .sum(),
        };

        Ok(InstructorDashboard {
            instructor,
            stats,
            upcoming_sessions: upcoming.into_iter().take(limit).collect(),
            completed_sessions: completed.into_iter().take(limit).collect(),
            assigned_trainees,
        })
    }

    pub async fn trainee_dashboard(&self, trainee_id: DbId) -> AppResult<TraineeDashboard> {
        let now = self.clock.now();
        let today = now.date();
        let limit = list_limit(self.rules.dashboard_list_limit);

        let mut tx = self.pool.begin().await?;

        let trainee = TraineeRepository::find_by_id(&mut *tx, trainee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainee not found: {}", trainee_id)))?;
        let sessions = SessionRepository::list(&mut *tx, SessionFilter::Trainee(trainee_id)).await?;
        let payments = PaymentRepository::find_by_trainee(&mut *tx, trainee_id).await?;
        let exams = ExamRepository::find_by_trainee(&mut *tx, trainee_id).await?;

        tx.commit().await?;

        let upcoming = upcoming_sessions(&sessions, now);
        let completed_sessions = sessions
            .iter()
            .filter(|details| details.session.is_completed())
            .count() as i64;
        let hours_completed: f64 = sessions
            .iter()
            .map(|details| &details.session)
            .filter(|session| {
                session.is_completed()
                    && session.is_practical()
                    && session.trainee_id == Some(trainee_id)
            })
            .map(|session| session.duration_hours())
            .sum();
        // Listing order is newest start first.
        let sessions_with_feedback: Vec<SessionDetails> = sessions
            .iter()
            .filter(|details| details.session.is_completed() && details.session.has_feedback())
            .take(limit)
            .cloned()
            .collect();

        let total_paid: f64 = payments.iter().map(|payment| payment.amount).sum();
        let upcoming_exams: Vec<_> = exams
            .iter()
            .filter(|exam| exam.is_upcoming(today))
            .cloned()
            .collect();
        let progress = TrainingProgress::new(
            hours_completed,
            self.rules.required_practical_hours,
            total_paid,
            self.rules.course_fee,
        );

        let stats = TraineeStats {
            total_sessions: sessions.len() as i64,
            completed_sessions,
            upcoming_sessions: upcoming.len() as i64,
            hours_completed,
            required_hours: self.rules.required_practical_hours,
            hours_remaining: progress.hours_remaining,
            progress_percentage: progress.percentage,
            total_paid,
            total_cost: self.rules.course_fee,
            balance: progress.balance,
            total_exams: exams.len() as i64,
            passed_exams: exams.iter().filter(|exam| exam.is_passed()).count() as i64,
            upcoming_exams: upcoming_exams.len() as i64,
        };

        Ok(TraineeDashboard {
            trainee,
            stats,
            upcoming_sessions: upcoming.into_iter().take(limit).collect(),
            sessions_with_feedback,
            recent_payments: payments.into_iter().take(TRAINEE_RECENT_PAYMENTS).collect(),
            upcoming_exams,
        })
    }
}

/// Derived hours and money figures of a trainee's course.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TrainingProgress {
    hours_remaining: f64,
    percentage: f64,
    balance: f64,
}

impl TrainingProgress {
    fn new(hours_completed: f64, required_hours: f64, total_paid: f64, course_fee: f64) -> Self {
        let percentage = if required_hours > 0.0 {
            (hours_completed / required_hours * 100.0).min(100.0)
        } else {
            100.0
        };
        Self {
            hours_remaining: (required_hours - hours_completed).max(0.0),
            percentage,
            balance: (course_fee - total_paid).max(0.0),
        }
    }
}

/// Scheduled sessions starting strictly after `now`, soonest first.
fn upcoming_sessions(sessions: &[SessionDetails], now: PrimitiveDateTime) -> Vec<SessionDetails> {
    let mut upcoming: Vec<SessionDetails> = sessions
        .iter()
        .filter(|details| details.session.is_upcoming(now))
        .cloned()
        .collect();
    upcoming.sort_by_key(|details| (details.session.start_date_time, details.session.id));
    upcoming
}

fn month_start(today: Date) -> Date {
    today.replace_day(1).unwrap_or(today)
}

fn list_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}
