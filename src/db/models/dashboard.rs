use serde::{Deserialize, Serialize};

use super::{DbId, Exam, Instructor, Payment, SessionDetails, Trainee};

/// Whose dashboard to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum DashboardRole {
    Admin,
    Instructor(DbId),
    Trainee(DbId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Admin(AdminDashboard),
    Instructor(InstructorDashboard),
    Trainee(TraineeDashboard),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_trainees: i64,
    pub active_trainees: i64,
    pub total_instructors: i64,
    pub total_cars: i64,
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub upcoming_sessions: i64,
    pub total_exams: i64,
    pub passed_exams: i64,
    pub upcoming_exams: i64,
    pub total_revenue: f64,
    pub monthly_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub recent_trainees: Vec<Trainee>,
    pub recent_payments: Vec<Payment>,
    pub upcoming_sessions: Vec<SessionDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructorStats {
    pub total_sessions: i64,
    pub upcoming_sessions: i64,
    pub completed_sessions: i64,
    pub assigned_trainees: i64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorDashboard {
    pub instructor: Instructor,
    pub stats: InstructorStats,
    pub upcoming_sessions: Vec<SessionDetails>,
    pub completed_sessions: Vec<SessionDetails>,
    pub assigned_trainees: Vec<Trainee>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraineeStats {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub upcoming_sessions: i64,
    pub hours_completed: f64,
    pub required_hours: f64,
    pub hours_remaining: f64,
    pub progress_percentage: f64,
    pub total_paid: f64,
    pub total_cost: f64,
    pub balance: f64,
    pub total_exams: i64,
    pub passed_exams: i64,
    pub upcoming_exams: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraineeDashboard {
    pub trainee: Trainee,
    pub stats: TraineeStats,
    pub upcoming_sessions: Vec<SessionDetails>,
    pub sessions_with_feedback: Vec<SessionDetails>,
    pub recent_payments: Vec<Payment>,
    pub upcoming_exams: Vec<Exam>,
}
