#![allow(dead_code)]

use std::sync::Arc;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use time::macros::datetime;
use time::{Date, Duration, PrimitiveDateTime};

use drivingschool_backend::clock::FixedClock;
use drivingschool_backend::config::{
    AppConfig, Config, DatabaseConfig, Environment, SchedulingConfig,
};
use drivingschool_backend::db;
use drivingschool_backend::db::models::{DbId, NewSession, SessionStatus, SessionType, UpdateSession};
use drivingschool_backend::AppState;

/// The instant every test runs at.
pub const NOW: PrimitiveDateTime = datetime!(2026-10-16 09:00);

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn test_config(scheduling: SchedulingConfig) -> Config {
    Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            min_connections: Some(1),
        },
        app: AppConfig {
            name: "driving-school-test".to_string(),
            environment: Environment::Development,
        },
        scheduling,
    }
}

pub fn app(pool: &SqlitePool) -> AppState {
    app_with_rules(pool, SchedulingConfig::default())
}

pub fn app_with_rules(pool: &SqlitePool, rules: SchedulingConfig) -> AppState {
    AppState::with_clock(pool.clone(), test_config(rules), Arc::new(FixedClock(NOW)))
}

pub async fn insert_instructor(pool: &SqlitePool, first_name: &str, last_name: &str) -> DbId {
    sqlx::query("INSERT INTO instructors (first_name, last_name, hire_date) VALUES (?, ?, ?)")
        .bind(first_name)
        .bind(last_name)
        .bind(time::macros::date!(2020 - 01 - 15))
        .execute(pool)
        .await
        .expect("Failed to insert instructor")
        .last_insert_rowid()
}

pub async fn insert_trainee(
    pool: &SqlitePool,
    first_name: &str,
    enrollment_date: Date,
    status: &str,
    assigned_instructor_id: Option<DbId>,
) -> DbId {
    sqlx::query(
        "INSERT INTO trainees (first_name, last_name, enrollment_date, license_category, status, assigned_instructor_id)
         VALUES (?, 'Trainee', ?, 'B', ?, ?)",
    )
    .bind(first_name)
    .bind(enrollment_date)
    .bind(status)
    .bind(assigned_instructor_id)
    .execute(pool)
    .await
    .expect("Failed to insert trainee")
    .last_insert_rowid()
}

pub async fn insert_active_trainee(pool: &SqlitePool, first_name: &str) -> DbId {
    insert_trainee(pool, first_name, NOW.date() - Duration::days(60), "Active", None).await
}

pub async fn insert_exam(pool: &SqlitePool, trainee_id: DbId, scheduled_date: Date, status: &str) -> DbId {
    sqlx::query("INSERT INTO exams (exam_type, scheduled_date, status, trainee_id) VALUES ('Driving', ?, ?, ?)")
        .bind(scheduled_date)
        .bind(status)
        .bind(trainee_id)
        .execute(pool)
        .await
        .expect("Failed to insert exam")
        .last_insert_rowid()
}

pub async fn insert_payment(pool: &SqlitePool, trainee_id: DbId, amount: f64, payment_date: Date) -> DbId {
    sqlx::query(
        "INSERT INTO payments (amount, payment_date, payment_method, trainee_id) VALUES (?, ?, 'Cash', ?)",
    )
    .bind(amount)
    .bind(payment_date)
    .bind(trainee_id)
    .execute(pool)
    .await
    .expect("Failed to insert payment")
    .last_insert_rowid()
}

pub async fn insert_car(pool: &SqlitePool, license_plate: &str) -> DbId {
    sqlx::query("INSERT INTO cars (license_plate, brand, model, transmission_type) VALUES (?, 'Renault', 'Clio', 'Manual')")
        .bind(license_plate)
        .execute(pool)
        .await
        .expect("Failed to insert car")
        .last_insert_rowid()
}

/// Writes a session row directly, bypassing scheduling rules, to seed
/// history in the past.
pub async fn insert_session(
    pool: &SqlitePool,
    session_type: SessionType,
    start: PrimitiveDateTime,
    hours: i64,
    status: SessionStatus,
    instructor_id: DbId,
    trainee_id: Option<DbId>,
    feedback: Option<&str>,
) -> DbId {
    sqlx::query(
        "INSERT INTO sessions (session_type, start_date_time, end_date_time, status, instructor_feedback, instructor_id, trainee_id)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(session_type)
    .bind(start)
    .bind(start + Duration::hours(hours))
    .bind(status)
    .bind(feedback)
    .bind(instructor_id)
    .bind(trainee_id)
    .execute(pool)
    .await
    .expect("Failed to insert session")
    .last_insert_rowid()
}

/// `count` completed practical lessons of one hour each, on consecutive past days.
pub async fn insert_completed_lessons(
    pool: &SqlitePool,
    instructor_id: DbId,
    trainee_id: DbId,
    count: i64,
) {
    for day in 0..count {
        insert_session(
            pool,
            SessionType::Practical,
            datetime!(2026-09-01 10:00) + Duration::days(day),
            1,
            SessionStatus::Completed,
            instructor_id,
            Some(trainee_id),
            None,
        )
        .await;
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

pub fn practical_session(
    instructor_id: DbId,
    trainee_id: DbId,
    start: PrimitiveDateTime,
    hours: i64,
) -> NewSession {
    NewSession {
        session_type: SessionType::Practical,
        start_date_time: Some(start),
        end_date_time: Some(start + Duration::hours(hours)),
        status: None,
        instructor_feedback: None,
        instructor_id,
        trainee_id: Some(trainee_id),
    }
}

pub fn theoretical_session(instructor_id: DbId, start: PrimitiveDateTime, hours: i64) -> NewSession {
    NewSession {
        session_type: SessionType::Theoretical,
        start_date_time: Some(start),
        end_date_time: Some(start + Duration::hours(hours)),
        status: None,
        instructor_feedback: None,
        instructor_id,
        trainee_id: None,
    }
}

pub fn update_of(session_id: DbId, session: &NewSession) -> UpdateSession {
    UpdateSession {
        id: session_id,
        session_type: session.session_type,
        start_date_time: session.start_date_time,
        end_date_time: session.end_date_time,
        status: session.status,
        instructor_feedback: session.instructor_feedback.clone(),
        instructor_id: session.instructor_id,
        trainee_id: session.trainee_id,
    }
}

pub async fn enroll(pool: &SqlitePool, trainee_id: DbId, session_id: DbId) {
    sqlx::query("INSERT INTO session_enrollments (trainee_id, session_id) VALUES (?, ?)")
        .bind(trainee_id)
        .bind(session_id)
        .execute(pool)
        .await
        .expect("Failed to enroll trainee");
}
