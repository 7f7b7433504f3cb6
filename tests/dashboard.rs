mod common;

use common::*;
use time::macros::{date, datetime};
use time::Duration;

use drivingschool_backend::db::models::{Dashboard, DashboardRole, SessionStatus, SessionType};
use drivingschool_backend::AppError;

#[tokio::test]
async fn admin_dashboard_summarizes_the_school() {
    let pool = test_pool().await;
    let app = app(&pool);
    let instructor = insert_instructor(&pool, "Ayse", "Kaya").await;
    insert_instructor(&pool, "Burak", "Demir").await;
    insert_car(&pool, "34 ABC 123").await;

    let mut trainees = Vec::new();
    for (offset, name) in ["Mert", "Elif", "Can", "Deniz", "Ece", "Fatma"].iter().enumerate() {
        let enrolled = date!(2026 - 09 - 01) + Duration::days(offset as i64);
        trainees.push(insert_trainee(&pool, name, enrolled, "Active", Some(instructor)).await);
    }
    insert_trainee(&pool, "Gul", date!(2026 - 01 - 10), "Inactive", None).await;

    insert_payment(&pool, trainees[0], 1000.0, date!(2026 - 09 - 20)).await;
    insert_payment(&pool, trainees[1], 500.0, date!(2026 - 10 - 01)).await;
    insert_payment(&pool, trainees[2], 250.0, date!(2026 - 10 - 15)).await;

    insert_exam(&pool, trainees[0], date!(2026 - 09 - 30), "Passed").await;
    insert_exam(&pool, trainees[1], date!(2026 - 09 - 30), "Completed").await;
    insert_exam(&pool, trainees[2], NOW.date(), "Scheduled").await;
    insert_exam(&pool, trainees[3], date!(2026 - 10 - 01), "Scheduled").await;

    insert_completed_lessons(&pool, instructor, trainees[0], 2).await;
    insert_session(
        &pool,
        SessionType::Practical,
        datetime!(2026-10-10 10:00),
        1,
        SessionStatus::Scheduled,
        instructor,
        Some(trainees[0]),
        None,
    )
    .await;
    insert_session(
        &pool,
        SessionType::Practical,
        NOW,
        1,
        SessionStatus::Scheduled,
        instructor,
        Some(trainees[1]),
        None,
    )
    .await;
    let mut upcoming = Vec::new();
    for day in (1..=6).rev() {
        upcoming.push(
            insert_session(
                &pool,
                SessionType::Practical,
                NOW + Duration::days(day),
                1,
                SessionStatus::Scheduled,
                instructor,
                Some(trainees[1]),
                None,
            )
            .await,
        );
    }

    let Dashboard::Admin(dashboard) = app
        .dashboards
        .get_dashboard_stats(DashboardRole::Admin)
        .await
        .unwrap()
    else {
        panic!("expected the admin dashboard");
    };

    let stats = dashboard.stats;
    assert_eq!(stats.total_trainees, 7);
    assert_eq!(stats.active_trainees, 6);
    assert_eq!(stats.total_instructors, 2);
    assert_eq!(stats.total_cars, 1);
    assert_eq!(stats.total_sessions, 10);
    assert_eq!(stats.completed_sessions, 2);
    assert_eq!(stats.upcoming_sessions, 6);
    assert_eq!(stats.total_exams, 4);
    assert_eq!(stats.passed_exams, 1);
    assert_eq!(stats.upcoming_exams, 1);
    assert_eq!(stats.total_revenue, 1750.0);
    assert_eq!(stats.monthly_revenue, 750.0);

    assert_eq!(dashboard.recent_trainees.len(), 5);
    assert_eq!(dashboard.recent_trainees[0].id, trainees[5]);
    assert_eq!(dashboard.recent_payments.len(), 3);
    assert_eq!(dashboard.recent_payments[0].amount, 250.0);

    // Inserted latest-first, so the soonest five are the tail reversed.
    let soonest: Vec<_> = upcoming.iter().rev().take(5).copied().collect();
    let listed: Vec<_> = dashboard
        .upcoming_sessions
        .iter()
        .map(|details| details.session.id)
        .collect();
    assert_eq!(listed, soonest);
}

#[tokio::test]
async fn instructor_dashboard_counts_taught_hours() {
    let pool = test_pool().await;
    let app = app(&pool);
    let instructor = insert_instructor(&pool, "Ayse", "Kaya").await;
    let colleague = insert_instructor(&pool, "Burak", "Demir").await;
    let mert = insert_trainee(&pool, "Mert", date!(2026 - 08 - 01), "Active", Some(instructor)).await;
    let elif = insert_trainee(&pool, "Elif", date!(2026 - 08 - 01), "Active", Some(instructor)).await;
    insert_trainee(&pool, "Can", date!(2026 - 08 - 01), "Active", Some(colleague)).await;

    insert_completed_lessons(&pool, instructor, mert, 2).await;
    let class = insert_session(
        &pool,
        SessionType::Theoretical,
        datetime!(2026-10-05 18:00),
        2,
        SessionStatus::Completed,
        instructor,
        None,
        None,
    )
    .await;
    enroll(&pool, mert, class).await;
    enroll(&pool, elif, class).await;

    let later = insert_session(
        &pool,
        SessionType::Practical,
        NOW + Duration::days(3),
        1,
        SessionStatus::Scheduled,
        instructor,
        Some(elif),
        None,
    )
    .await;
    let sooner = insert_session(
        &pool,
        SessionType::Practical,
        NOW + Duration::days(1),
        1,
        SessionStatus::Scheduled,
        instructor,
        Some(mert),
        None,
    )
    .await;
    insert_session(
        &pool,
        SessionType::Practical,
        NOW + Duration::days(2),
        1,
        SessionStatus::Scheduled,
        colleague,
        Some(elif),
        None,
    )
    .await;

    let Dashboard::Instructor(dashboard) = app
        .dashboards
        .get_dashboard_stats(DashboardRole::Instructor(instructor))
        .await
        .unwrap()
    else {
        panic!("expected the instructor dashboard");
    };

    assert_eq!(dashboard.instructor.id, instructor);
    assert_eq!(dashboard.stats.total_sessions, 5);
    assert_eq!(dashboard.stats.completed_sessions, 3);
    assert_eq!(dashboard.stats.upcoming_sessions, 2);
    assert_eq!(dashboard.stats.assigned_trainees, 2);
    assert_eq!(dashboard.stats.total_hours, 4.0);

    let upcoming: Vec<_> = dashboard
        .upcoming_sessions
        .iter()
        .map(|details| details.session.id)
        .collect();
    assert_eq!(upcoming, vec![sooner, later]);
    assert_eq!(dashboard.completed_sessions[0].session.id, class);
    assert_eq!(dashboard.completed_sessions[0].trainee_count, 2);
}

#[tokio::test]
async fn trainee_dashboard_tracks_progress_and_balance() {
    let pool = test_pool().await;
    let app = app(&pool);
    let instructor = insert_instructor(&pool, "Ayse", "Kaya").await;
    let trainee = insert_trainee(&pool, "Mert", date!(2026 - 08 - 01), "Active", Some(instructor)).await;

    insert_completed_lessons(&pool, instructor, trainee, 13).await;
    let reviewed = insert_session(
        &pool,
        SessionType::Practical,
        datetime!(2026-10-12 10:00),
        1,
        SessionStatus::Completed,
        instructor,
        Some(trainee),
        Some("Good braking distance"),
    )
    .await;
    insert_session(
        &pool,
        SessionType::Practical,
        datetime!(2026-10-13 10:00),
        1,
        SessionStatus::Completed,
        instructor,
        Some(trainee),
        Some("  "),
    )
    .await;
    // Classroom hours do not count toward driving hours.
    let class = insert_session(
        &pool,
        SessionType::Theoretical,
        datetime!(2026-10-14 18:00),
        3,
        SessionStatus::Completed,
        instructor,
        None,
        None,
    )
    .await;
    enroll(&pool, trainee, class).await;
    let next_lesson = insert_session(
        &pool,
        SessionType::Practical,
        NOW + Duration::days(2),
        1,
        SessionStatus::Scheduled,
        instructor,
        Some(trainee),
        None,
    )
    .await;

    for (amount, day) in [(500.0, 1), (500.0, 5), (500.0, 9), (500.0, 13)] {
        insert_payment(&pool, trainee, amount, date!(2026 - 10 - 01) + Duration::days(day - 1)).await;
    }
    insert_exam(&pool, trainee, date!(2026 - 09 - 20), "Passed").await;
    insert_exam(&pool, trainee, date!(2026 - 11 - 02), "Scheduled").await;

    let Dashboard::Trainee(dashboard) = app
        .dashboards
        .get_dashboard_stats(DashboardRole::Trainee(trainee))
        .await
        .unwrap()
    else {
        panic!("expected the trainee dashboard");
    };

    let stats = dashboard.stats;
    assert_eq!(stats.total_sessions, 17);
    assert_eq!(stats.completed_sessions, 16);
    assert_eq!(stats.upcoming_sessions, 1);
    assert_eq!(stats.hours_completed, 15.0);
    assert_eq!(stats.required_hours, 30.0);
    assert_eq!(stats.hours_remaining, 15.0);
    assert_eq!(stats.progress_percentage, 50.0);
    assert_eq!(stats.total_paid, 2000.0);
    assert_eq!(stats.total_cost, 4000.0);
    assert_eq!(stats.balance, 2000.0);
    assert_eq!(stats.total_exams, 2);
    assert_eq!(stats.passed_exams, 1);
    assert_eq!(stats.upcoming_exams, 1);

    assert_eq!(dashboard.upcoming_sessions.len(), 1);
    assert_eq!(dashboard.upcoming_sessions[0].session.id, next_lesson);
    assert_eq!(dashboard.sessions_with_feedback.len(), 1);
    assert_eq!(dashboard.sessions_with_feedback[0].session.id, reviewed);
    assert_eq!(dashboard.recent_payments.len(), 3);
    assert_eq!(dashboard.recent_payments[0].payment_date, date!(2026 - 10 - 13));
    assert_eq!(dashboard.upcoming_exams.len(), 1);
}

#[tokio::test]
async fn unknown_identities_are_not_found() {
    let pool = test_pool().await;
    let app = app(&pool);

    let err = app
        .dashboards
        .get_dashboard_stats(DashboardRole::Instructor(42))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app
        .dashboards
        .get_dashboard_stats(DashboardRole::Trainee(42))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
