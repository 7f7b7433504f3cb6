use std::collections::HashSet;
use std::sync::Arc;

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use time::{Duration, PrimitiveDateTime};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::db::models::{
    DbId, Enrollment, NewSession, Session, SessionDetails, SessionFeedback, SessionFilter, SessionRecord,
    SessionStatistics, SessionStatus, SessionType, UpdateSession,
};
use crate::db::repositories::{
    EnrollmentRepository, InstructorRepository, SessionRepository, TraineeRepository,
};
use crate::error::{AppError, AppResult};

/// Creates, edits and deletes sessions while keeping the practical and
/// theoretical invariants:
///
/// - a practical session has exactly one trainee and no enrollment rows;
/// - a theoretical session has no trainee and at least one enrollment row;
/// - the end is strictly after the start;
/// - feedback is only present on completed sessions.
///
/// Every write runs in a single transaction. Returning early through `?`
/// drops the transaction, which rolls back whatever was already written.
#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    rules: SchedulingConfig,
}

impl SessionService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, rules: SchedulingConfig) -> Self {
        Self { pool, clock, rules }
    }

    /// Schedule a session. `trainee_ids` is the roster of a theoretical
    /// session and is ignored for practical ones.
    pub async fn create_session(
        &self,
        new_session: NewSession,
        trainee_ids: &[DbId],
    ) -> AppResult<DbId> {
        new_session.validate()?;
        let (start, end) = time_window(new_session.start_date_time, new_session.end_date_time)?;

        let earliest_start = self.clock.now() - Duration::minutes(self.rules.past_grace_minutes);
        if start < earliest_start {
            return Err(AppError::invalid("Cannot schedule sessions in the past"));
        }

        let roster = match new_session.session_type {
            SessionType::Practical => Vec::new(),
            SessionType::Theoretical => {
                let roster = dedup_roster(trainee_ids);
                if roster.is_empty() {
                    return Err(AppError::invalid(
                        "Theoretical sessions must have at least one trainee",
                    ));
                }
                roster
            }
        };

        let status = new_session.status.unwrap_or_default();
        let instructor_feedback = normalize_feedback(new_session.instructor_feedback);
        ensure_feedback_allowed(status, instructor_feedback.as_deref())?;

        let mut tx = self.pool.begin().await?;

        ensure_instructor(&mut tx, new_session.instructor_id).await?;
        let trainee_id = match new_session.session_type {
            SessionType::Practical => {
                let trainee_id = new_session.trainee_id.ok_or_else(|| {
                    AppError::invalid("Practical sessions must have a trainee assigned")
                })?;
                ensure_trainee(&mut tx, trainee_id).await?;
                Some(trainee_id)
            }
            // Theoretical sessions never carry a trainee of their own.
            SessionType::Theoretical => None,
        };

        let record = SessionRecord {
            session_type: new_session.session_type,
            start_date_time: start,
            end_date_time: end,
            status,
            instructor_feedback,
            instructor_id: new_session.instructor_id,
            trainee_id,
        };
        self.ensure_no_overlap(&mut tx, &record, None).await?;

        let session_id = SessionRepository::insert(&mut tx, &record).await?;
        enroll_all(&mut tx, session_id, &roster).await?;

        tx.commit().await?;

        info!(
            session_id,
            session_type = %record.session_type,
            instructor_id = record.instructor_id,
            enrolled = roster.len(),
            "Session created"
        );
        Ok(session_id)
    }

    /// Replace a session's fields. For theoretical sessions a provided roster
    /// replaces the stored one wholesale; `None` keeps it.
    pub async fn update_session(
        &self,
        update: UpdateSession,
        trainee_ids: Option<&[DbId]>,
    ) -> AppResult<()> {
        update.validate()?;
        let (start, end) = time_window(update.start_date_time, update.end_date_time)?;

        let mut tx = self.pool.begin().await?;

        let existing = find_session(&mut tx, update.id).await?;
        if existing.session_type != update.session_type {
            return Err(AppError::invalid(format!(
                "Session type cannot change from {} to {}",
                existing.session_type, update.session_type
            )));
        }

        ensure_instructor(&mut tx, update.instructor_id).await?;

        let (trainee_id, roster) = match update.session_type {
            SessionType::Practical => {
                let trainee_id = update.trainee_id.ok_or_else(|| {
                    AppError::invalid("Practical session must have a trainee assigned")
                })?;
                ensure_trainee(&mut tx, trainee_id).await?;
                (Some(trainee_id), None)
            }
            SessionType::Theoretical => {
                let roster = trainee_ids.map(dedup_roster);
                if roster.as_ref().is_some_and(Vec::is_empty) {
                    return Err(AppError::invalid(
                        "Theoretical sessions must have at least one trainee",
                    ));
                }
                (None, roster)
            }
        };

        let status = update.status.unwrap_or(existing.status);
        let instructor_feedback = match update.instructor_feedback {
            Some(feedback) => normalize_feedback(Some(feedback)),
            None => existing.instructor_feedback,
        };
        ensure_feedback_allowed(status, instructor_feedback.as_deref())?;

        let record = SessionRecord {
            session_type: update.session_type,
            start_date_time: start,
            end_date_time: end,
            status,
            instructor_feedback,
            instructor_id: update.instructor_id,
            trainee_id,
        };
        self.ensure_no_overlap(&mut tx, &record, Some(update.id)).await?;

        SessionRepository::update(&mut tx, update.id, &record).await?;

        if let Some(roster) = &roster {
            let current = EnrollmentRepository::list_trainee_ids_for_session(&mut *tx, update.id).await?;
            for trainee_id in current {
                let enrollment = Enrollment {
                    trainee_id,
                    session_id: update.id,
                };
                EnrollmentRepository::remove(&mut tx, enrollment).await?;
            }
            enroll_all(&mut tx, update.id, roster).await?;
        }

        tx.commit().await?;

        info!(
            session_id = update.id,
            roster_replaced = roster.is_some(),
            "Session updated"
        );
        Ok(())
    }

    pub async fn delete_session(&self, session_id: DbId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        find_session(&mut tx, session_id).await?;
        let enrolled = EnrollmentRepository::list_trainee_ids_for_session(&mut *tx, session_id)
            .await?
            .len();
        SessionRepository::delete(&mut tx, session_id).await?;

        tx.commit().await?;

        info!(session_id, enrolled, "Session deleted");
        Ok(())
    }

    /// Move a session to `new_status`. Unknown status names are rejected;
    /// reopening a completed session clears its feedback.
    pub async fn change_status(&self, session_id: DbId, new_status: &str) -> AppResult<()> {
        let next: SessionStatus = new_status.parse().map_err(AppError::Invalid)?;

        let mut tx = self.pool.begin().await?;

        let session = find_session(&mut tx, session_id).await?;
        if !session.status.can_transition_to(next) {
            return Err(AppError::invalid(format!(
                "Cannot change session status from {} to {}",
                session.status, next
            )));
        }

        let feedback = match next {
            SessionStatus::Completed => session.instructor_feedback.as_deref(),
            SessionStatus::Scheduled => None,
        };
        SessionRepository::update_status(&mut tx, session_id, next, feedback).await?;

        tx.commit().await?;

        info!(session_id, from = %session.status, to = %next, "Session status changed");
        Ok(())
    }

    pub async fn add_feedback(&self, session_id: DbId, feedback: &str) -> AppResult<()> {
        let input = SessionFeedback {
            feedback: feedback.to_string(),
        };
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let session = find_session(&mut tx, session_id).await?;
        if !session.is_completed() {
            warn!(session_id, status = %session.status, "Feedback rejected on open session");
            return Err(AppError::invalid("Can only add feedback to completed sessions"));
        }

        let feedback = normalize_feedback(Some(input.feedback));
        SessionRepository::update_status(&mut tx, session_id, session.status, feedback.as_deref())
            .await?;

        tx.commit().await?;

        info!(session_id, "Session feedback recorded");
        Ok(())
    }

    /// Trainee ids enrolled in a theoretical session. Empty for practical
    /// sessions and for sessions that no longer exist.
    pub async fn get_enrollment(&self, session_id: DbId) -> AppResult<Vec<DbId>> {
        let trainee_ids =
            EnrollmentRepository::list_trainee_ids_for_session(&self.pool, session_id).await?;
        Ok(trainee_ids)
    }

    pub async fn get_session(&self, session_id: DbId) -> AppResult<Option<SessionDetails>> {
        let session = SessionRepository::find_details_by_id(&self.pool, session_id).await?;
        Ok(session)
    }

    pub async fn list_sessions(&self, filter: SessionFilter) -> AppResult<Vec<SessionDetails>> {
        let sessions = SessionRepository::list(&self.pool, filter).await?;
        debug!(?filter, count = sessions.len(), "Sessions listed");
        Ok(sessions)
    }

    pub async fn session_statistics(&self) -> AppResult<SessionStatistics> {
        let statistics = SessionRepository::statistics(&self.pool).await?;
        Ok(statistics)
    }

    /// Hours of completed practical driving for one trainee.
    pub async fn total_practical_hours(&self, trainee_id: DbId) -> AppResult<f64> {
        let sessions =
            SessionRepository::completed_practical_for_trainee(&self.pool, trainee_id).await?;
        Ok(sessions.iter().map(Session::duration_hours).sum())
    }

    async fn ensure_no_overlap(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        record: &SessionRecord,
        exclude_session_id: Option<DbId>,
    ) -> AppResult<()> {
        if !self.rules.reject_overlaps {
            return Ok(());
        }

        let overlapping = SessionRepository::count_overlapping(
            &mut **tx,
            record.instructor_id,
            record.trainee_id,
            record.start_date_time,
            record.end_date_time,
            exclude_session_id,
        )
        .await?;

        if overlapping > 0 {
            warn!(
                instructor_id = record.instructor_id,
                trainee_id = ?record.trainee_id,
                overlapping,
                "Session overlaps existing bookings"
            );
            return Err(AppError::invalid(
                "Session overlaps another session of the same instructor or trainee",
            ));
        }
        Ok(())
    }
}

fn time_window(
    start: Option<PrimitiveDateTime>,
    end: Option<PrimitiveDateTime>,
) -> AppResult<(PrimitiveDateTime, PrimitiveDateTime)> {
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok((start, end)),
        (Some(_), Some(_)) => Err(AppError::invalid("End date/time must be after start date/time")),
        _ => Err(AppError::invalid("Start and end date/time are required")),
    }
}

/// Collapse repeated ids, keeping the first occurrence.
fn dedup_roster(trainee_ids: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::new();
    trainee_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

fn normalize_feedback(feedback: Option<String>) -> Option<String> {
    feedback.filter(|text| !text.trim().is_empty())
}

fn ensure_feedback_allowed(status: SessionStatus, feedback: Option<&str>) -> AppResult<()> {
    if feedback.is_some() && status != SessionStatus::Completed {
        return Err(AppError::invalid(
            "Feedback can only be recorded on completed sessions",
        ));
    }
    Ok(())
}

async fn find_session(conn: &mut SqliteConnection, session_id: DbId) -> AppResult<Session> {
    SessionRepository::find_by_id(&mut *conn, session_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Session not found: {}", session_id)))
}

async fn ensure_instructor(conn: &mut SqliteConnection, instructor_id: DbId) -> AppResult<()> {
    if !InstructorRepository::exists(&mut *conn, instructor_id).await? {
        return Err(AppError::not_found(format!(
            "Instructor not found: {}",
            instructor_id
        )));
    }
    Ok(())
}

async fn ensure_trainee(conn: &mut SqliteConnection, trainee_id: DbId) -> AppResult<()> {
    if !TraineeRepository::exists(&mut *conn, trainee_id).await? {
        return Err(AppError::not_found(format!("Trainee not found: {}", trainee_id)));
    }
    Ok(())
}

async fn enroll_all(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: DbId,
    roster: &[DbId],
) -> AppResult<()> {
    for &trainee_id in roster {
        if let Err(err) = ensure_trainee(&mut *tx, trainee_id).await {
            warn!(session_id, trainee_id, "Roster references an unknown trainee");
            return Err(err);
        }
        EnrollmentRepository::add(tx, Enrollment { trainee_id, session_id }).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn roster_keeps_first_occurrence_order() {
        assert_eq!(dedup_roster(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_roster(&[]).is_empty());
    }

    #[test]
    fn blank_feedback_is_absent() {
        assert_eq!(normalize_feedback(Some("   ".to_string())), None);
        assert_eq!(
            normalize_feedback(Some("Good lane discipline".to_string())),
            Some("Good lane discipline".to_string())
        );
    }

    #[test]
    fn feedback_requires_completed_status() {
        assert!(ensure_feedback_allowed(SessionStatus::Scheduled, Some("late")).is_err());
        assert!(ensure_feedback_allowed(SessionStatus::Scheduled, None).is_ok());
        assert!(ensure_feedback_allowed(SessionStatus::Completed, Some("late")).is_ok());
    }

    #[test]
    fn time_window_requires_strictly_later_end() {
        let start = datetime!(2026-10-20 10:00);
        assert!(matches!(
            time_window(Some(start), Some(start)),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(time_window(None, Some(start)), Err(AppError::Invalid(_))));
        assert!(time_window(Some(start), Some(datetime!(2026-10-20 11:00))).is_ok());
    }
}
