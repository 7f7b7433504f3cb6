use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::PrimitiveDateTime;
use validator::{Validate, ValidationError};

use super::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "PascalCase")]
pub enum SessionType {
    /// One instructor, one trainee.
    Practical,
    /// One instructor, a roster of enrolled trainees.
    Theoretical,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Practical => "Practical",
            SessionType::Theoretical => "Theoretical",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Practical" => Ok(SessionType::Practical),
            "Theoretical" => Ok(SessionType::Theoretical),
            other => Err(format!("Unknown session type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "PascalCase")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "Scheduled",
            SessionStatus::Completed => "Completed",
        }
    }

    /// Transition table for `change_status`. Reopening a completed session
    /// is allowed, as is re-applying the current status.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Scheduled, Scheduled) | (Scheduled, Completed) => true,
            (Completed, Completed) | (Completed, Scheduled) => true,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Scheduled" => Ok(SessionStatus::Scheduled),
            "Completed" => Ok(SessionStatus::Completed),
            other => Err(format!("Unknown session status: {}", other)),
        }
    }
}

/// A row of the `sessions` table, without joined columns.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: DbId,
    pub session_type: SessionType,
    pub start_date_time: PrimitiveDateTime,
    pub end_date_time: PrimitiveDateTime,
    pub status: SessionStatus,
    pub instructor_feedback: Option<String>,
    pub instructor_id: DbId,
    /// Set for practical sessions only.
    pub trainee_id: Option<DbId>,
}

impl Session {
    pub fn is_practical(&self) -> bool {
        self.session_type == SessionType::Practical
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == SessionStatus::Scheduled
    }

    /// Scheduled and starting strictly after `now`.
    pub fn is_upcoming(&self, now: PrimitiveDateTime) -> bool {
        self.is_scheduled() && self.start_date_time > now
    }

    pub fn has_feedback(&self) -> bool {
        self.instructor_feedback
            .as_deref()
            .is_some_and(|f| !f.trim().is_empty())
    }

    /// Whole minutes between start and end, expressed in hours.
    pub fn duration_hours(&self) -> f64 {
        duration_hours(self.start_date_time, self.end_date_time)
    }
}

pub fn duration_hours(start: PrimitiveDateTime, end: PrimitiveDateTime) -> f64 {
    (end - start).whole_minutes() as f64 / 60.0
}

/// A session joined with display names and its roster size.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct SessionDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: Session,
    pub instructor_name: Option<String>,
    pub trainee_name: Option<String>,
    pub trainee_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_new_session_window"))]
pub struct NewSession {
    pub session_type: SessionType,
    pub start_date_time: Option<PrimitiveDateTime>,
    pub end_date_time: Option<PrimitiveDateTime>,
    #[serde(default, deserialize_with = "blank_status_as_none")]
    pub status: Option<SessionStatus>,
    #[validate(length(max = 2000))]
    pub instructor_feedback: Option<String>,
    pub instructor_id: DbId,
    pub trainee_id: Option<DbId>,
}

/// Full replacement of a session's editable fields. `status` and
/// `instructor_feedback` keep their stored values when absent.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_update_session_window"))]
pub struct UpdateSession {
    pub id: DbId,
    pub session_type: SessionType,
    pub start_date_time: Option<PrimitiveDateTime>,
    pub end_date_time: Option<PrimitiveDateTime>,
    #[serde(default, deserialize_with = "blank_status_as_none")]
    pub status: Option<SessionStatus>,
    #[validate(length(max = 2000))]
    pub instructor_feedback: Option<String>,
    pub instructor_id: DbId,
    pub trainee_id: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionFeedback {
    #[validate(length(max = 2000))]
    pub feedback: String,
}

/// Validated values ready to be written to the `sessions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_type: SessionType,
    pub start_date_time: PrimitiveDateTime,
    pub end_date_time: PrimitiveDateTime,
    pub status: SessionStatus,
    pub instructor_feedback: Option<String>,
    pub instructor_id: DbId,
    pub trainee_id: Option<DbId>,
}

/// Listing criteria for `list_sessions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum SessionFilter {
    #[default]
    All,
    Type(SessionType),
    Status(SessionStatus),
    Instructor(DbId),
    Trainee(DbId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_sessions: i64,
    pub scheduled_sessions: i64,
    pub completed_sessions: i64,
    pub practical_sessions: i64,
    pub theoretical_sessions: i64,
}

fn check_window(
    start: Option<PrimitiveDateTime>,
    end: Option<PrimitiveDateTime>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(()),
        (Some(_), Some(_)) => Err(ValidationError::new("end_not_after_start")),
        _ => Err(ValidationError::new("start_and_end_required")),
    }
}

fn validate_new_session_window(session: &NewSession) -> Result<(), ValidationError> {
    check_window(session.start_date_time, session.end_date_time)
}

fn validate_update_session_window(session: &UpdateSession) -> Result<(), ValidationError> {
    check_window(session.start_date_time, session.end_date_time)
}

// Form posts send an empty string when no status was picked.
fn blank_status_as_none<'de, D>(deserializer: D) -> Result<Option<SessionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
