//! Weekly class slots.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use iqra_core::{ScheduleId, SessionType, StudentId, UserId, Weekday};

/// A recurring class slot on a teacher's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub teacher_id: UserId,
    pub student_id: Option<StudentId>,
    pub day_of_week: Weekday,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    pub session_type: SessionType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated slot ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub teacher_id: UserId,
    pub student_id: Option<StudentId>,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub session_type: SessionType,
}

/// Partial update sent by a teacher. Times are `HH:MM`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub student_id: Option<StudentId>,
    pub day_of_week: Option<Weekday>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub session_type: Option<SessionType>,
}

/// Serde adapter for `HH:MM` times.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    /// # Errors
    ///
    /// Fails if the value is not a 24-hour `HH:MM` time.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        iqra_core::parse_class_time(&raw).map_err(serde::de::Error::custom)
    }
}
