//! Attendance marks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use iqra_core::{AttendanceId, AttendanceStatus, StudentId, UserId};

/// One student's mark for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub teacher_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    /// Surah covered in the lesson.
    pub surah: Option<String>,
    /// Ayah range covered, free text such as `1-15`.
    pub ayahs: Option<String>,
    /// 0-10.
    pub tajweed_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quran lesson notes attached to a mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonNotes {
    pub notes: Option<String>,
    pub surah: Option<String>,
    pub ayahs: Option<String>,
    pub tajweed_score: Option<i32>,
}

/// A validated mark ready to upsert on (student, teacher, date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: LessonNotes,
}

/// Which of a teacher's marks to list. Results are newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceFilter {
    All,
    OnDate(NaiveDate),
    ForStudent(StudentId),
}

impl AttendanceFilter {
    #[must_use]
    pub fn matches(&self, mark: &Attendance) -> bool {
        match self {
            Self::All => true,
            Self::OnDate(date) => mark.date == *date,
            Self::ForStudent(id) => mark.student_id == *id,
        }
    }
}
