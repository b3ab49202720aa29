//! Attendance recording and monthly reports.

use serde::Deserialize;

use iqra_core::{
    AttendanceStatus, MonthlyReport, ReportMark, ReportPeriod, ReportStudent, StudentId, UserId,
    normalize_day,
};

use super::error::{ServiceError, check_range, not_found_as};
use crate::db::{AttendanceRepository, StudentRepository};
use crate::models::{Attendance, AttendanceFilter, AttendanceMark, LessonNotes};

pub const MAX_TAJWEED_SCORE: i32 = 10;

/// One mark as sent by a teacher.
///
/// `date` may be `YYYY-MM-DD` or a full timestamp; only the day is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub student_id: StudentId,
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    pub notes: LessonNotes,
}

/// One line of a bulk submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRecord {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    pub notes: LessonNotes,
}

/// A whole class marked for one day.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceInput {
    pub date: String,
    pub records: Vec<BulkRecord>,
}

/// Attendance operations for one teacher.
pub struct AttendanceService<'a> {
    attendance: &'a dyn AttendanceRepository,
    students: &'a dyn StudentRepository,
    teacher: UserId,
}

impl<'a> AttendanceService<'a> {
    #[must_use]
    pub const fn new(
        attendance: &'a dyn AttendanceRepository,
        students: &'a dyn StudentRepository,
        teacher: UserId,
    ) -> Self {
        Self {
            attendance,
            students,
            teacher,
        }
    }

    /// Record (or overwrite) one student's mark for a day.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad date or score and
    /// `ServiceError::NotFound` if the student is not on this roster.
    #[tracing::instrument(skip(self, input), fields(teacher_id = %self.teacher, student_id = %input.student_id))]
    pub async fn record(&self, input: AttendanceInput) -> Result<Attendance, ServiceError> {
        let mark = AttendanceMark {
            student_id: input.student_id,
            date: normalize_day(&input.date)?,
            status: input.status,
            notes: validate_notes(input.notes)?,
        };

        self.attendance
            .upsert(self.teacher, mark)
            .await
            .map_err(not_found_as("Student"))
    }

    /// Record a whole day for many students at once.
    ///
    /// Every record is validated first, and the write is all-or-nothing.
    /// Returns the number of records processed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty batch or any bad
    /// field, and `ServiceError::NotFound` if any student is not on this
    /// roster. In every error case nothing is written.
    #[tracing::instrument(skip(self, input), fields(teacher_id = %self.teacher, records = input.records.len()))]
    pub async fn record_bulk(&self, input: BulkAttendanceInput) -> Result<usize, ServiceError> {
        if input.records.is_empty() {
            return Err(ServiceError::invalid("Records are required"));
        }
        let date = normalize_day(&input.date)?;

        let marks = input
            .records
            .into_iter()
            .map(|record| {
                Ok(AttendanceMark {
                    student_id: record.student_id,
                    date,
                    status: record.status,
                    notes: validate_notes(record.notes)?,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        let count = self
            .attendance
            .upsert_batch(self.teacher, &marks)
            .await
            .map_err(not_found_as("Student"))?;

        tracing::info!(%date, count, "Bulk attendance recorded");
        Ok(count)
    }

    /// Marks matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list(&self, filter: AttendanceFilter) -> Result<Vec<Attendance>, ServiceError> {
        Ok(self.attendance.list(self.teacher, filter).await?)
    }

    /// Per-student attendance for a calendar month.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a month outside 1-12 or a year
    /// outside 2000-2100.
    #[tracing::instrument(skip(self), fields(teacher_id = %self.teacher))]
    pub async fn monthly_report(&self, month: u32, year: i32) -> Result<MonthlyReport, ServiceError> {
        let period = ReportPeriod::new(month, year)?;

        let students = self
            .students
            .list_active(self.teacher)
            .await?
            .into_iter()
            .map(|s| ReportStudent {
                id: s.id,
                name: s.name,
                course: s.course,
            })
            .collect();

        let marks = self
            .attendance
            .in_range(self.teacher, period.first_day(), period.last_day())
            .await?
            .into_iter()
            .map(|a| ReportMark {
                student_id: a.student_id,
                date: a.date,
                status: a.status,
            });

        Ok(MonthlyReport::build(period, students, marks))
    }
}

fn validate_notes(mut notes: LessonNotes) -> Result<LessonNotes, ServiceError> {
    if let Some(score) = notes.tajweed_score {
        check_range("Tajweed score", score, 0, MAX_TAJWEED_SCORE)?;
    }
    notes.notes = notes.notes.filter(|n| !n.trim().is_empty());
    Ok(notes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use iqra_core::{CourseTrack, Email, PaymentStatus};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewStudent, Student};

    const TEACHER: UserId = UserId::new(1);

    async fn enrol(store: &MemoryStore, teacher: UserId, name: &str) -> Student {
        StudentRepository::create(
            store,
            NewStudent {
                teacher_id: teacher,
                user_id: None,
                name: name.to_owned(),
                email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
                phone: None,
                age: Some(10),
                course: CourseTrack::Hifz,
                paras_completed: 0,
                current_surah: None,
                preferred_days: Vec::new(),
                preferred_time: None,
                monthly_fee: 450,
                payment_status: PaymentStatus::Pending,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    fn single(student: StudentId, date: &str, status: AttendanceStatus) -> AttendanceInput {
        AttendanceInput {
            student_id: student,
            date: date.to_owned(),
            status,
            notes: LessonNotes::default(),
        }
    }

    fn bulk(date: &str, students: &[StudentId]) -> BulkAttendanceInput {
        BulkAttendanceInput {
            date: date.to_owned(),
            records: students
                .iter()
                .map(|&student_id| BulkRecord {
                    student_id,
                    status: AttendanceStatus::Present,
                    notes: LessonNotes::default(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_record_is_idempotent_per_day() {
        let store = MemoryStore::default();
        let student = enrol(&store, TEACHER, "Aisha").await;
        let service = AttendanceService::new(&store, &store, TEACHER);

        service
            .record(single(student.id, "2024-03-01T08:00:00Z", AttendanceStatus::Absent))
            .await
            .unwrap();
        service
            .record(single(student.id, "2024-03-01T19:30:00Z", AttendanceStatus::Late))
            .await
            .unwrap();

        let marks = service.list(AttendanceFilter::All).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].status, AttendanceStatus::Late);
        assert_eq!(marks[0].date.to_string(), "2024-03-01");
    }

    #[tokio::test]
    async fn test_record_rejects_foreign_student_and_bad_score() {
        let store = MemoryStore::default();
        let other = enrol(&store, UserId::new(2), "Zaid").await;
        let mine = enrol(&store, TEACHER, "Aisha").await;
        let service = AttendanceService::new(&store, &store, TEACHER);

        assert!(matches!(
            service
                .record(single(other.id, "2024-03-01", AttendanceStatus::Present))
                .await,
            Err(ServiceError::NotFound("Student"))
        ));

        let mut scored = single(mine.id, "2024-03-01", AttendanceStatus::Present);
        scored.notes.tajweed_score = Some(11);
        assert!(matches!(
            service.record(scored).await,
            Err(ServiceError::Validation(_))
        ));

        assert!(matches!(
            service
                .record(single(mine.id, "01/03/2024", AttendanceStatus::Present))
                .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_then_monthly_report() {
        let store = MemoryStore::default();
        let a = enrol(&store, TEACHER, "Aisha").await;
        let b = enrol(&store, TEACHER, "Bilal").await;
        let c = enrol(&store, TEACHER, "Dawud").await;
        let service = AttendanceService::new(&store, &store, TEACHER);

        let count = service
            .record_bulk(bulk("2024-03-01", &[a.id, b.id, c.id]))
            .await
            .unwrap();
        assert_eq!(count, 3);

        let report = service.monthly_report(3, 2024).await.unwrap();
        assert_eq!(report.overview.total_present, 3);
        assert_eq!(report.overview.total_students, 3);
        assert!(report.student_reports.iter().all(|r| r.percentage == 100));

        let april = service.monthly_report(4, 2024).await.unwrap();
        assert_eq!(april.overview.total_records, 0);
        assert!(april.student_reports.iter().all(|r| r.percentage == 0));
    }

    #[tokio::test]
    async fn test_bulk_is_all_or_nothing() {
        let store = MemoryStore::default();
        let mine = enrol(&store, TEACHER, "Aisha").await;
        let foreign = enrol(&store, UserId::new(2), "Zaid").await;
        let service = AttendanceService::new(&store, &store, TEACHER);

        assert!(matches!(
            service.record_bulk(bulk("2024-03-01", &[mine.id, foreign.id])).await,
            Err(ServiceError::NotFound("Student"))
        ));
        assert!(service.list(AttendanceFilter::All).await.unwrap().is_empty());

        assert!(matches!(
            service.record_bulk(bulk("2024-03-01", &[])).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_report_validates_period() {
        let store = MemoryStore::default();
        let service = AttendanceService::new(&store, &store, TEACHER);

        assert!(matches!(
            service.monthly_report(13, 2024).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.monthly_report(1, 1999).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
