//! Teacher dashboard summary.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use iqra_core::{UserId, Weekday};

use super::error::ServiceError;
use crate::db::{AttendanceRepository, ScheduleRepository, StudentRepository};
use crate::models::{AttendanceFilter, Schedule};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub total_students: usize,
    pub weekly_classes: usize,
    pub today_marked: usize,
    pub today_present: usize,
    /// Active slots falling on today's weekday, earliest first.
    pub today_classes: Vec<Schedule>,
}

/// Build the dashboard for `teacher` as of `today`.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if storage fails.
#[tracing::instrument(skip(students, schedules, attendance), fields(teacher_id = %teacher))]
pub async fn teacher_dashboard(
    students: &dyn StudentRepository,
    schedules: &dyn ScheduleRepository,
    attendance: &dyn AttendanceRepository,
    teacher: UserId,
    today: NaiveDate,
) -> Result<TeacherDashboard, ServiceError> {
    let roster = students.list_active(teacher).await?;
    let week = schedules.list_active(teacher).await?;
    let marks = attendance
        .list(teacher, AttendanceFilter::OnDate(today))
        .await?;

    let weekday = Weekday::from(today.weekday());
    let weekly_classes = week.len();
    let today_classes: Vec<Schedule> = week
        .into_iter()
        .filter(|s| s.day_of_week == weekday)
        .collect();

    Ok(TeacherDashboard {
        total_students: roster.len(),
        weekly_classes,
        today_marked: marks.len(),
        today_present: marks.iter().filter(|m| m.status.is_attended()).count(),
        today_classes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveTime;
    use iqra_core::{AttendanceStatus, CourseTrack, Email, PaymentStatus, SessionType};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{AttendanceMark, LessonNotes, NewSchedule, NewStudent};

    const TEACHER: UserId = UserId::new(7);

    fn slot(day: Weekday, hour: u32) -> NewSchedule {
        NewSchedule {
            teacher_id: TEACHER,
            student_id: None,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            session_type: SessionType::Regular,
        }
    }

    #[tokio::test]
    async fn test_dashboard_counts_today() {
        let store = MemoryStore::default();
        // 2024-03-04 is a Monday.
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        let mut ids = Vec::new();
        for name in ["amina", "yusuf"] {
            let student = StudentRepository::create(
                &store,
                NewStudent {
                    teacher_id: TEACHER,
                    user_id: None,
                    name: name.to_owned(),
                    email: Email::parse(&format!("{name}@example.com")).unwrap(),
                    phone: None,
                    age: Some(9),
                    course: CourseTrack::Qaida,
                    paras_completed: 0,
                    current_surah: None,
                    preferred_days: vec![Weekday::Monday],
                    preferred_time: None,
                    monthly_fee: 300,
                    payment_status: PaymentStatus::Pending,
                    notes: None,
                },
            )
            .await
            .unwrap();
            ids.push(student.id);
        }

        ScheduleRepository::create(&store, slot(Weekday::Monday, 16))
            .await
            .unwrap();
        ScheduleRepository::create(&store, slot(Weekday::Wednesday, 16))
            .await
            .unwrap();

        let marks: Vec<AttendanceMark> = ids
            .iter()
            .zip([AttendanceStatus::Late, AttendanceStatus::Absent])
            .map(|(id, status)| AttendanceMark {
                student_id: *id,
                date: today,
                status,
                notes: LessonNotes::default(),
            })
            .collect();
        AttendanceRepository::upsert_batch(&store, TEACHER, &marks)
            .await
            .unwrap();

        let dashboard = teacher_dashboard(&store, &store, &store, TEACHER, today)
            .await
            .unwrap();
        assert_eq!(dashboard.total_students, 2);
        assert_eq!(dashboard.weekly_classes, 2);
        assert_eq!(dashboard.today_marked, 2);
        assert_eq!(dashboard.today_present, 1);
        assert_eq!(dashboard.today_classes.len(), 1);
    }
}
