//! Weekly schedule management for teachers.

use chrono::NaiveTime;
use serde::Deserialize;

use iqra_core::{ScheduleId, SessionType, StudentId, UserId, Weekday, parse_class_time};

use super::error::{ServiceError, not_found_as};
use crate::db::{ScheduleRepository, StudentRepository};
use crate::models::{NewSchedule, Schedule, ScheduleUpdate};

/// A new class slot as sent by a teacher. Times are `HH:MM`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub student_id: Option<StudentId>,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub session_type: SessionType,
}

/// Schedule operations for one teacher.
pub struct ScheduleService<'a> {
    schedules: &'a dyn ScheduleRepository,
    students: &'a dyn StudentRepository,
    teacher: UserId,
}

impl<'a> ScheduleService<'a> {
    #[must_use]
    pub const fn new(
        schedules: &'a dyn ScheduleRepository,
        students: &'a dyn StudentRepository,
        teacher: UserId,
    ) -> Self {
        Self {
            schedules,
            students,
            teacher,
        }
    }

    /// Active slots, Monday first then by start time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list(&self) -> Result<Vec<Schedule>, ServiceError> {
        Ok(self.schedules.list_active(self.teacher).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad times,
    /// `ServiceError::NotFound` if the linked student is not on this roster.
    #[tracing::instrument(skip(self, input), fields(teacher_id = %self.teacher))]
    pub async fn create(&self, input: ScheduleInput) -> Result<Schedule, ServiceError> {
        let start_time = parse_class_time(&input.start_time)?;
        let end_time = parse_class_time(&input.end_time)?;
        check_order(start_time, end_time)?;
        self.check_student(input.student_id).await?;

        let created = self
            .schedules
            .create(NewSchedule {
                teacher_id: self.teacher,
                student_id: input.student_id,
                day_of_week: input.day_of_week,
                start_time,
                end_time,
                session_type: input.session_type,
            })
            .await?;
        tracing::info!(schedule_id = %created.id, "Class slot created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for a missing slot or foreign student,
    /// `ServiceError::Validation` for bad times.
    #[tracing::instrument(skip(self, update), fields(teacher_id = %self.teacher))]
    pub async fn update(
        &self,
        id: ScheduleId,
        update: ScheduleUpdate,
    ) -> Result<Schedule, ServiceError> {
        let mut slot = self
            .schedules
            .get(self.teacher, id)
            .await?
            .ok_or(ServiceError::NotFound("Schedule"))?;

        if let Some(raw) = update.start_time.as_deref() {
            slot.start_time = parse_class_time(raw)?;
        }
        if let Some(raw) = update.end_time.as_deref() {
            slot.end_time = parse_class_time(raw)?;
        }
        check_order(slot.start_time, slot.end_time)?;

        if update.student_id.is_some() {
            self.check_student(update.student_id).await?;
            slot.student_id = update.student_id;
        }
        if let Some(day) = update.day_of_week {
            slot.day_of_week = day;
        }
        if let Some(kind) = update.session_type {
            slot.session_type = kind;
        }

        self.schedules
            .save(&slot)
            .await
            .map_err(not_found_as("Schedule"))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless the slot is active and owned.
    #[tracing::instrument(skip(self), fields(teacher_id = %self.teacher))]
    pub async fn remove(&self, id: ScheduleId) -> Result<(), ServiceError> {
        self.schedules
            .deactivate(self.teacher, id)
            .await
            .map_err(not_found_as("Schedule"))
    }

    async fn check_student(&self, student: Option<StudentId>) -> Result<(), ServiceError> {
        if let Some(id) = student
            && self.students.get(self.teacher, id).await?.is_none()
        {
            return Err(ServiceError::NotFound("Student"));
        }
        Ok(())
    }
}

fn check_order(start: NaiveTime, end: NaiveTime) -> Result<(), ServiceError> {
    if start < end {
        Ok(())
    } else {
        Err(ServiceError::invalid("Start time must be before end time"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn slot(day: Weekday, start: &str, end: &str) -> ScheduleInput {
        ScheduleInput {
            student_id: None,
            day_of_week: day,
            start_time: start.to_owned(),
            end_time: end.to_owned(),
            session_type: SessionType::Regular,
        }
    }

    #[tokio::test]
    async fn test_slots_are_ordered_by_day_then_start() {
        let store = MemoryStore::default();
        let service = ScheduleService::new(&store, &store, UserId::new(1));

        service.create(slot(Weekday::Wednesday, "10:00", "10:30")).await.unwrap();
        service.create(slot(Weekday::Monday, "18:00", "18:45")).await.unwrap();
        service.create(slot(Weekday::Monday, "09:00", "09:45")).await.unwrap();

        let listed = service.list().await.unwrap();
        let order: Vec<_> = listed
            .iter()
            .map(|s| (s.day_of_week, s.start_time.format("%H:%M").to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Weekday::Monday, "09:00".to_owned()),
                (Weekday::Monday, "18:00".to_owned()),
                (Weekday::Wednesday, "10:00".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_start_must_precede_end() {
        let store = MemoryStore::default();
        let service = ScheduleService::new(&store, &store, UserId::new(1));

        assert!(matches!(
            service.create(slot(Weekday::Monday, "10:00", "10:00")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create(slot(Weekday::Monday, "10:00", "9am")).await,
            Err(ServiceError::Validation(_))
        ));

        let created = service.create(slot(Weekday::Monday, "10:00", "11:00")).await.unwrap();
        assert!(matches!(
            service
                .update(
                    created.id,
                    ScheduleUpdate {
                        end_time: Some("09:30".to_owned()),
                        ..ScheduleUpdate::default()
                    },
                )
                .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_linked_student_must_be_on_roster() {
        let store = MemoryStore::default();
        let service = ScheduleService::new(&store, &store, UserId::new(1));

        let mut input = slot(Weekday::Friday, "16:00", "16:30");
        input.student_id = Some(StudentId::new(999));
        assert!(matches!(
            service.create(input).await,
            Err(ServiceError::NotFound("Student"))
        ));
    }

    #[tokio::test]
    async fn test_remove_hides_slot() {
        let store = MemoryStore::default();
        let service = ScheduleService::new(&store, &store, UserId::new(1));
        let created = service.create(slot(Weekday::Sunday, "08:00", "08:30")).await.unwrap();

        service.remove(created.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.remove(created.id).await,
            Err(ServiceError::NotFound("Schedule"))
        ));
    }
}
