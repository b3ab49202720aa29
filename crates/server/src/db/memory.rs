//! In-memory storage backend.
//!
//! A single async mutex guards every table, and each repository call holds it
//! for the whole operation. That makes check-then-write sequences (unique
//! emails, bulk attendance) atomic without any further coordination.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use iqra_core::{
    AttendanceId, Email, PaymentStatus, RegistrationId, RegistrationStatus, Role, ScheduleId,
    StudentId, UserId,
};

use super::{
    AttendanceRepository, RegistrationRepository, RepositoryError, ScheduleRepository,
    StudentRepository, UserRepository,
};
use crate::models::{
    Attendance, AttendanceFilter, AttendanceMark, FeeTotal, NewRegistration, NewSchedule,
    NewStudent, NewUser, Registration, Schedule, Student, User,
};

/// Process-local store implementing every repository trait.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    students: Vec<Student>,
    attendance: Vec<Attendance>,
    schedules: Vec<Schedule>,
    registrations: Vec<Registration>,
    sequence: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }

    fn active_student(&self, teacher: UserId, id: StudentId) -> Option<&Student> {
        self.students
            .iter()
            .find(|s| s.id == id && s.teacher_id == teacher && s.is_active)
    }

    /// Uniqueness only binds active entries; a removed email may be re-added.
    fn roster_has_active_email(
        &self,
        teacher: UserId,
        email: &Email,
        except: Option<StudentId>,
    ) -> bool {
        self.students.iter().any(|s| {
            s.teacher_id == teacher && &s.email == email && s.is_active && Some(s.id) != except
        })
    }

    fn roster_ever_had_email(&self, teacher: UserId, email: &Email) -> bool {
        self.students
            .iter()
            .any(|s| s.teacher_id == teacher && &s.email == email)
    }

    fn insert_student(&mut self, new: NewStudent) -> Student {
        let now = Utc::now();
        let student = Student {
            id: StudentId::new(self.next_id()),
            teacher_id: new.teacher_id,
            user_id: new.user_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            age: new.age,
            course: new.course,
            paras_completed: new.paras_completed,
            current_surah: new.current_surah,
            preferred_days: new.preferred_days,
            preferred_time: new.preferred_time,
            monthly_fee: new.monthly_fee,
            payment_status: new.payment_status,
            notes: new.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.students.push(student.clone());
        student
    }

    fn upsert_mark(&mut self, teacher: UserId, mark: &AttendanceMark) -> Attendance {
        let now = Utc::now();
        if let Some(existing) = self.attendance.iter_mut().find(|a| {
            a.student_id == mark.student_id && a.teacher_id == teacher && a.date == mark.date
        }) {
            existing.status = mark.status;
            existing.notes.clone_from(&mark.notes.notes);
            existing.surah.clone_from(&mark.notes.surah);
            existing.ayahs.clone_from(&mark.notes.ayahs);
            existing.tajweed_score = mark.notes.tajweed_score;
            existing.updated_at = now;
            return existing.clone();
        }

        let created = Attendance {
            id: AttendanceId::new(self.next_id()),
            student_id: mark.student_id,
            teacher_id: teacher,
            date: mark.date,
            status: mark.status,
            notes: mark.notes.notes.clone(),
            surah: mark.notes.surah.clone(),
            ayahs: mark.notes.ayahs.clone(),
            tajweed_score: mark.notes.tajweed_score,
            created_at: now,
            updated_at: now,
        };
        self.attendance.push(created.clone());
        created
    }
}

fn take(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_id()),
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            country: user.country,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.push((created.clone(), user.password_hash));
        Ok(created)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.get_with_password_hash(email).await?.map(|(u, _)| u))
    }

    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|(u, _)| &u.email == email).cloned())
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let (user, hash) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        password_hash.clone_into(hash);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate(&self, id: UserId) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let (user, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.is_active = false;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_active_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|(u, _)| u.role == role && u.is_active)
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn count_active_by_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let active = self.list_active_by_role(role).await?;
        Ok(i64::try_from(active.len()).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn create(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.roster_has_active_email(student.teacher_id, &student.email, None) {
            return Err(RepositoryError::Conflict(
                "student with this email already exists".to_owned(),
            ));
        }
        Ok(tables.insert_student(student))
    }

    async fn create_if_absent(
        &self,
        student: NewStudent,
    ) -> Result<Option<Student>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.roster_ever_had_email(student.teacher_id, &student.email) {
            return Ok(None);
        }
        Ok(Some(tables.insert_student(student)))
    }

    async fn get(
        &self,
        teacher: UserId,
        id: StudentId,
    ) -> Result<Option<Student>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.active_student(teacher, id).cloned())
    }

    async fn list_active(&self, teacher: UserId) -> Result<Vec<Student>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut students: Vec<Student> = tables
            .students
            .iter()
            .filter(|s| s.teacher_id == teacher && s.is_active)
            .cloned()
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(students)
    }

    async fn save(&self, student: &Student) -> Result<Student, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.active_student(student.teacher_id, student.id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        if tables.roster_has_active_email(student.teacher_id, &student.email, Some(student.id)) {
            return Err(RepositoryError::Conflict(
                "student with this email already exists".to_owned(),
            ));
        }

        let stored = tables
            .students
            .iter_mut()
            .find(|s| s.id == student.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = Student {
            is_active: true,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..student.clone()
        };
        Ok(stored.clone())
    }

    async fn deactivate(&self, teacher: UserId, id: StudentId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let student = tables
            .students
            .iter_mut()
            .find(|s| s.id == id && s.teacher_id == teacher && s.is_active)
            .ok_or(RepositoryError::NotFound)?;
        student.is_active = false;
        student.updated_at = Utc::now();
        Ok(())
    }

    async fn count_active(&self) -> Result<i64, RepositoryError> {
        let tables = self.tables.lock().await;
        let count = tables.students.iter().filter(|s| s.is_active).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn fee_totals(&self) -> Result<Vec<FeeTotal>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut totals: Vec<FeeTotal> = Vec::new();

        for student in tables.students.iter().filter(|s| s.is_active) {
            match totals
                .iter_mut()
                .find(|t| t.payment_status == student.payment_status)
            {
                Some(total) => {
                    total.students += 1;
                    total.amount += i64::from(student.monthly_fee);
                }
                None => totals.push(FeeTotal {
                    payment_status: student.payment_status,
                    students: 1,
                    amount: i64::from(student.monthly_fee),
                }),
            }
        }

        totals.sort_by_key(|t| t.payment_status);
        Ok(totals)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryStore {
    async fn upsert(
        &self,
        teacher: UserId,
        mark: AttendanceMark,
    ) -> Result<Attendance, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.active_student(teacher, mark.student_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(tables.upsert_mark(teacher, &mark))
    }

    async fn upsert_batch(
        &self,
        teacher: UserId,
        marks: &[AttendanceMark],
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if marks
            .iter()
            .any(|m| tables.active_student(teacher, m.student_id).is_none())
        {
            return Err(RepositoryError::NotFound);
        }
        for mark in marks {
            tables.upsert_mark(teacher, mark);
        }
        Ok(marks.len())
    }

    async fn list(
        &self,
        teacher: UserId,
        filter: AttendanceFilter,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut marks: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| a.teacher_id == teacher && filter.matches(a))
            .cloned()
            .collect();
        marks.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(marks)
    }

    async fn in_range(
        &self,
        teacher: UserId,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut marks: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| a.teacher_id == teacher && (first..=last).contains(&a.date))
            .cloned()
            .collect();
        marks.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(marks)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Attendance>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut marks = tables.attendance.clone();
        marks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        marks.truncate(take(limit));
        Ok(marks)
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn create(&self, schedule: NewSchedule) -> Result<Schedule, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let created = Schedule {
            id: ScheduleId::new(tables.next_id()),
            teacher_id: schedule.teacher_id,
            student_id: schedule.student_id,
            day_of_week: schedule.day_of_week,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            session_type: schedule.session_type,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.schedules.push(created.clone());
        Ok(created)
    }

    async fn get(
        &self,
        teacher: UserId,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .schedules
            .iter()
            .find(|s| s.id == id && s.teacher_id == teacher && s.is_active)
            .cloned())
    }

    async fn list_active(&self, teacher: UserId) -> Result<Vec<Schedule>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut slots: Vec<Schedule> = tables
            .schedules
            .iter()
            .filter(|s| s.teacher_id == teacher && s.is_active)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day_of_week, s.start_time, s.id));
        Ok(slots)
    }

    async fn save(&self, schedule: &Schedule) -> Result<Schedule, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule.id && s.teacher_id == schedule.teacher_id && s.is_active)
            .ok_or(RepositoryError::NotFound)?;
        *stored = Schedule {
            is_active: true,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..schedule.clone()
        };
        Ok(stored.clone())
    }

    async fn deactivate(&self, teacher: UserId, id: ScheduleId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .schedules
            .iter_mut()
            .find(|s| s.id == id && s.teacher_id == teacher && s.is_active)
            .ok_or(RepositoryError::NotFound)?;
        slot.is_active = false;
        slot.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .registrations
            .iter()
            .any(|r| r.email == registration.email && r.course_id == registration.course_id)
        {
            return Err(RepositoryError::Conflict(
                "already registered for this course".to_owned(),
            ));
        }

        let created = Registration {
            id: RegistrationId::new(tables.next_id()),
            name: registration.name,
            email: registration.email,
            age: registration.age,
            course_id: registration.course_id,
            course_name: registration.course_name,
            hifz_paras_completed: registration.hifz_paras_completed,
            user_id: registration.user_id,
            phone: registration.phone,
            amount: registration.amount,
            payment_status: PaymentStatus::Pending,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
        };
        tables.registrations.push(created.clone());
        Ok(created)
    }

    async fn list_for(
        &self,
        user: UserId,
        email: &Email,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut found: Vec<Registration> = tables
            .registrations
            .iter()
            .filter(|r| r.user_id == Some(user) || &r.email == email)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(i64::try_from(tables.registrations.len()).unwrap_or(i64::MAX))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Registration>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut found = tables.registrations.clone();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        found.truncate(take(limit));
        Ok(found)
    }
}
