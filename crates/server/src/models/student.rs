//! Roster entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iqra_core::{CourseTrack, Email, PaymentStatus, StudentId, UserId, Weekday};

/// A learner on one teacher's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    /// Owning teacher.
    pub teacher_id: UserId,
    /// Linked account, when the learner has one.
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub course: CourseTrack,
    pub paras_completed: i32,
    pub current_surah: Option<String>,
    pub preferred_days: Vec<Weekday>,
    pub preferred_time: Option<String>,
    pub monthly_fee: i32,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated roster entry ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub teacher_id: UserId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub course: CourseTrack,
    pub paras_completed: i32,
    pub current_surah: Option<String>,
    pub preferred_days: Vec<Weekday>,
    pub preferred_time: Option<String>,
    pub monthly_fee: i32,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// Partial update sent by a teacher. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub course: Option<CourseTrack>,
    pub paras_completed: Option<i32>,
    pub current_surah: Option<String>,
    pub preferred_days: Option<Vec<Weekday>>,
    pub preferred_time: Option<String>,
    pub monthly_fee: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

impl Student {
    /// Overwrite the fields present in `update`.
    pub fn apply(&mut self, update: StudentUpdate) {
        let StudentUpdate {
            name,
            email,
            phone,
            age,
            course,
            paras_completed,
            current_surah,
            preferred_days,
            preferred_time,
            monthly_fee,
            payment_status,
            notes,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        if age.is_some() {
            self.age = age;
        }
        if let Some(course) = course {
            self.course = course;
        }
        if let Some(paras) = paras_completed {
            self.paras_completed = paras;
        }
        if current_surah.is_some() {
            self.current_surah = current_surah;
        }
        if let Some(days) = preferred_days {
            self.preferred_days = days;
        }
        if preferred_time.is_some() {
            self.preferred_time = preferred_time;
        }
        if let Some(fee) = monthly_fee {
            self.monthly_fee = fee;
        }
        if let Some(status) = payment_status {
            self.payment_status = status;
        }
        if notes.is_some() {
            self.notes = notes;
        }
    }
}

/// Sum of monthly fees for active students in one payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTotal {
    pub payment_status: PaymentStatus,
    pub students: i64,
    pub amount: i64,
}
