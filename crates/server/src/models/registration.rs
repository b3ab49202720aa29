//! Public course registrations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use iqra_core::{Email, PaymentStatus, RegistrationId, RegistrationStatus, UserId};

/// A registration for a catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub name: String,
    pub email: Email,
    pub age: i32,
    pub course_id: String,
    pub course_name: String,
    pub hifz_paras_completed: i32,
    pub user_id: Option<UserId>,
    pub phone: Option<String>,
    /// Course price at the time of registration.
    pub amount: i32,
    pub payment_status: PaymentStatus,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated registration ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub email: Email,
    pub age: i32,
    pub course_id: String,
    pub course_name: String,
    pub hifz_paras_completed: i32,
    pub user_id: Option<UserId>,
    pub phone: Option<String>,
    pub amount: i32,
}
