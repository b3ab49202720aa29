//! Status and classification enums for academy records.
//!
//! Every enum serializes in the form the front end sends, and with the
//! `postgres` feature maps to a Postgres enum type of the same name.

use serde::{Deserialize, Serialize};

/// Generates `as_str`, `Display`, and `FromStr` for a fieldless enum.
macro_rules! string_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Name used on the wire and in the database.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| format!(concat!("invalid ", $label, ": {}"), s))
            }
        }
    };
}

/// Attendance mark for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "attendance_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    /// Counts as attended in report percentages.
    Late,
    /// Counts toward the total but not as attended.
    Excused,
}

string_enum!(AttendanceStatus, "attendance status" {
    Present => "present",
    Absent => "absent",
    Late => "late",
    Excused => "excused",
});

impl AttendanceStatus {
    /// Whether this mark counts toward the attendance percentage numerator.
    #[must_use]
    pub const fn is_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// Fee payment status on a roster entry or registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

string_enum!(PaymentStatus, "payment status" {
    Pending => "pending",
    Paid => "paid",
    Overdue => "overdue",
});

/// Lifecycle of a public course registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "registration_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

string_enum!(RegistrationStatus, "registration status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

/// Study track a student follows.
///
/// Serialized with its display name (`"Hifz"`), which is what the roster UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "course_track", rename_all = "snake_case")
)]
pub enum CourseTrack {
    /// Arabic letters and pronunciation basics.
    #[default]
    Qaida,
    /// Reading the mushaf fluently.
    Nazra,
    /// Memorisation.
    Hifz,
    /// Recitation rules.
    Tajweed,
}

string_enum!(CourseTrack, "course track" {
    Qaida => "Qaida",
    Nazra => "Nazra",
    Hifz => "Hifz",
    Tajweed => "Tajweed",
});

/// Day of the week for recurring class slots.
///
/// Ordered Monday first so schedules sort into a teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "weekday", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

string_enum!(Weekday, "day of week" {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Kind of class held in a schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "session_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Regular,
    Revision,
    Assessment,
    Trial,
}

string_enum!(SessionType, "session type" {
    Regular => "regular",
    Revision => "revision",
    Assessment => "assessment",
    Trial => "trial",
});
