//! Static course catalog.
//!
//! Courses are not stored in the database; the academy's offerings change
//! rarely enough that they ship with the binary.

use serde::Serialize;

use super::status::CourseTrack;

/// Target learner level for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// A catalog offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// URL-safe identifier used by registrations.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Track assigned to roster entries created from a registration.
    pub track: CourseTrack,
    pub level: CourseLevel,
    /// Monthly price in whole currency units.
    pub price: i32,
    /// Maximum students per cohort.
    pub capacity: u16,
    pub duration_weeks: u16,
}

/// Every course the academy offers.
pub const CATALOG: &[Course] = &[
    Course {
        id: "noorani-qaida",
        name: "Noorani Qaida Foundations",
        description: "Letters, vowels and joining rules for learners starting from zero.",
        track: CourseTrack::Qaida,
        level: CourseLevel::Beginner,
        price: 300,
        capacity: 25,
        duration_weeks: 12,
    },
    Course {
        id: "fluent-recitation",
        name: "Fluent Quran Reading",
        description: "Guided reading of the mushaf with a focus on fluency and correct stops.",
        track: CourseTrack::Nazra,
        level: CourseLevel::Beginner,
        price: 350,
        capacity: 20,
        duration_weeks: 16,
    },
    Course {
        id: "pearls-of-juz-amma",
        name: "Pearls of Juz Amma",
        description: "Memorise the thirtieth juz with daily revision and weekly assessments.",
        track: CourseTrack::Hifz,
        level: CourseLevel::Intermediate,
        price: 450,
        capacity: 15,
        duration_weeks: 24,
    },
    Course {
        id: "tajweed-mastery",
        name: "Tajweed Mastery",
        description: "Makharij, sifaat and the rules of noon, meem and madd, applied in recitation.",
        track: CourseTrack::Tajweed,
        level: CourseLevel::Intermediate,
        price: 500,
        capacity: 15,
        duration_weeks: 20,
    },
    Course {
        id: "complete-hifz",
        name: "Complete Hifz Programme",
        description: "One-to-one memorisation of the whole Quran with structured sabaq and manzil.",
        track: CourseTrack::Hifz,
        level: CourseLevel::Advanced,
        price: 800,
        capacity: 8,
        duration_weeks: 156,
    },
];

impl Course {
    /// Look up a course by its identifier.
    #[must_use]
    pub fn find(id: &str) -> Option<&'static Self> {
        CATALOG.iter().find(|course| course.id == id)
    }
}
