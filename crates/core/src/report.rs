//! Monthly attendance aggregation.
//!
//! Pure functions over already-loaded rows: callers fetch the teacher's active
//! students and the month's attendance marks, and [`MonthlyReport::build`]
//! tallies them. Keeping this free of I/O lets every storage backend share the
//! same arithmetic.
//!
//! # Percentage policy
//!
//! `percentage = round((present + late) / total * 100)`, rounding halves up.
//! `late` counts as attended; `excused` counts toward `total` only. A student
//! with no marks in the period reports `0`.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::types::{AttendanceStatus, CourseTrack, StudentId};

/// Errors constructing a [`ReportPeriod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("month must be between 1 and 12 (got {0})")]
    InvalidMonth(u32),
    #[error("year must be between 2000 and 2100 (got {year})")]
    InvalidYear { year: i32 },
}

/// A calendar month, as an inclusive day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    first: NaiveDate,
    last: NaiveDate,
}

impl ReportPeriod {
    pub const MIN_YEAR: i32 = 2000;
    pub const MAX_YEAR: i32 = 2100;

    /// Build the period for `month` (1-12) of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError`] if the month or year is out of range.
    pub fn new(month: u32, year: i32) -> Result<Self, PeriodError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(PeriodError::InvalidYear { year });
        }
        let first =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidMonth(month))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last = next_month
            .and_then(|d| d.pred_opt())
            .ok_or(PeriodError::InvalidMonth(month))?;

        Ok(Self { first, last })
    }

    /// The period containing `day`.
    #[must_use]
    pub fn containing(day: NaiveDate) -> Option<Self> {
        Self::new(day.month(), day.year()).ok()
    }

    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first
    }

    #[must_use]
    pub const fn last_day(&self) -> NaiveDate {
        self.last
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        (self.first..=self.last).contains(&day)
    }
}

/// Counts of attendance marks by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTally {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

impl AttendanceTally {
    /// Count one mark.
    pub const fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }

    /// Marks that count as attended (`present + late`).
    #[must_use]
    pub const fn attended(&self) -> u32 {
        self.present + self.late
    }

    /// All marks.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused
    }

    /// Attended share of all marks as a whole percentage, `0` when empty.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        rounded_percentage(self.attended(), self.total())
    }

    fn merge(&mut self, other: &Self) {
        self.present += other.present;
        self.absent += other.absent;
        self.late += other.late;
        self.excused += other.excused;
    }
}

/// `round(part / whole * 100)` with halves rounded up, in integer arithmetic.
fn rounded_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    let pct = (part * 200 + whole) / (whole * 2);
    u32::try_from(pct).unwrap_or(100)
}

/// A student to include in a report.
#[derive(Debug, Clone)]
pub struct ReportStudent {
    pub id: StudentId,
    pub name: String,
    pub course: CourseTrack,
}

/// One attendance row, reduced to what aggregation needs.
#[derive(Debug, Clone, Copy)]
pub struct ReportMark {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Per-student line of a monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_id: StudentId,
    pub name: String,
    pub course: CourseTrack,
    #[serde(flatten)]
    pub tally: AttendanceTally,
    pub total: u32,
    pub percentage: u32,
}

/// Teacher-wide totals, summed across student lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOverview {
    pub month: u32,
    pub year: i32,
    pub total_students: u32,
    pub total_present: u32,
    pub total_absent: u32,
    pub total_late: u32,
    pub total_excused: u32,
    pub total_records: u32,
    /// Same policy as the per-student percentage, over all marks.
    pub attendance_rate: u32,
}

/// Attendance report for one teacher and one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub overview: ReportOverview,
    pub student_reports: Vec<StudentReport>,
}

impl MonthlyReport {
    /// Tally `marks` for `students` within `period`.
    ///
    /// Student lines keep the order of `students`. Marks outside the period,
    /// or for students not in the list, are ignored.
    #[must_use]
    pub fn build(
        period: ReportPeriod,
        students: Vec<ReportStudent>,
        marks: impl IntoIterator<Item = ReportMark>,
    ) -> Self {
        let mut tallies: HashMap<StudentId, AttendanceTally> =
            students.iter().map(|s| (s.id, AttendanceTally::default())).collect();

        for mark in marks {
            if !period.contains(mark.date) {
                continue;
            }
            if let Some(tally) = tallies.get_mut(&mark.student_id) {
                tally.record(mark.status);
            }
        }

        let mut totals = AttendanceTally::default();
        let student_reports: Vec<StudentReport> = students
            .into_iter()
            .map(|student| {
                let tally = tallies.get(&student.id).copied().unwrap_or_default();
                totals.merge(&tally);
                StudentReport {
                    student_id: student.id,
                    name: student.name,
                    course: student.course,
                    tally,
                    total: tally.total(),
                    percentage: tally.percentage(),
                }
            })
            .collect();

        let overview = ReportOverview {
            month: period.month(),
            year: period.year(),
            total_students: u32::try_from(student_reports.len()).unwrap_or(u32::MAX),
            total_present: totals.present,
            total_absent: totals.absent,
            total_late: totals.late,
            total_excused: totals.excused,
            total_records: totals.total(),
            attendance_rate: totals.percentage(),
        };

        Self {
            overview,
            student_reports,
        }
    }
}
