//! Iqra Academy Core - Shared domain library.
//!
//! This crate provides the types used across all Iqra Academy components:
//! - `server` - REST API for students, teachers, and admins
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and emails, roles, status enums, the course catalog
//! - [`report`] - Monthly attendance aggregation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod report;
pub mod types;

pub use report::{
    AttendanceTally, MonthlyReport, PeriodError, ReportMark, ReportOverview, ReportPeriod,
    ReportStudent, StudentReport,
};
pub use types::*;
