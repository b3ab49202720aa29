//! Core types for Iqra Academy.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod course;
pub mod day;
pub mod email;
pub mod id;
pub mod role;
pub mod status;

pub use course::{CATALOG, Course, CourseLevel};
pub use day::{DayError, normalize_day, parse_class_time};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use status::*;
