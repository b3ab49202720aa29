//! Business logic services.
//!
//! Services borrow the repositories they need for the length of one request
//! and hold no state of their own. Teacher-scoped services are constructed
//! with the teacher's id, so every read and write they perform is limited to
//! that teacher's records.
//!
//! # Services
//!
//! - `auth` - Signup, login and password changes
//! - `roster` - A teacher's students
//! - `schedules` - A teacher's weekly class slots
//! - `attendance` - Attendance marks and monthly reports
//! - `dashboard` - Teacher dashboard summary
//! - `registration` - Public course registration
//! - `events` / `roster_projection` - Registration fan-out to rosters
//! - `admin` - Academy overview and account deactivation

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod registration;
pub mod roster;
pub mod roster_projection;
pub mod schedules;

pub use admin::{AdminOverview, AdminService, access_key_matches};
pub use attendance::AttendanceService;
pub use auth::{AuthError, AuthService, Signup};
pub use dashboard::{TeacherDashboard, teacher_dashboard};
pub use error::ServiceError;
pub use events::{AcademyEvent, EventBus, Projection};
pub use registration::RegistrationService;
pub use roster::RosterService;
pub use roster_projection::RosterProjection;
pub use schedules::ScheduleService;
