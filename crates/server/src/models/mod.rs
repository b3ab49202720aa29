//! Domain models for the academy API.
//!
//! Models are the validated, serializable shapes that services return and
//! routes render. Database row types stay private to `crate::db`.

pub mod attendance;
pub mod registration;
pub mod schedule;
pub mod session;
pub mod student;
pub mod user;

pub use attendance::{Attendance, AttendanceFilter, AttendanceMark, LessonNotes};
pub use registration::{NewRegistration, Registration};
pub use schedule::{NewSchedule, Schedule, ScheduleUpdate};
pub use session::{AuthenticatedSession, CurrentUser, Principal, keys as session_keys};
pub use student::{FeeTotal, NewStudent, Student, StudentUpdate};
pub use user::{NewUser, User};
