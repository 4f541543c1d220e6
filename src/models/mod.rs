//! Allocation domain models.
//!
//! Core data types: the recurring [`TimeSlot`], the [`Student`] who needs
//! lab hours and the capacity-bounded [`SessionGroup`] that grants them.
//!
//! # Ownership
//!
//! Students and groups refer to each other through arena indices
//! ([`StudentIdx`], [`SessionIdx`]) rather than pointers. The
//! [`StudentRoster`] owns students; the session registry owns groups.
//!
//! | Type | Role |
//! |------|------|
//! | `TimeSlot` | weeks × weekday × period range |
//! | `Student` | required hours, busy slots, assignments |
//! | `SessionGroup` | capacity, credit hours, occupation, enrollment |

mod notation;
mod session;
mod student;
mod time_slot;

pub use notation::{
    format_weeks, parse_period_range, parse_weekday, parse_weeks, weekday_label, MAX_WEEK,
};
pub(crate) use notation::parse_integral;
pub use session::{SessionGroup, SessionIdx};
pub use student::{Student, StudentIdx, StudentRoster};
pub use time_slot::{overlaps, TimeSlot};
