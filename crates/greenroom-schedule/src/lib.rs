//! Pure scheduling domain for greenroom: weekly availability templates,
//! timezone-correct slot expansion, and ICS serialization.
//!
//! Nothing in this crate performs I/O. Slot computation is a deterministic
//! function of a template and a point in time, so callers recompute on every
//! request instead of caching.

pub mod error;
pub mod ics;
pub mod slots;
pub mod template;
pub mod tz;

pub use error::{ScheduleError, ScheduleResult};
pub use slots::{Slot, compute_slots, datetime_in_slots};
pub use template::{AvailabilityTemplate, DayWindow};
