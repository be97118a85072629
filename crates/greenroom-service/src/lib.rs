//! Business services for greenroom: invite tokens, the booking flow,
//! availability persistence, admin key checks, and outbound notifications.

pub mod admin;
pub mod availability;
pub mod booking;
pub mod error;
pub mod notify;
pub mod token;
