//! Staffing and booking coordinator.
//!
//! Owns the per-role booking slots on contracts, the one-event-per-day
//! exclusivity rule and the derived availability cache.

pub mod availability;
pub mod coordinator;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{
    assign_role, change_booking_status, mark_availability, remove_booking, staff_availability,
    Assignment,
};
