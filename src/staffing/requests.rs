//! Request DTOs for booking and availability endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::BookingStatus;

use super::services::Assignment;

fn default_status() -> BookingStatus {
    BookingStatus::Prospect
}

/// Request to put a staff member on a role slot
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub staff_id: Uuid,
    #[serde(default = "default_status")]
    pub status: BookingStatus,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub hours_booked: Option<Decimal>,
}

impl From<AssignRoleRequest> for Assignment {
    fn from(request: AssignRoleRequest) -> Self {
        Self {
            staff_id: request.staff_id,
            status: request.status,
            hours_booked: request.hours_booked,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct MarkAvailabilityRequest {
    pub unavailable: bool,
}
