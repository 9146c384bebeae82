//! Response DTOs for booking and availability endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AvailabilityRow, BookingStatus, EventStaffBooking, Role};

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub role: Role,
    pub staff_id: Uuid,
    pub status: BookingStatus,
    pub confirmed: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub hours_booked: Decimal,
}

impl From<EventStaffBooking> for BookingResponse {
    fn from(booking: EventStaffBooking) -> Self {
        Self {
            id: booking.id,
            contract_id: booking.contract_id,
            role: booking.role,
            staff_id: booking.staff_id,
            status: booking.status,
            confirmed: booking.confirmed,
            hours_booked: booking.hours_booked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub marked_unavailable: bool,
    pub available: bool,
}

impl From<AvailabilityRow> for AvailabilityResponse {
    fn from(row: AvailabilityRow) -> Self {
        Self {
            staff_id: row.staff_id,
            date: row.date,
            marked_unavailable: row.marked_unavailable,
            available: row.available,
        }
    }
}
