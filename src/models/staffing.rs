//! Staff roster, booking slots and availability rows

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::catalog::ServiceType;

/// Role slot on a contract. Each role has exactly one denormalized staff
/// field on the contract (see [`StaffSlots`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Photographer1,
    Photographer2,
    Videographer1,
    Videographer2,
    Dj1,
    Dj2,
    PhotoboothOperator1,
    PhotoboothOperator2,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Photographer1,
        Role::Photographer2,
        Role::Videographer1,
        Role::Videographer2,
        Role::Dj1,
        Role::Dj2,
        Role::PhotoboothOperator1,
        Role::PhotoboothOperator2,
    ];

    /// Service line this role works on; used to attribute overtime.
    pub fn service_type(self) -> ServiceType {
        match self {
            Role::Photographer1 | Role::Photographer2 => ServiceType::Photography,
            Role::Videographer1 | Role::Videographer2 => ServiceType::Videography,
            Role::Dj1 | Role::Dj2 => ServiceType::Dj,
            Role::PhotoboothOperator1 | Role::PhotoboothOperator2 => ServiceType::Photobooth,
        }
    }
}

/// Booking lifecycle for one (contract, role) slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Prospect,
    Pending,
    Booked,
    Confirmed,
    Cleared,
    Declined,
}

impl BookingStatus {
    /// Whether a booking in this status blocks the staff member's event date.
    pub fn holds_date(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Booked)
    }

    /// Whether the booking still occupies its contract slot.
    ///
    /// Cleared and declined bookings stay on record but no longer populate
    /// the contract's denormalized staff field.
    pub fn occupies_slot(self) -> bool {
        !matches!(self, BookingStatus::Cleared | BookingStatus::Declined)
    }

    /// Statuses a fresh assignment may start in.
    pub fn is_initial(self) -> bool {
        matches!(
            self,
            BookingStatus::Prospect | BookingStatus::Pending | BookingStatus::Booked
        )
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Prospect, Pending)
                | (Prospect, Cleared)
                | (Pending, Booked)
                | (Pending, Declined)
                | (Pending, Cleared)
                | (Booked, Confirmed)
                | (Booked, Cleared)
                | (Confirmed, Cleared)
        )
    }
}

/// Staff assignment for one role on one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStaffBooking {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub role: Role,
    pub staff_id: Uuid,
    pub status: BookingStatus,
    pub confirmed: bool,
    pub hours_booked: Decimal,
}

/// Denormalized staff fields on the contract.
///
/// A cache of the booking records: every booking mutation writes the
/// matching field in the same unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSlots {
    pub photographer1: Option<Uuid>,
    pub photographer2: Option<Uuid>,
    pub videographer1: Option<Uuid>,
    pub videographer2: Option<Uuid>,
    pub dj1: Option<Uuid>,
    pub dj2: Option<Uuid>,
    pub photobooth_operator1: Option<Uuid>,
    pub photobooth_operator2: Option<Uuid>,
}

impl StaffSlots {
    fn field_mut(&mut self, role: Role) -> &mut Option<Uuid> {
        match role {
            Role::Photographer1 => &mut self.photographer1,
            Role::Photographer2 => &mut self.photographer2,
            Role::Videographer1 => &mut self.videographer1,
            Role::Videographer2 => &mut self.videographer2,
            Role::Dj1 => &mut self.dj1,
            Role::Dj2 => &mut self.dj2,
            Role::PhotoboothOperator1 => &mut self.photobooth_operator1,
            Role::PhotoboothOperator2 => &mut self.photobooth_operator2,
        }
    }

    pub fn get(&self, role: Role) -> Option<Uuid> {
        match role {
            Role::Photographer1 => self.photographer1,
            Role::Photographer2 => self.photographer2,
            Role::Videographer1 => self.videographer1,
            Role::Videographer2 => self.videographer2,
            Role::Dj1 => self.dj1,
            Role::Dj2 => self.dj2,
            Role::PhotoboothOperator1 => self.photobooth_operator1,
            Role::PhotoboothOperator2 => self.photobooth_operator2,
        }
    }

    pub fn set(&mut self, role: Role, staff_id: Option<Uuid>) {
        *self.field_mut(role) = staff_id;
    }

    /// Staff ids currently written into any slot
    pub fn assigned(&self) -> Vec<(Role, Uuid)> {
        Role::ALL
            .iter()
            .filter_map(|role| self.get(*role).map(|staff| (*role, staff)))
            .collect()
    }
}

/// Staff roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    /// Weekdays the staff member never works
    pub off_days: Vec<Weekday>,
}

/// Cached availability for one staff member on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    /// Explicit "can't work that day" mark entered by the office
    pub marked_unavailable: bool,
    pub available: bool,
}
