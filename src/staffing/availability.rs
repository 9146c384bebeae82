//! Availability derivation.
//!
//! The stored availability row is a cache. It is always recomputed from the
//! explicit mark, the staff member's off days and the live booking set,
//! never toggled in place.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::models::{AvailabilityRow, EventStaffBooking, StaffMember};

/// Whether `date` is one of the staff member's permanent off days
pub fn is_off_day(member: &StaffMember, date: NaiveDate) -> bool {
    member.off_days.contains(&date.weekday())
}

/// Whether any of `bookings` blocks the date
pub fn holds_date(bookings: &[EventStaffBooking]) -> bool {
    bookings.iter().any(|b| b.status.holds_date())
}

/// Derive the availability row for one staff member and date.
///
/// `bookings` must be the staff member's bookings on contracts whose event
/// date is `date`.
pub fn derive(
    staff_id: Uuid,
    member: Option<&StaffMember>,
    date: NaiveDate,
    marked_unavailable: bool,
    bookings: &[EventStaffBooking],
) -> AvailabilityRow {
    let off_day = member.is_some_and(|m| is_off_day(m, date));

    AvailabilityRow {
        staff_id,
        date,
        marked_unavailable,
        available: !marked_unavailable && !off_day && !holds_date(bookings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, Role};
    use chrono::Weekday;
    use rust_decimal::Decimal;

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn member(off_days: Vec<Weekday>) -> StaffMember {
        StaffMember {
            id: Uuid::new_v4(),
            name: "Jordan".to_string(),
            off_days,
        }
    }

    fn booking(staff_id: Uuid, status: BookingStatus) -> EventStaffBooking {
        EventStaffBooking {
            id: Uuid::new_v4(),
            contract_id: Uuid::new_v4(),
            role: Role::Photographer1,
            staff_id,
            status,
            confirmed: false,
            hours_booked: Decimal::ZERO,
        }
    }

    #[test]
    fn test_free_staff_is_available() {
        let m = member(vec![]);
        let row = derive(m.id, Some(&m), saturday(), false, &[]);
        assert!(row.available);
        assert!(!row.marked_unavailable);
    }

    #[test]
    fn test_explicit_mark_blocks() {
        let m = member(vec![]);
        assert!(!derive(m.id, Some(&m), saturday(), true, &[]).available);
    }

    #[test]
    fn test_off_day_blocks() {
        let m = member(vec![Weekday::Sat]);
        assert!(!derive(m.id, Some(&m), saturday(), false, &[]).available);

        let next_day = saturday().succ_opt().unwrap();
        assert!(derive(m.id, Some(&m), next_day, false, &[]).available);
    }

    #[test]
    fn test_only_pending_and_booked_block() {
        let m = member(vec![]);
        for (status, blocks) in [
            (BookingStatus::Prospect, false),
            (BookingStatus::Pending, true),
            (BookingStatus::Booked, true),
            (BookingStatus::Confirmed, false),
            (BookingStatus::Cleared, false),
            (BookingStatus::Declined, false),
        ] {
            let row = derive(m.id, Some(&m), saturday(), false, &[booking(m.id, status)]);
            assert_eq!(row.available, !blocks, "status {}", status);
        }
    }
}
