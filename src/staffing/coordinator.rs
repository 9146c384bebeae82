//! Booking-slot rules that do not need the store.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BookingStatus, Contract, EventStaffBooking, Role};
use crate::store::UnitOfWork;

/// Reject a status change the booking state machine does not allow.
pub fn ensure_transition(from: BookingStatus, to: BookingStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            entity: "booking",
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Write the booking's staff id into the contract slot, or clear it when the
/// booking no longer occupies the slot.
pub fn sync_slot(contract: &mut Contract, booking: &EventStaffBooking) {
    let staff = booking.status.occupies_slot().then_some(booking.staff_id);
    contract.staffing.set(booking.role, staff);
}

/// Clear the contract slot if it still names `staff_id`.
pub fn clear_slot(contract: &mut Contract, role: Role, staff_id: Uuid) {
    if contract.staffing.get(role) == Some(staff_id) {
        contract.staffing.set(role, None);
    }
}

/// Other bookings that collide with assigning `staff_id` to `role` on
/// `contract_id`: every booking the staff member holds on the same event
/// date, except the slot being assigned.
pub fn competing_bookings(
    on_date: &[EventStaffBooking],
    contract_id: Uuid,
    role: Role,
) -> Vec<EventStaffBooking> {
    on_date
        .iter()
        .filter(|b| !(b.contract_id == contract_id && b.role == role))
        .cloned()
        .collect()
}

/// The staff member's bookings on `date` as they will be once `work` commits.
///
/// `stored_on_date` are the committed bookings on contracts dated `date`;
/// `staged_contract_bookings` are the committed bookings of every contract
/// staged in `work`, whose event date may be moving.
pub fn effective_bookings(
    staff_id: Uuid,
    date: NaiveDate,
    stored_on_date: Vec<EventStaffBooking>,
    staged_contract_bookings: Vec<EventStaffBooking>,
    work: &UnitOfWork,
) -> Vec<EventStaffBooking> {
    // booking id -> (booking, committed event date if known)
    let mut by_id: HashMap<Uuid, (EventStaffBooking, Option<NaiveDate>)> = HashMap::new();
    for booking in stored_on_date {
        by_id.insert(booking.id, (booking, Some(date)));
    }
    for booking in staged_contract_bookings {
        by_id.entry(booking.id).or_insert((booking, None));
    }
    for id in &work.bookings_deleted {
        by_id.remove(id);
    }
    for booking in &work.bookings_upserted {
        let known = by_id.get(&booking.id).and_then(|(_, d)| *d);
        by_id.insert(booking.id, (booking.clone(), known));
    }

    let mut bookings: Vec<EventStaffBooking> = by_id
        .into_values()
        .filter(|(b, _)| b.staff_id == staff_id)
        .filter(|(b, known)| {
            let event_date = work
                .contract(b.contract_id)
                .map(|c| c.event_date)
                .or(*known);
            event_date == Some(date)
        })
        .map(|(b, _)| b)
        .collect();
    bookings.sort_by_key(|b| (b.contract_id, b.role.as_ref().to_string()));
    bookings
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 5, 15).unwrap()
    }

    fn contract_on(event_date: NaiveDate) -> Contract {
        Contract::new(
            "26-10-01".to_string(),
            "Okafor".to_string(),
            event_date,
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        )
    }

    fn booking(contract_id: Uuid, role: Role, staff_id: Uuid, status: BookingStatus) -> EventStaffBooking {
        EventStaffBooking {
            id: Uuid::new_v4(),
            contract_id,
            role,
            staff_id,
            status,
            confirmed: false,
            hours_booked: Decimal::ZERO,
        }
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        assert!(ensure_transition(BookingStatus::Pending, BookingStatus::Booked).is_ok());
        let err = ensure_transition(BookingStatus::Declined, BookingStatus::Booked).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { entity: "booking", .. }));
    }

    #[test]
    fn test_sync_slot_clears_released_bookings() {
        let mut contract = contract_on(date());
        let staff = Uuid::new_v4();
        let mut b = booking(contract.id, Role::Dj1, staff, BookingStatus::Booked);

        sync_slot(&mut contract, &b);
        assert_eq!(contract.staffing.dj1, Some(staff));

        b.status = BookingStatus::Declined;
        sync_slot(&mut contract, &b);
        assert_eq!(contract.staffing.dj1, None);
    }

    #[test]
    fn test_clear_slot_only_matching_staff() {
        let mut contract = contract_on(date());
        let staff = Uuid::new_v4();
        contract.staffing.set(Role::Photographer2, Some(staff));

        clear_slot(&mut contract, Role::Photographer2, Uuid::new_v4());
        assert_eq!(contract.staffing.photographer2, Some(staff));

        clear_slot(&mut contract, Role::Photographer2, staff);
        assert_eq!(contract.staffing.photographer2, None);
    }

    #[test]
    fn test_competing_bookings_exclude_own_slot() {
        let staff = Uuid::new_v4();
        let here = Uuid::new_v4();
        let elsewhere = Uuid::new_v4();
        let on_date = vec![
            booking(here, Role::Photographer1, staff, BookingStatus::Prospect),
            booking(here, Role::Videographer1, staff, BookingStatus::Pending),
            booking(elsewhere, Role::Photographer1, staff, BookingStatus::Booked),
        ];

        let competing = competing_bookings(&on_date, here, Role::Photographer1);
        assert_eq!(competing.len(), 2);
        assert!(competing
            .iter()
            .all(|b| !(b.contract_id == here && b.role == Role::Photographer1)));
    }

    #[test]
    fn test_effective_bookings_apply_staged_changes() {
        let staff = Uuid::new_v4();
        let other = contract_on(date());
        let deleted = booking(other.id, Role::Dj1, staff, BookingStatus::Booked);

        let target = contract_on(date());
        let added = booking(target.id, Role::Dj1, staff, BookingStatus::Pending);

        let mut work = UnitOfWork::new();
        work.put_contract(target);
        work.delete_booking(deleted.id);
        work.put_booking(added.clone());

        let effective = effective_bookings(staff, date(), vec![deleted], vec![], &work);
        assert_eq!(effective, vec![added]);
    }

    #[test]
    fn test_effective_bookings_follow_moved_event_date() {
        let staff = Uuid::new_v4();
        let mut moved = contract_on(date());
        let held = booking(moved.id, Role::Photographer1, staff, BookingStatus::Booked);

        let new_date = date().succ_opt().unwrap();
        moved.event_date = new_date;
        let mut work = UnitOfWork::new();
        work.put_contract(moved);

        // old date: committed on it, but the contract is moving away
        let old = effective_bookings(staff, date(), vec![held.clone()], vec![held.clone()], &work);
        assert!(old.is_empty());

        // new date: only known through the staged contract
        let new = effective_bookings(staff, new_date, vec![], vec![held.clone()], &work);
        assert_eq!(new, vec![held]);
    }
}
