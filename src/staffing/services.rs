//! Staff booking operations.
//!
//! Every booking mutation takes the global staffing lock first (exclusivity
//! spans contracts), then the locks of every contract it writes, in id
//! order. The booking write, the contract slot write and the availability
//! rows all go out in one unit of work.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{AppError, Result};
use crate::models::{
    AvailabilityRow, BookingStatus, Contract, ContractStatus, EventStaffBooking, Role,
};
use crate::notify::ContractEvent;
use crate::store::UnitOfWork;
use crate::AppState;

use super::availability;
use super::coordinator::{
    clear_slot, competing_bookings, effective_bookings, ensure_transition, sync_slot,
};

/// Staff assignment request for one role slot
#[derive(Debug, Clone)]
pub struct Assignment {
    pub staff_id: Uuid,
    /// Must be prospect, pending or booked
    pub status: BookingStatus,
    pub hours_booked: Option<Decimal>,
}

async fn load_contract(state: &AppState, contract_id: Uuid) -> Result<Contract> {
    state
        .store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AppError::not_found("contract", contract_id))
}

async fn load_booking(state: &AppState, contract_id: Uuid, role: Role) -> Result<EventStaffBooking> {
    state
        .store
        .bookings_for(contract_id)
        .await?
        .into_iter()
        .find(|b| b.role == role)
        .ok_or_else(|| AppError::not_found("booking", format!("{}/{}", contract_id, role)))
}

async fn ensure_staff_member(state: &AppState, staff_id: Uuid) -> Result<()> {
    state
        .cache
        .staff_member(state.store.as_ref(), staff_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("staff member", staff_id))
}

fn ensure_not_dead(contract: &Contract) -> Result<()> {
    if contract.status == ContractStatus::Dead {
        return Err(AppError::BookingConflict(format!(
            "contract {} is dead",
            contract.code
        )));
    }
    Ok(())
}

/// Re-derive one availability row against the staged state and stage it.
///
/// Must run after every booking and contract write of the operation has
/// been staged.
pub(crate) async fn stage_availability(
    state: &AppState,
    work: &mut UnitOfWork,
    staff_id: Uuid,
    date: NaiveDate,
) -> Result<AvailabilityRow> {
    let stored_on_date = state.store.bookings_for_staff_on(staff_id, date).await?;
    let mut staged_contract_bookings = Vec::new();
    for contract in &work.contracts {
        staged_contract_bookings.extend(
            state
                .store
                .bookings_for(contract.id)
                .await?
                .into_iter()
                .filter(|b| b.staff_id == staff_id),
        );
    }
    let bookings = effective_bookings(
        staff_id,
        date,
        stored_on_date,
        staged_contract_bookings,
        work,
    );

    let staged_mark = work
        .availability
        .iter()
        .find(|r| r.staff_id == staff_id && r.date == date)
        .map(|r| r.marked_unavailable);
    let marked_unavailable = match staged_mark {
        Some(marked) => marked,
        None => state
            .store
            .availability(staff_id, date)
            .await?
            .is_some_and(|r| r.marked_unavailable),
    };

    let member = state.cache.staff_member(state.store.as_ref(), staff_id).await?;
    let row = availability::derive(staff_id, member.as_deref(), date, marked_unavailable, &bookings);
    work.put_availability(row.clone());
    Ok(row)
}

/// Stage availability for every (staff, date) pair
pub(crate) async fn stage_availability_for(
    state: &AppState,
    work: &mut UnitOfWork,
    affected: &[(Uuid, NaiveDate)],
) -> Result<()> {
    let mut seen = HashSet::new();
    for (staff_id, date) in affected {
        if seen.insert((*staff_id, *date)) {
            stage_availability(state, work, *staff_id, *date).await?;
        }
    }
    Ok(())
}

/// Delete every booking on a contract and clear its slots.
///
/// Returns the affected (staff, date) pairs and the release events. The
/// caller stages the contract and re-derives availability.
pub(crate) async fn stage_purge(
    state: &AppState,
    work: &mut UnitOfWork,
    contract: &mut Contract,
) -> Result<(Vec<(Uuid, NaiveDate)>, Vec<ContractEvent>)> {
    let bookings = state.store.bookings_for(contract.id).await?;
    let mut affected = Vec::new();
    let mut events = Vec::new();

    for booking in bookings {
        work.delete_booking(booking.id);
        contract.staffing.set(booking.role, None);
        affected.push((booking.staff_id, contract.event_date));
        events.push(ContractEvent::BookingReleased {
            contract_id: contract.id,
            role: booking.role,
            staff_id: booking.staff_id,
            event_date: contract.event_date,
        });
    }
    Ok((affected, events))
}

/// Assign a staff member to a role slot.
///
/// In order: the previous holder (if any) is released; every other booking
/// the new staff member holds on the same event date is deleted and its
/// contract slot cleared; the booking is saved; the contract slot is
/// written; availability is re-derived for everyone involved.
pub async fn assign_role(
    state: &AppState,
    contract_id: Uuid,
    role: Role,
    assignment: Assignment,
    actor: &Actor,
) -> Result<EventStaffBooking> {
    if !assignment.status.is_initial() {
        return Err(AppError::validation(
            "status",
            "new assignments start as prospect, pending or booked",
        ));
    }
    if assignment.hours_booked.is_some_and(|h| h < Decimal::ZERO) {
        return Err(AppError::validation("hours_booked", "must not be negative"));
    }
    let staff_id = assignment.staff_id;
    ensure_staff_member(state, staff_id).await?;

    let _staffing = state.locks.staffing().await;
    // event dates only move under the staffing lock
    let event_date = load_contract(state, contract_id).await?.event_date;
    let on_date = state.store.bookings_for_staff_on(staff_id, event_date).await?;
    let competitors = competing_bookings(&on_date, contract_id, role);

    let mut lock_ids: Vec<Uuid> = competitors.iter().map(|b| b.contract_id).collect();
    lock_ids.push(contract_id);
    let _guards = state.locks.acquire_all(&lock_ids).await;

    let mut contract = load_contract(state, contract_id).await?;
    ensure_not_dead(&contract)?;
    let existing = state
        .store
        .bookings_for(contract_id)
        .await?
        .into_iter()
        .find(|b| b.role == role);

    let mut work = UnitOfWork::new();
    let mut events = Vec::new();
    let mut affected = vec![(staff_id, event_date)];

    // 1. previous holder
    let booking = match existing {
        Some(mut same) if same.staff_id == staff_id => {
            ensure_transition(same.status, assignment.status)?;
            same.status = assignment.status;
            if let Some(hours) = assignment.hours_booked {
                same.hours_booked = hours;
            }
            same
        }
        previous => {
            if let Some(previous) = previous {
                tracing::info!(
                    contract_id = %contract_id,
                    role = %role,
                    previous_staff = %previous.staff_id,
                    "releasing previous slot holder"
                );
                work.delete_booking(previous.id);
                affected.push((previous.staff_id, event_date));
                events.push(ContractEvent::BookingReleased {
                    contract_id,
                    role,
                    staff_id: previous.staff_id,
                    event_date,
                });
            }
            EventStaffBooking {
                id: Uuid::new_v4(),
                contract_id,
                role,
                staff_id,
                status: assignment.status,
                confirmed: false,
                hours_booked: assignment.hours_booked.unwrap_or(Decimal::ZERO),
            }
        }
    };

    // 2. exclusivity
    for competitor in &competitors {
        work.delete_booking(competitor.id);
        if competitor.contract_id == contract_id {
            clear_slot(&mut contract, competitor.role, staff_id);
        } else {
            let mut other = match work.contract(competitor.contract_id) {
                Some(staged) => staged.clone(),
                None => load_contract(state, competitor.contract_id).await?,
            };
            clear_slot(&mut other, competitor.role, staff_id);
            work.put_contract(other);
        }
        tracing::warn!(
            staff_id = %staff_id,
            event_date = %event_date,
            removed_contract = %competitor.contract_id,
            removed_role = %competitor.role,
            "removed competing booking"
        );
        events.push(ContractEvent::BookingReleased {
            contract_id: competitor.contract_id,
            role: competitor.role,
            staff_id,
            event_date,
        });
    }

    // 3. + 4. booking and slot
    work.put_booking(booking.clone());
    sync_slot(&mut contract, &booking);
    contract.updated_at = Utc::now();
    work.put_contract(contract);

    // 5. availability
    stage_availability_for(state, &mut work, &affected).await?;

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        role = %role,
        staff_id = %staff_id,
        status = %booking.status,
        actor = actor.as_deref().unwrap_or("-"),
        "staff assigned"
    );
    for event in events {
        state.notifier.notify(event);
    }

    Ok(booking)
}

/// Move a booking through its lifecycle.
///
/// Confirming sets the confirmed flag and announces it; clearing or
/// declining empties the contract slot and frees the date.
pub async fn change_booking_status(
    state: &AppState,
    contract_id: Uuid,
    role: Role,
    status: BookingStatus,
    actor: &Actor,
) -> Result<EventStaffBooking> {
    let _staffing = state.locks.staffing().await;
    let _guard = state.locks.acquire(contract_id).await;

    let mut contract = load_contract(state, contract_id).await?;
    let mut booking = load_booking(state, contract_id, role).await?;
    ensure_transition(booking.status, status)?;
    if status.occupies_slot() {
        ensure_not_dead(&contract)?;
    }

    let previous = booking.status;
    booking.status = status;
    match status {
        BookingStatus::Confirmed => booking.confirmed = true,
        BookingStatus::Cleared | BookingStatus::Declined => booking.confirmed = false,
        _ => {}
    }

    let event_date = contract.event_date;
    let mut work = UnitOfWork::new();
    work.put_booking(booking.clone());
    sync_slot(&mut contract, &booking);
    contract.updated_at = Utc::now();
    work.put_contract(contract);
    stage_availability(state, &mut work, booking.staff_id, event_date).await?;

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        role = %role,
        from = %previous,
        to = %status,
        actor = actor.as_deref().unwrap_or("-"),
        "booking status changed"
    );

    if previous != status {
        match status {
            BookingStatus::Confirmed => state.notifier.notify(ContractEvent::BookingConfirmed {
                contract_id,
                role,
                staff_id: booking.staff_id,
                event_date,
            }),
            BookingStatus::Cleared | BookingStatus::Declined => {
                state.notifier.notify(ContractEvent::BookingReleased {
                    contract_id,
                    role,
                    staff_id: booking.staff_id,
                    event_date,
                })
            }
            _ => {}
        }
    }

    Ok(booking)
}

/// Delete a slot's booking outright and clear the contract slot.
pub async fn remove_booking(
    state: &AppState,
    contract_id: Uuid,
    role: Role,
    actor: &Actor,
) -> Result<EventStaffBooking> {
    let _staffing = state.locks.staffing().await;
    let _guard = state.locks.acquire(contract_id).await;

    let mut contract = load_contract(state, contract_id).await?;
    let booking = load_booking(state, contract_id, role).await?;
    let event_date = contract.event_date;

    let mut work = UnitOfWork::new();
    work.delete_booking(booking.id);
    clear_slot(&mut contract, role, booking.staff_id);
    contract.updated_at = Utc::now();
    work.put_contract(contract);
    stage_availability(state, &mut work, booking.staff_id, event_date).await?;

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        role = %role,
        staff_id = %booking.staff_id,
        actor = actor.as_deref().unwrap_or("-"),
        "booking removed"
    );
    state.notifier.notify(ContractEvent::BookingReleased {
        contract_id,
        role,
        staff_id: booking.staff_id,
        event_date,
    });

    Ok(booking)
}

/// Current availability, derived fresh. Nothing is written.
pub async fn staff_availability(state: &AppState, staff_id: Uuid, date: NaiveDate) -> Result<AvailabilityRow> {
    let member = state
        .cache
        .staff_member(state.store.as_ref(), staff_id)
        .await?
        .ok_or_else(|| AppError::not_found("staff member", staff_id))?;

    let marked_unavailable = state
        .store
        .availability(staff_id, date)
        .await?
        .is_some_and(|r| r.marked_unavailable);
    let bookings = state.store.bookings_for_staff_on(staff_id, date).await?;

    Ok(availability::derive(
        staff_id,
        Some(member.as_ref()),
        date,
        marked_unavailable,
        &bookings,
    ))
}

/// Set or clear the explicit "can't work that day" mark.
pub async fn mark_availability(
    state: &AppState,
    staff_id: Uuid,
    date: NaiveDate,
    unavailable: bool,
    actor: &Actor,
) -> Result<AvailabilityRow> {
    ensure_staff_member(state, staff_id).await?;
    let _staffing = state.locks.staffing().await;

    let mut work = UnitOfWork::new();
    work.put_availability(AvailabilityRow {
        staff_id,
        date,
        marked_unavailable: unavailable,
        available: !unavailable,
    });
    let row = stage_availability(state, &mut work, staff_id, date).await?;
    state.store.apply(work).await?;

    tracing::info!(
        staff_id = %staff_id,
        date = %date,
        marked_unavailable = unavailable,
        available = row.available,
        actor = actor.as_deref().unwrap_or("-"),
        "availability marked"
    );

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnginePolicy;
    use crate::models::{Catalog, StaffMember};
    use crate::store::{MemoryStore, Store};
    use chrono::Weekday;
    use std::sync::Arc;
    use std::time::Duration;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 5, 15).unwrap()
    }

    async fn setup() -> (AppState, Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::with_catalog(Catalog::default()));
        let staff = StaffMember {
            id: Uuid::new_v4(),
            name: "Sam".to_string(),
            off_days: vec![Weekday::Mon],
        };
        let staff_id = staff.id;
        store.add_staff_member(staff).await;
        let state = AppState::new(store.clone(), EnginePolicy::default(), Duration::from_secs(60));
        (state, store, staff_id)
    }

    async fn add_contract(store: &MemoryStore, code: &str, event_date: NaiveDate) -> Uuid {
        let contract = Contract::new(
            code.to_string(),
            "Client".to_string(),
            event_date,
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        );
        let id = contract.id;
        let mut work = UnitOfWork::new();
        work.put_contract(contract);
        store.apply(work).await.unwrap();
        id
    }

    fn assignment(staff_id: Uuid, status: BookingStatus) -> Assignment {
        Assignment {
            staff_id,
            status,
            hours_booked: None,
        }
    }

    #[tokio::test]
    async fn test_assign_writes_slot_and_blocks_date() {
        let (state, store, staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;

        assign_role(
            &state,
            contract,
            Role::Photographer1,
            assignment(staff, BookingStatus::Booked),
            &Actor::default(),
        )
        .await
        .unwrap();

        let stored = store.contract(contract).await.unwrap().unwrap();
        assert_eq!(stored.staffing.photographer1, Some(staff));
        let row = store.availability(staff, date()).await.unwrap().unwrap();
        assert!(!row.available);
    }

    #[tokio::test]
    async fn test_prospect_does_not_block_date() {
        let (state, store, staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;

        assign_role(
            &state,
            contract,
            Role::Dj1,
            assignment(staff, BookingStatus::Prospect),
            &Actor::default(),
        )
        .await
        .unwrap();

        assert!(staff_availability(&state, staff, date()).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_confirmed_sets_flag_and_cleared_frees_slot() {
        let (state, store, staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;
        assign_role(
            &state,
            contract,
            Role::Videographer1,
            assignment(staff, BookingStatus::Booked),
            &Actor::default(),
        )
        .await
        .unwrap();

        let confirmed = change_booking_status(
            &state,
            contract,
            Role::Videographer1,
            BookingStatus::Confirmed,
            &Actor::default(),
        )
        .await
        .unwrap();
        assert!(confirmed.confirmed);

        change_booking_status(
            &state,
            contract,
            Role::Videographer1,
            BookingStatus::Cleared,
            &Actor::default(),
        )
        .await
        .unwrap();
        let stored = store.contract(contract).await.unwrap().unwrap();
        assert_eq!(stored.staffing.videographer1, None);
        assert!(store.availability(staff, date()).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn test_invalid_status_change_is_rejected() {
        let (state, store, staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;
        assign_role(
            &state,
            contract,
            Role::Dj1,
            assignment(staff, BookingStatus::Prospect),
            &Actor::default(),
        )
        .await
        .unwrap();

        let err = change_booking_status(&state, contract, Role::Dj1, BookingStatus::Confirmed, &Actor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_assignment_must_start_in_initial_status() {
        let (state, store, staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;

        let err = assign_role(
            &state,
            contract,
            Role::Dj1,
            assignment(staff, BookingStatus::Confirmed),
            &Actor::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "status", .. }));
    }

    #[tokio::test]
    async fn test_mark_and_off_day() {
        let (state, _store, staff) = setup().await;

        let row = mark_availability(&state, staff, date(), true, &Actor::default())
            .await
            .unwrap();
        assert!(row.marked_unavailable);
        assert!(!row.available);

        let row = mark_availability(&state, staff, date(), false, &Actor::default())
            .await
            .unwrap();
        assert!(row.available);

        // 2027-05-17 is a Monday
        let monday = NaiveDate::from_ymd_opt(2027, 5, 17).unwrap();
        assert!(!staff_availability(&state, staff, monday).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_unknown_staff_member() {
        let (state, store, _staff) = setup().await;
        let contract = add_contract(&store, "26-10-01", date()).await;

        let err = assign_role(
            &state,
            contract,
            Role::Dj1,
            assignment(Uuid::new_v4(), BookingStatus::Pending),
            &Actor::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "staff member", .. }));
    }
}
