//! Contract lifecycle: creation, selection edits, status changes and the
//! daily completion sweep.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{AppError, Result};
use crate::models::{
    contract_code, AuditAction, AuditEntry, Contract, ContractStatus, EventStaffBooking,
    ScheduleType, Selections,
};
use crate::notify::ContractEvent;
use crate::payments::schedule;
use crate::pricing::{load_catalog, reprice, TotalBreakdown};
use crate::staffing::services::{stage_availability_for, stage_purge};
use crate::store::UnitOfWork;
use crate::AppState;

/// Fields accepted when opening a contract
#[derive(Debug, Clone)]
pub struct NewContract {
    pub client_name: String,
    pub event_date: NaiveDate,
    pub location_id: Option<Uuid>,
    pub selections: Selections,
    pub schedule_type: ScheduleType,
}

/// Partial update of the priced parts of a contract. `None` leaves a field
/// as it is; `location_id: Some(None)` removes the location.
#[derive(Debug, Clone, Default)]
pub struct ContractUpdate {
    pub client_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location_id: Option<Option<Uuid>>,
    pub selections: Option<Selections>,
    pub package_discount_version: Option<i32>,
    pub sunday_discount_version: Option<i32>,
}

/// Contract with its booking records
#[derive(Debug, Clone)]
pub struct ContractView {
    pub contract: Contract,
    pub bookings: Vec<EventStaffBooking>,
}

async fn load_contract(state: &AppState, contract_id: Uuid) -> Result<Contract> {
    state
        .store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AppError::not_found("contract", contract_id))
}

fn validate_selections(selections: &Selections) -> Result<()> {
    for entry in &selections.overtime {
        if entry.hours < Decimal::ZERO || entry.rate < Decimal::ZERO {
            return Err(AppError::validation(
                "overtime",
                format!("hours and rate for {} must not be negative", entry.role),
            ));
        }
    }
    if selections.products.iter().any(|line| line.quantity == 0) {
        return Err(AppError::validation("products", "quantity must be at least 1"));
    }
    if selections.discounts.iter().any(|d| d.memo.trim().is_empty()) {
        return Err(AppError::validation("discounts", "every discount needs a memo"));
    }
    Ok(())
}

fn validate_client_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("client_name", "must not be empty"));
    }
    Ok(())
}

/// Refuse a date move that would leave one of the contract's staff with two
/// live bookings on `date`.
async fn ensure_staff_free_on(state: &AppState, contract_id: Uuid, date: NaiveDate) -> Result<()> {
    let bookings = state.store.bookings_for(contract_id).await?;
    for booking in bookings.iter().filter(|b| b.status.occupies_slot()) {
        let clash = state
            .store
            .bookings_for_staff_on(booking.staff_id, date)
            .await?
            .into_iter()
            .find(|other| other.contract_id != contract_id && other.status.occupies_slot());

        if let Some(other) = clash {
            tracing::warn!(
                contract_id = %contract_id,
                staff_id = %booking.staff_id,
                %date,
                other_contract = %other.contract_id,
                "event date move rejected: staff already booked that day"
            );
            return Err(AppError::BookingConflict(format!(
                "staff member {} ({}) already works another event on {}",
                booking.staff_id, booking.role, date
            )));
        }
    }
    Ok(())
}

/// Open a pipeline contract and give it the next `YY-MM-NN` code for the
/// month it was created in.
pub async fn create_contract(
    state: &AppState,
    new: NewContract,
    today: NaiveDate,
    actor: &Actor,
) -> Result<(Contract, TotalBreakdown)> {
    validate_client_name(&new.client_name)?;
    validate_selections(&new.selections)?;

    let catalog = load_catalog(state).await?;

    let _sequence = state.locks.sequence().await;
    let created_this_month = state
        .store
        .count_contracts_created_in(today.year(), today.month())
        .await?;
    let code = contract_code(today, created_this_month + 1);

    let mut contract = Contract::new(code, new.client_name.trim().to_string(), new.event_date, today);
    contract.location_id = new.location_id;
    contract.selections = new.selections;
    contract.schedule_type = new.schedule_type;
    let totals = reprice(&mut contract, &catalog, state.policy.pricing())?;

    let mut work = UnitOfWork::new();
    work.put_contract(contract.clone());
    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract.id,
        code = %contract.code,
        total = %contract.total_cost,
        actor = actor.as_deref().unwrap_or("-"),
        "contract created"
    );

    Ok((contract, totals))
}

pub async fn get_contract(state: &AppState, contract_id: Uuid) -> Result<ContractView> {
    let contract = load_contract(state, contract_id).await?;
    let bookings = state.store.bookings_for(contract_id).await?;
    Ok(ContractView { contract, bookings })
}

/// Apply a selection edit, reprice, and bring the schedule and staff
/// availability along.
///
/// A generated schedule is rebuilt against the new total; a hand-edited one
/// is only reconciled. Moving the event date re-derives availability for
/// every booked staff member on both dates, and is refused when one of them
/// already works another event on the new date.
pub async fn update_selections(
    state: &AppState,
    contract_id: Uuid,
    update: ContractUpdate,
    today: NaiveDate,
    actor: &Actor,
) -> Result<(Contract, TotalBreakdown)> {
    if let Some(name) = &update.client_name {
        validate_client_name(name)?;
    }
    if let Some(selections) = &update.selections {
        validate_selections(selections)?;
    }

    // a date move touches availability, which belongs to the staffing lock
    let _staffing = match update.event_date {
        Some(_) => Some(state.locks.staffing().await),
        None => None,
    };
    let _guard = state.locks.acquire(contract_id).await;

    let mut contract = load_contract(state, contract_id).await?;
    if contract.status.is_terminal() {
        return Err(AppError::InvalidTransition {
            entity: "contract",
            from: contract.status.to_string(),
            to: "edited".to_string(),
        });
    }
    let catalog = load_catalog(state).await?;

    let old_date = contract.event_date;
    if let Some(new_date) = update.event_date.filter(|date| *date != old_date) {
        ensure_staff_free_on(state, contract_id, new_date).await?;
    }
    if let Some(name) = update.client_name {
        contract.client_name = name.trim().to_string();
    }
    if let Some(event_date) = update.event_date {
        contract.event_date = event_date;
    }
    if let Some(location_id) = update.location_id {
        contract.location_id = location_id;
    }
    if let Some(selections) = update.selections {
        contract.selections = selections;
    }
    if let Some(version) = update.package_discount_version {
        contract.package_discount_version = version;
    }
    if let Some(version) = update.sunday_discount_version {
        contract.sunday_discount_version = version;
    }

    let totals = reprice(&mut contract, &catalog, state.policy.pricing())?;
    contract.updated_at = Utc::now();

    let mut work = UnitOfWork::new();

    if let Some(existing) = state.store.schedule_for(contract_id).await? {
        let payments = state.store.payments_for(contract_id).await?;
        let rebuilt = !existing.manually_edited;
        let refreshed = schedule::refresh(
            existing,
            &contract,
            &catalog,
            &payments,
            today,
            state.policy.balance_due_days_before_event,
        )?;
        if rebuilt {
            work.audit.push(AuditEntry::new(
                contract_id,
                AuditAction::ScheduleRebuilt,
                actor.as_deref(),
                json!({
                    "schedule_type": refreshed.schedule_type,
                    "scheduled_total": refreshed.scheduled_total().to_string(),
                    "reason": "selections changed",
                }),
            ));
        }
        work.put_schedule(refreshed);
    }

    let new_date = contract.event_date;
    work.put_contract(contract.clone());

    if new_date != old_date {
        let bookings = state.store.bookings_for(contract_id).await?;
        let affected: Vec<(Uuid, NaiveDate)> = bookings
            .iter()
            .flat_map(|b| [(b.staff_id, old_date), (b.staff_id, new_date)])
            .collect();
        stage_availability_for(state, &mut work, &affected).await?;
        tracing::info!(
            contract_id = %contract_id,
            from = %old_date,
            to = %new_date,
            staff = bookings.len(),
            "event date moved"
        );
    }

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        total = %contract.total_cost,
        actor = actor.as_deref().unwrap_or("-"),
        "contract selections updated"
    );

    Ok((contract, totals))
}

/// Move a contract to another status.
///
/// Only configured admins may mark a contract dead. Dead is terminal and
/// drops every staff booking on the contract.
pub async fn change_status(
    state: &AppState,
    contract_id: Uuid,
    to: ContractStatus,
    actor: &Actor,
) -> Result<Contract> {
    if to == ContractStatus::Dead {
        let allowed = actor
            .as_deref()
            .is_some_and(|user| state.policy.is_contract_admin(user));
        if !allowed {
            tracing::warn!(
                contract_id = %contract_id,
                actor = actor.as_deref().unwrap_or("-"),
                "refused to mark contract dead: not an admin"
            );
            return Err(AppError::Forbidden(
                "only contract admins may mark a contract dead".to_string(),
            ));
        }
    }

    let _staffing = match to {
        ContractStatus::Dead => Some(state.locks.staffing().await),
        _ => None,
    };
    let _guard = state.locks.acquire(contract_id).await;

    let mut contract = load_contract(state, contract_id).await?;
    let from = contract.status;
    if from == to {
        return Ok(contract);
    }
    if from.is_terminal() {
        return Err(AppError::InvalidTransition {
            entity: "contract",
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    contract.status = to;
    contract.updated_at = Utc::now();

    let mut work = UnitOfWork::new();
    let mut events = Vec::new();

    let affected = if to == ContractStatus::Dead {
        let (affected, released) = stage_purge(state, &mut work, &mut contract).await?;
        events.extend(released);
        affected
    } else {
        Vec::new()
    };
    work.put_contract(contract.clone());
    stage_availability_for(state, &mut work, &affected).await?;

    work.audit.push(AuditEntry::new(
        contract_id,
        AuditAction::StatusChanged,
        actor.as_deref(),
        json!({ "from": from, "to": to }),
    ));
    events.push(ContractEvent::StatusChanged {
        contract_id,
        code: contract.code.clone(),
        from,
        to,
    });

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        from = %from,
        to = %to,
        actor = actor.as_deref().unwrap_or("-"),
        "contract status changed"
    );
    for event in events {
        state.notifier.notify(event);
    }

    Ok(contract)
}

/// Mark booked contracts whose event date has passed as completed.
///
/// Run once a day. No repricing happens here.
pub async fn complete_past_events(state: &AppState, today: NaiveDate) -> Result<Vec<Contract>> {
    let candidates = state.store.booked_contracts_before(today).await?;
    let mut completed = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let _guard = state.locks.acquire(candidate.id).await;
        let Some(mut contract) = state.store.contract(candidate.id).await? else {
            continue;
        };
        if contract.status != ContractStatus::Booked || contract.event_date >= today {
            continue;
        }

        contract.status = ContractStatus::Completed;
        contract.updated_at = Utc::now();

        let mut work = UnitOfWork::new();
        work.put_contract(contract.clone());
        work.audit.push(AuditEntry::new(
            contract.id,
            AuditAction::StatusChanged,
            None,
            json!({
                "from": ContractStatus::Booked,
                "to": ContractStatus::Completed,
                "reason": "event date passed",
            }),
        ));
        state.store.apply(work).await?;

        state.notifier.notify(ContractEvent::StatusChanged {
            contract_id: contract.id,
            code: contract.code.clone(),
            from: ContractStatus::Booked,
            to: ContractStatus::Completed,
        });
        completed.push(contract);
    }

    if !completed.is_empty() {
        tracing::info!(count = completed.len(), %today, "completed past events");
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnginePolicy;
    use crate::models::{Catalog, Location, Package, ServiceType};
    use crate::store::{MemoryStore, Store};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        state: AppState,
        photo: Uuid,
        dj: Uuid,
        location: Uuid,
    }

    fn fixture() -> Fixture {
        let mut catalog = Catalog::default();
        let photo = Uuid::new_v4();
        catalog.add_package(Package {
            id: photo,
            name: "Classic".to_string(),
            service_type: ServiceType::Photography,
            price: dec!(1000),
            deposit: dec!(250),
        });
        let dj = Uuid::new_v4();
        catalog.add_package(Package {
            id: dj,
            name: "Party".to_string(),
            service_type: ServiceType::Dj,
            price: dec!(800),
            deposit: dec!(200),
        });
        let location = Uuid::new_v4();
        catalog.add_location(Location {
            id: location,
            name: "Harbor Hall".to_string(),
            tax_rate: Some(dec!(7)),
        });

        let policy = EnginePolicy {
            contract_admins: vec!["owner".to_string()],
            ..EnginePolicy::default()
        };
        let store = Arc::new(MemoryStore::with_catalog(catalog));
        Fixture {
            state: AppState::new(store, policy, Duration::from_secs(60)),
            photo,
            dj,
            location,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn new_contract(selections: Selections) -> NewContract {
        NewContract {
            client_name: "Avery & Quinn".to_string(),
            event_date: NaiveDate::from_ymd_opt(2027, 6, 8).unwrap(),
            location_id: None,
            selections,
            schedule_type: ScheduleType::ScheduleA,
        }
    }

    #[tokio::test]
    async fn test_codes_count_within_month() {
        let f = fixture();
        let (first, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();
        let (second, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();

        assert_eq!(first.code, "26-10-01");
        assert_eq!(second.code, "26-10-02");
        assert_eq!(first.status, ContractStatus::Pipeline);
        assert_eq!(first.contract_date, today());
    }

    #[tokio::test]
    async fn test_create_prices_contract() {
        let f = fixture();
        let mut selections = Selections::default();
        selections.photography.package_id = Some(f.photo);
        selections.dj.package_id = Some(f.dj);

        let (contract, totals) = create_contract(&f.state, new_contract(selections), today(), &Actor::default())
            .await
            .unwrap();
        assert_eq!(contract.total_cost, dec!(1800));
        assert_eq!(totals.total_service_cost, dec!(1800));
    }

    #[tokio::test]
    async fn test_empty_client_name_rejected() {
        let f = fixture();
        let mut new = new_contract(Selections::default());
        new.client_name = "  ".to_string();

        let err = create_contract(&f.state, new, today(), &Actor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "client_name", .. }));
    }

    #[tokio::test]
    async fn test_update_refreshes_tax_and_total() {
        let f = fixture();
        let (contract, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();

        let mut selections = Selections::default();
        selections.photography.package_id = Some(f.photo);
        let update = ContractUpdate {
            location_id: Some(Some(f.location)),
            selections: Some(selections),
            ..ContractUpdate::default()
        };
        let (updated, _) = update_selections(&f.state, contract.id, update, today(), &Actor::default())
            .await
            .unwrap();

        assert_eq!(updated.tax_rate, Some(dec!(7)));
        assert_eq!(updated.total_cost, dec!(1000));
        let stored = f.state.store.contract(contract.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cost, dec!(1000));
    }

    #[tokio::test]
    async fn test_only_admin_marks_dead() {
        let f = fixture();
        let (contract, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();

        let err = change_status(&f.state, contract.id, ContractStatus::Dead, &Actor::named("intern"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = change_status(&f.state, contract.id, ContractStatus::Dead, &Actor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let dead = change_status(&f.state, contract.id, ContractStatus::Dead, &Actor::named("owner"))
            .await
            .unwrap();
        assert_eq!(dead.status, ContractStatus::Dead);

        let err = change_status(&f.state, contract.id, ContractStatus::Pipeline, &Actor::named("owner"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let err = update_selections(&f.state, contract.id, ContractUpdate::default(), today(), &Actor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_sweep_completes_only_past_booked() {
        let f = fixture();
        let (past, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();
        let (future, _) = create_contract(&f.state, new_contract(Selections::default()), today(), &Actor::default())
            .await
            .unwrap();
        for id in [past.id, future.id] {
            change_status(&f.state, id, ContractStatus::Booked, &Actor::default())
                .await
                .unwrap();
        }

        // the day after the event
        let later = NaiveDate::from_ymd_opt(2027, 6, 9).unwrap();
        let moved = ContractUpdate {
            event_date: Some(NaiveDate::from_ymd_opt(2027, 7, 1).unwrap()),
            ..ContractUpdate::default()
        };
        update_selections(&f.state, future.id, moved, today(), &Actor::default())
            .await
            .unwrap();

        let completed = complete_past_events(&f.state, later).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, past.id);

        let stored = f.state.store.contract(future.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContractStatus::Booked);
        // running again finds nothing
        assert!(complete_past_events(&f.state, later).await.unwrap().is_empty());
    }
}
