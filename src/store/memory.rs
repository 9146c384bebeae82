//! In-memory store used by tests and local runs without Postgres

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    AuditEntry, AvailabilityRow, Catalog, Contract, ContractStatus, EventStaffBooking, Payment,
    PaymentSchedule, StaffMember,
};

use super::{Store, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    catalog: Catalog,
    staff: HashMap<Uuid, StaffMember>,
    contracts: HashMap<Uuid, Contract>,
    payments: Vec<Payment>,
    schedules: HashMap<Uuid, PaymentSchedule>,
    bookings: HashMap<Uuid, EventStaffBooking>,
    availability: HashMap<(Uuid, NaiveDate), AvailabilityRow>,
    audit: Vec<AuditEntry>,
}

impl MemoryState {
    /// Enforce the constraints the Postgres schema declares
    fn check_constraints(&self) -> Result<()> {
        let mut codes = HashMap::new();
        for contract in self.contracts.values() {
            if let Some(other) = codes.insert(contract.code.as_str(), contract.id) {
                return Err(AppError::Internal(format!(
                    "duplicate contract code {} ({} and {})",
                    contract.code, other, contract.id
                )));
            }
        }

        let mut slots = HashMap::new();
        for booking in self.bookings.values() {
            if !self.contracts.contains_key(&booking.contract_id) {
                return Err(AppError::Internal(format!(
                    "booking {} references missing contract {}",
                    booking.id, booking.contract_id
                )));
            }
            if slots
                .insert((booking.contract_id, booking.role), booking.id)
                .is_some()
            {
                return Err(AppError::Internal(format!(
                    "duplicate booking for contract {} role {}",
                    booking.contract_id, booking.role
                )));
            }
        }

        for payment in &self.payments {
            if !self.contracts.contains_key(&payment.contract_id) {
                return Err(AppError::Internal(format!(
                    "payment {} references missing contract {}",
                    payment.id, payment.contract_id
                )));
            }
        }

        Ok(())
    }
}

/// Store backed by process memory.
///
/// `apply` stages every change on a copy of the state and swaps it in only
/// when all constraints hold, so a failed unit of work leaves nothing behind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                catalog,
                ..MemoryState::default()
            }),
        }
    }

    /// Replace the catalog snapshot
    pub async fn set_catalog(&self, catalog: Catalog) {
        self.state.write().await.catalog = catalog;
    }

    pub async fn add_staff_member(&self, member: StaffMember) {
        self.state.write().await.staff.insert(member.id, member);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_catalog(&self) -> Result<Catalog> {
        Ok(self.state.read().await.catalog.clone())
    }

    async fn staff_member(&self, id: Uuid) -> Result<Option<StaffMember>> {
        Ok(self.state.read().await.staff.get(&id).cloned())
    }

    async fn contract(&self, id: Uuid) -> Result<Option<Contract>> {
        Ok(self.state.read().await.contracts.get(&id).cloned())
    }

    async fn count_contracts_created_in(&self, year: i32, month: u32) -> Result<u32> {
        let state = self.state.read().await;
        let count = state
            .contracts
            .values()
            .filter(|c| c.contract_date.year() == year && c.contract_date.month() == month)
            .count();
        Ok(count as u32)
    }

    async fn booked_contracts_before(&self, date: NaiveDate) -> Result<Vec<Contract>> {
        let state = self.state.read().await;
        let mut contracts: Vec<Contract> = state
            .contracts
            .values()
            .filter(|c| c.status == ContractStatus::Booked && c.event_date < date)
            .cloned()
            .collect();
        contracts.sort_by_key(|c| (c.event_date, c.code.clone()));
        Ok(contracts)
    }

    async fn payments_for(&self, contract_id: Uuid) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.contract_id == contract_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.paid_at);
        Ok(payments)
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state.payments.iter().find(|p| p.id == id).cloned())
    }

    async fn schedule_for(&self, contract_id: Uuid) -> Result<Option<PaymentSchedule>> {
        Ok(self.state.read().await.schedules.get(&contract_id).cloned())
    }

    async fn bookings_for(&self, contract_id: Uuid) -> Result<Vec<EventStaffBooking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<EventStaffBooking> = state
            .bookings
            .values()
            .filter(|b| b.contract_id == contract_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.role.as_ref().to_string());
        Ok(bookings)
    }

    async fn bookings_for_staff_on(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EventStaffBooking>> {
        let state = self.state.read().await;
        Ok(state
            .bookings
            .values()
            .filter(|b| b.staff_id == staff_id)
            .filter(|b| {
                state
                    .contracts
                    .get(&b.contract_id)
                    .is_some_and(|c| c.event_date == date)
            })
            .cloned()
            .collect())
    }

    async fn availability(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityRow>> {
        Ok(self
            .state
            .read()
            .await
            .availability
            .get(&(staff_id, date))
            .cloned())
    }

    async fn audit_entries(&self, contract_id: Uuid) -> Result<Vec<AuditEntry>> {
        let state = self.state.read().await;
        Ok(state
            .audit
            .iter()
            .filter(|e| e.contract_id == contract_id)
            .cloned()
            .collect())
    }

    async fn apply(&self, work: UnitOfWork) -> Result<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        for contract in work.contracts {
            next.contracts.insert(contract.id, contract);
        }
        for id in work.bookings_deleted {
            next.bookings.remove(&id);
        }
        for booking in work.bookings_upserted {
            next.bookings.insert(booking.id, booking);
        }
        next.payments
            .retain(|p| !work.payments_deleted.contains(&p.id));
        for payment in work.payments_upserted {
            match next.payments.iter_mut().find(|p| p.id == payment.id) {
                Some(existing) => *existing = payment,
                None => next.payments.push(payment),
            }
        }
        for schedule in work.schedules {
            next.schedules.insert(schedule.contract_id, schedule);
        }
        for row in work.availability {
            next.availability.insert((row.staff_id, row.date), row);
        }
        next.audit.extend(work.audit);

        next.check_constraints()?;
        *state = next;
        Ok(())
    }
}
