//! Persistence boundary.
//!
//! Services read through [`Store`] and write through a single
//! [`UnitOfWork`] per operation, which the store commits atomically. Two
//! implementations ship: Postgres for deployments and an in-memory store for
//! tests and local runs.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AuditEntry, AvailabilityRow, Catalog, Contract, EventStaffBooking, Payment, PaymentSchedule,
    StaffMember,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Full catalog snapshot (packages, options, products, locations, rules)
    async fn load_catalog(&self) -> Result<Catalog>;

    async fn staff_member(&self, id: Uuid) -> Result<Option<StaffMember>>;

    async fn contract(&self, id: Uuid) -> Result<Option<Contract>>;

    /// Number of contracts whose `contract_date` falls in the given month
    async fn count_contracts_created_in(&self, year: i32, month: u32) -> Result<u32>;

    /// Booked contracts whose event date is strictly before `date`
    async fn booked_contracts_before(&self, date: NaiveDate) -> Result<Vec<Contract>>;

    /// All payments for a contract, oldest first
    async fn payments_for(&self, contract_id: Uuid) -> Result<Vec<Payment>>;

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>>;

    async fn schedule_for(&self, contract_id: Uuid) -> Result<Option<PaymentSchedule>>;

    async fn bookings_for(&self, contract_id: Uuid) -> Result<Vec<EventStaffBooking>>;

    /// Bookings held by `staff_id` on contracts whose event date is `date`
    async fn bookings_for_staff_on(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EventStaffBooking>>;

    async fn availability(&self, staff_id: Uuid, date: NaiveDate)
        -> Result<Option<AvailabilityRow>>;

    async fn audit_entries(&self, contract_id: Uuid) -> Result<Vec<AuditEntry>>;

    /// Commit every change of one operation, all or nothing
    async fn apply(&self, work: UnitOfWork) -> Result<()>;
}

/// Writes collected by one service operation.
///
/// Applied in field order: contracts, booking deletions, booking upserts,
/// payment deletions, payment upserts, schedules, availability, audit.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    pub contracts: Vec<Contract>,
    pub bookings_deleted: Vec<Uuid>,
    pub bookings_upserted: Vec<EventStaffBooking>,
    pub payments_deleted: Vec<Uuid>,
    pub payments_upserted: Vec<Payment>,
    pub schedules: Vec<PaymentSchedule>,
    pub availability: Vec<AvailabilityRow>,
    pub audit: Vec<AuditEntry>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a contract write, replacing an earlier staged copy
    pub fn put_contract(&mut self, contract: Contract) {
        match self.contracts.iter_mut().find(|c| c.id == contract.id) {
            Some(existing) => *existing = contract,
            None => self.contracts.push(contract),
        }
    }

    pub fn contract(&self, id: Uuid) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    pub fn put_booking(&mut self, booking: EventStaffBooking) {
        self.bookings_deleted.retain(|id| *id != booking.id);
        match self.bookings_upserted.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => self.bookings_upserted.push(booking),
        }
    }

    pub fn delete_booking(&mut self, id: Uuid) {
        self.bookings_upserted.retain(|b| b.id != id);
        if !self.bookings_deleted.contains(&id) {
            self.bookings_deleted.push(id);
        }
    }

    pub fn put_availability(&mut self, row: AvailabilityRow) {
        match self
            .availability
            .iter_mut()
            .find(|r| r.staff_id == row.staff_id && r.date == row.date)
        {
            Some(existing) => *existing = row,
            None => self.availability.push(row),
        }
    }

    pub fn put_schedule(&mut self, schedule: PaymentSchedule) {
        self.schedules.retain(|s| s.contract_id != schedule.contract_id);
        self.schedules.push(schedule);
    }
}
