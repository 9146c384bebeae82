//! Outbound contract events.
//!
//! The engine announces what happened; delivering email or chat messages is
//! the outer application's job, done by implementing [`Notifier`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ContractStatus, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
    StatusChanged {
        contract_id: Uuid,
        code: String,
        from: ContractStatus,
        to: ContractStatus,
    },
    PaymentRecorded {
        contract_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
        balance_due: Decimal,
    },
    BookingConfirmed {
        contract_id: Uuid,
        role: Role,
        staff_id: Uuid,
        event_date: NaiveDate,
    },
    BookingReleased {
        contract_id: Uuid,
        role: Role,
        staff_id: Uuid,
        event_date: NaiveDate,
    },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: ContractEvent);
}

/// Default notifier: logs the event and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: ContractEvent) {
        tracing::info!(?event, "contract event");
    }
}
