//! Response DTOs for ledger and schedule endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    ContractStatus, Payment, PaymentMethod, PaymentPurpose, PaymentSchedule, SchedulePayment,
    ScheduleType,
};

use super::ledger::LedgerSummary;
use super::services::{LedgerChange, LedgerView};

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub purpose: Option<PaymentPurpose>,
    pub memo: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            contract_id: payment.contract_id,
            amount: payment.amount,
            method: payment.method,
            purpose: payment.purpose,
            memo: payment.memo,
            paid_at: payment.paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: Uuid,
    pub purpose: PaymentPurpose,
    pub due_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub paid: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_applied: Decimal,
}

impl From<SchedulePayment> for InstallmentResponse {
    fn from(installment: SchedulePayment) -> Self {
        Self {
            id: installment.id,
            purpose: installment.purpose,
            due_date: installment.due_date,
            amount: installment.amount,
            paid: installment.paid,
            amount_applied: installment.amount_applied,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub contract_id: Uuid,
    pub schedule_type: ScheduleType,
    pub manually_edited: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub scheduled_total: Decimal,
    pub installments: Vec<InstallmentResponse>,
}

impl From<PaymentSchedule> for ScheduleResponse {
    fn from(schedule: PaymentSchedule) -> Self {
        Self {
            contract_id: schedule.contract_id,
            schedule_type: schedule.schedule_type,
            manually_edited: schedule.manually_edited,
            scheduled_total: schedule.scheduled_total(),
            installments: schedule
                .installments
                .into_iter()
                .map(InstallmentResponse::from)
                .collect(),
        }
    }
}

/// Response after recording, editing or deleting a payment
#[derive(Debug, Serialize)]
pub struct LedgerChangeResponse {
    pub payment: PaymentResponse,
    pub contract_status: ContractStatus,
    pub ledger: LedgerSummary,
    pub schedule: Option<ScheduleResponse>,
}

impl From<LedgerChange> for LedgerChangeResponse {
    fn from(change: LedgerChange) -> Self {
        Self {
            payment: change.payment.into(),
            contract_status: change.contract_status,
            ledger: change.ledger,
            schedule: change.schedule.map(ScheduleResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub contract_id: Uuid,
    pub code: String,
    pub status: ContractStatus,
    pub ledger: LedgerSummary,
    pub payments: Vec<PaymentResponse>,
    pub schedule: Option<ScheduleResponse>,
}

impl From<LedgerView> for LedgerResponse {
    fn from(view: LedgerView) -> Self {
        Self {
            contract_id: view.contract.id,
            code: view.contract.code,
            status: view.contract.status,
            ledger: view.ledger,
            payments: view.payments.into_iter().map(PaymentResponse::from).collect(),
            schedule: view.schedule.map(ScheduleResponse::from),
        }
    }
}
