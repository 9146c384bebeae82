//! Request DTOs for ledger and schedule endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{PaymentMethod, PaymentPurpose, ScheduleType};

use super::services::{NewPayment, PaymentUpdate};

/// Request to record a payment
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub purpose: Option<PaymentPurpose>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<RecordPaymentRequest> for NewPayment {
    fn from(request: RecordPaymentRequest) -> Self {
        Self {
            amount: request.amount,
            method: request.method,
            purpose: request.purpose,
            memo: request.memo,
            paid_at: request.paid_at,
        }
    }
}

/// Request to change a recorded payment
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub purpose: Option<PaymentPurpose>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl From<UpdatePaymentRequest> for PaymentUpdate {
    fn from(request: UpdatePaymentRequest) -> Self {
        Self {
            amount: request.amount,
            method: request.method,
            purpose: request.purpose,
            memo: request.memo,
        }
    }
}

/// Request to (re)generate the payment schedule
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default)]
    pub recalculate: bool,
}

/// Request to hand-edit one installment
#[derive(Debug, Deserialize)]
pub struct EditInstallmentRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}
