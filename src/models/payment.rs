//! Ledger payments and payment schedules

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    CreditCard,
    BankTransfer,
    Other,
}

/// What a payment (or a scheduled installment) is for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentPurpose {
    Deposit,
    Balance,
    Other,
}

/// Ledger entry. The amount never changes without an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub purpose: Option<PaymentPurpose>,
    pub memo: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleType {
    /// Fixed 50% deposit + balance plan
    #[default]
    ScheduleA,
    /// Deposit itemized from the selected components
    Custom,
}

/// One scheduled installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePayment {
    pub id: Uuid,
    pub purpose: PaymentPurpose,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    /// Derived by reconciliation against the ledger
    pub paid: bool,
    /// Portion of the ledger allocated to this installment by the last reconciliation
    pub amount_applied: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub contract_id: Uuid,
    pub schedule_type: ScheduleType,
    pub installments: Vec<SchedulePayment>,
    /// Set once office staff edits an installment amount by hand
    pub manually_edited: bool,
    pub generated_at: DateTime<Utc>,
}

impl PaymentSchedule {
    pub fn scheduled_total(&self) -> Decimal {
        self.installments.iter().map(|i| i.amount).sum()
    }

    pub fn installment_mut(&mut self, id: Uuid) -> Option<&mut SchedulePayment> {
        self.installments.iter_mut().find(|i| i.id == id)
    }
}
