//! Response DTOs for contract endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Contract, ContractStatus, ScheduleType, Selections, StaffSlots};
use crate::pricing::responses::TotalBreakdownResponse;
use crate::pricing::TotalBreakdown;
use crate::staffing::responses::BookingResponse;

use super::services::ContractView;

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: Uuid,
    pub code: String,
    pub client_name: String,
    pub status: ContractStatus,
    pub event_date: NaiveDate,
    pub contract_date: NaiveDate,
    pub location_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub tax_rate: Option<Decimal>,
    pub selections: Selections,
    pub package_discount_version: i32,
    pub sunday_discount_version: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
    pub schedule_type: ScheduleType,
    pub staffing: StaffSlots,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<BookingResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<TotalBreakdownResponse>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            code: contract.code,
            client_name: contract.client_name,
            status: contract.status,
            event_date: contract.event_date,
            contract_date: contract.contract_date,
            location_id: contract.location_id,
            tax_rate: contract.tax_rate,
            selections: contract.selections,
            package_discount_version: contract.package_discount_version,
            sunday_discount_version: contract.sunday_discount_version,
            total_cost: contract.total_cost,
            schedule_type: contract.schedule_type,
            staffing: contract.staffing,
            updated_at: contract.updated_at,
            bookings: None,
            totals: None,
        }
    }
}

impl ContractResponse {
    pub fn priced(contract: Contract, totals: &TotalBreakdown) -> Self {
        let totals = TotalBreakdownResponse::new(Some(contract.id), totals);
        Self {
            totals: Some(totals),
            ..Self::from(contract)
        }
    }
}

impl From<ContractView> for ContractResponse {
    fn from(view: ContractView) -> Self {
        Self {
            bookings: Some(view.bookings.into_iter().map(BookingResponse::from).collect()),
            ..Self::from(view.contract)
        }
    }
}
