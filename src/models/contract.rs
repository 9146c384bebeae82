//! Contract aggregate and its line-item selections

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::catalog::ServiceType;
use super::payment::ScheduleType;
use super::staffing::{Role, StaffSlots};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContractStatus {
    Pipeline,
    Forecast,
    Pending,
    Booked,
    Completed,
    Dead,
}

impl ContractStatus {
    pub fn is_terminal(self) -> bool {
        self == ContractStatus::Dead
    }

    /// Statuses that move to `Booked` when the first payment lands.
    pub fn promotes_on_payment(self) -> bool {
        matches!(
            self,
            ContractStatus::Pipeline | ContractStatus::Forecast | ContractStatus::Pending
        )
    }
}

/// Package and additional option picked for one service line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub package_id: Option<Uuid>,
    pub option_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    pub role: Role,
    pub hours: Decimal,
    /// Hourly rate copied from the overtime rate table when the entry was added
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Ad-hoc service fee adjustment or discount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdHocDiscount {
    pub memo: String,
    pub amount: Decimal,
    #[serde(default)]
    pub service_type: Option<ServiceType>,
}

/// Everything on the contract that feeds the price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selections {
    #[serde(default)]
    pub photography: ServiceSelection,
    #[serde(default)]
    pub videography: ServiceSelection,
    #[serde(default)]
    pub dj: ServiceSelection,
    #[serde(default)]
    pub photobooth: ServiceSelection,
    #[serde(default)]
    pub engagement_session_id: Option<Uuid>,
    #[serde(default)]
    pub overtime: Vec<OvertimeEntry>,
    #[serde(default)]
    pub products: Vec<ProductLine>,
    #[serde(default)]
    pub discounts: Vec<AdHocDiscount>,
}

impl Selections {
    pub fn line(&self, service_type: ServiceType) -> &ServiceSelection {
        match service_type {
            ServiceType::Photography => &self.photography,
            ServiceType::Videography => &self.videography,
            ServiceType::Dj => &self.dj,
            ServiceType::Photobooth => &self.photobooth,
        }
    }

    pub fn line_mut(&mut self, service_type: ServiceType) -> &mut ServiceSelection {
        match service_type {
            ServiceType::Photography => &mut self.photography,
            ServiceType::Videography => &mut self.videography,
            ServiceType::Dj => &mut self.dj,
            ServiceType::Photobooth => &mut self.photobooth,
        }
    }

    pub fn has_package(&self, service_type: ServiceType) -> bool {
        self.line(service_type).package_id.is_some()
    }
}

/// Booking/order aggregate for one client's event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    /// Human-readable `YY-MM-NN` code assigned at creation
    pub code: String,
    pub client_name: String,
    pub status: ContractStatus,
    pub event_date: NaiveDate,
    pub contract_date: NaiveDate,
    pub location_id: Option<Uuid>,
    /// Location tax rate as of the last save
    pub tax_rate: Option<Decimal>,
    pub selections: Selections,
    pub package_discount_version: i32,
    pub sunday_discount_version: i32,
    /// Cached result of the last price computation
    pub total_cost: Decimal,
    pub schedule_type: ScheduleType,
    pub staffing: StaffSlots,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Fresh pipeline contract with nothing selected yet
    pub fn new(
        code: String,
        client_name: String,
        event_date: NaiveDate,
        contract_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            client_name,
            status: ContractStatus::Pipeline,
            event_date,
            contract_date,
            location_id: None,
            tax_rate: None,
            selections: Selections::default(),
            package_discount_version: 1,
            sunday_discount_version: 1,
            total_cost: Decimal::ZERO,
            schedule_type: ScheduleType::default(),
            staffing: StaffSlots::default(),
            updated_at: Utc::now(),
        }
    }
}

/// Format a contract code from its creation date and monthly sequence.
///
/// `sequence` is 1-based. Months with more than 99 contracts simply grow a
/// third digit.
pub fn contract_code(created: NaiveDate, sequence: u32) -> String {
    format!(
        "{:02}-{:02}-{:02}",
        created.year().rem_euclid(100),
        created.month(),
        sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_code_format() {
        let created = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(contract_code(created, 1), "26-03-01");
        assert_eq!(contract_code(created, 42), "26-03-42");
        assert_eq!(contract_code(created, 105), "26-03-105");
    }

    #[test]
    fn test_promotion_statuses() {
        assert!(ContractStatus::Pipeline.promotes_on_payment());
        assert!(ContractStatus::Forecast.promotes_on_payment());
        assert!(ContractStatus::Pending.promotes_on_payment());
        assert!(!ContractStatus::Booked.promotes_on_payment());
        assert!(!ContractStatus::Completed.promotes_on_payment());
        assert!(!ContractStatus::Dead.promotes_on_payment());
    }

    #[test]
    fn test_selections_deserialize_with_defaults() {
        let selections: Selections = serde_json::from_value(serde_json::json!({
            "dj": { "package_id": "6f1c8c36-3f43-4df7-8b1c-2a9c36a1b0f1" }
        }))
        .unwrap();

        assert!(selections.has_package(ServiceType::Dj));
        assert!(!selections.has_package(ServiceType::Photography));
        assert!(selections.overtime.is_empty());
    }
}
