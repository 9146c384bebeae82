//! Request DTOs for contract endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::models::{ContractStatus, ScheduleType, Selections};

use super::services::{ContractUpdate, NewContract};

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub client_name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub selections: Selections,
    #[serde(default)]
    pub schedule_type: ScheduleType,
}

impl From<CreateContractRequest> for NewContract {
    fn from(request: CreateContractRequest) -> Self {
        Self {
            client_name: request.client_name,
            event_date: request.event_date,
            location_id: request.location_id,
            selections: request.selections,
            schedule_type: request.schedule_type,
        }
    }
}

/// Distinguishes an absent field from an explicit `null`
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request to edit the priced parts of a contract. Omitted fields are kept;
/// `"location_id": null` removes the location.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSelectionsRequest {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub selections: Option<Selections>,
    #[serde(default)]
    pub package_discount_version: Option<i32>,
    #[serde(default)]
    pub sunday_discount_version: Option<i32>,
}

impl From<UpdateSelectionsRequest> for ContractUpdate {
    fn from(request: UpdateSelectionsRequest) -> Self {
        Self {
            client_name: request.client_name,
            event_date: request.event_date,
            location_id: request.location_id,
            selections: request.selections,
            package_discount_version: request.package_discount_version,
            sunday_discount_version: request.sunday_discount_version,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: ContractStatus,
}
