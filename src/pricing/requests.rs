//! Request DTOs for pricing API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Selections;

/// Request to price a set of selections without a stored contract
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub event_date: NaiveDate,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub selections: Selections,
    #[serde(default = "default_version")]
    pub package_discount_version: i32,
    #[serde(default = "default_version")]
    pub sunday_discount_version: i32,
}

fn default_version() -> i32 {
    1
}
