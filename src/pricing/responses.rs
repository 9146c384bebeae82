//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::ServiceType;

use super::calculators::{ProductTotals, ServiceLineCost, TotalBreakdown};

/// Cost of one service line
#[derive(Debug, Serialize)]
pub struct ServiceLineResponse {
    pub service_type: ServiceType,
    #[serde(with = "rust_decimal::serde::str")]
    pub package: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub option: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub engagement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub overtime: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl From<&ServiceLineCost> for ServiceLineResponse {
    fn from(line: &ServiceLineCost) -> Self {
        Self {
            service_type: line.service_type,
            package: line.package,
            option: line.option,
            engagement: line.engagement,
            overtime: line.overtime,
            total: line.total,
        }
    }
}

/// Product subtotal and tax
#[derive(Debug, Serialize)]
pub struct ProductTotalsResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taxable_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
}

impl From<&ProductTotals> for ProductTotalsResponse {
    fn from(products: &ProductTotals) -> Self {
        Self {
            subtotal: products.subtotal,
            taxable_amount: products.taxable_amount,
            tax_rate: products.tax_rate,
            tax: products.tax,
        }
    }
}

/// Response for a price computation
#[derive(Debug, Serialize)]
pub struct TotalBreakdownResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<Uuid>,
    pub lines: Vec<ServiceLineResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_service_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub package_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub sunday_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub adhoc_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_discount: Decimal,
    pub products: ProductTotalsResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
}

impl TotalBreakdownResponse {
    pub fn new(contract_id: Option<Uuid>, totals: &TotalBreakdown) -> Self {
        Self {
            contract_id,
            lines: totals.lines.iter().map(ServiceLineResponse::from).collect(),
            total_service_cost: totals.total_service_cost,
            package_discount: totals.package_discount,
            sunday_discount: totals.sunday_discount,
            adhoc_discount: totals.adhoc_discount,
            total_discount: totals.total_discount,
            products: ProductTotalsResponse::from(&totals.products),
            total_cost: totals.total_cost,
        }
    }
}
