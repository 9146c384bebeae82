//! Core pricing calculation functions.
//!
//! Pure functions for contract pricing math - no database access.
//! Callers load the catalog, call [`compute_total`] and decide whether to
//! persist the result.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::models::{
    Catalog, Contract, DiscountKind, DiscountRule, ProductLine, Selections, ServiceType,
};

/// Legacy per-service Sunday discount.
pub const SUNDAY_DISCOUNT_PER_SERVICE: Decimal = dec!(100.00);

/// Round to specified decimal places, half away from zero.
///
/// Money is never truncated and never passes through floating point.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use weddingops_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest hundred: divide by 100, round half-up to an
/// integer, multiply back.
pub fn round_to_nearest_hundred(amount: Decimal) -> Decimal {
    round_money(amount / dec!(100), 0) * dec!(100)
}

/// Catalog data that should always resolve did not.
///
/// These point at deployment or data-integrity problems, never at user input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("{kind} {id} is not in the catalog")]
    UnknownCatalogItem { kind: &'static str, id: Uuid },

    #[error("{kind} {id} belongs to {found} but was selected on the {expected} line")]
    ServiceTypeMismatch {
        kind: &'static str,
        id: Uuid,
        expected: ServiceType,
        found: ServiceType,
    },
}

/// Knobs that change how discounts are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Use the versioned Sunday rule's `base_amount` instead of the legacy
    /// fixed [`SUNDAY_DISCOUNT_PER_SERVICE`].
    pub sunday_discount_from_rule: bool,
}

/// Cost of one service line
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLineCost {
    pub service_type: ServiceType,
    pub package: Decimal,
    pub option: Decimal,
    pub engagement: Decimal,
    pub overtime: Decimal,
    pub total: Decimal,
}

/// Product subtotal and tax
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotals {
    pub subtotal: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
}

/// Full price breakdown for a contract. Every amount is rounded to cents.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalBreakdown {
    pub lines: Vec<ServiceLineCost>,
    pub total_service_cost: Decimal,
    pub package_discount: Decimal,
    pub sunday_discount: Decimal,
    pub adhoc_discount: Decimal,
    pub total_discount: Decimal,
    pub products: ProductTotals,
    pub total_cost: Decimal,
}

impl TotalBreakdown {
    pub fn line(&self, service_type: ServiceType) -> Option<&ServiceLineCost> {
        self.lines.iter().find(|l| l.service_type == service_type)
    }
}

/// Compute the authoritative total for a contract.
///
/// 1. Per service line: package + additional option + engagement session
///    (photography only) + overtime attributed to the line.
/// 2. Package-bundle discount from the active rule at the contract's version.
/// 3. Sunday discount per selected package.
/// 4. Ad-hoc discounts.
/// 5. Products and tax on the taxable part.
///
/// `total_cost = services + products + tax - discounts`
///
/// # Errors
/// [`PricingError`] when a selected id is missing from the catalog or sits on
/// the wrong service line. A contract without a tax rate is taxed at zero.
pub fn compute_total(
    contract: &Contract,
    catalog: &Catalog,
    policy: PricingPolicy,
) -> Result<TotalBreakdown, PricingError> {
    let selections = &contract.selections;

    let lines = ServiceType::ALL
        .iter()
        .map(|service_type| service_line_cost(*service_type, selections, catalog))
        .collect::<Result<Vec<_>, _>>()?;
    let total_service_cost: Decimal = lines.iter().map(|l| l.total).sum();

    let package_rule =
        catalog.active_discount_rule(DiscountKind::Package, contract.package_discount_version);
    let package_discount = package_discount(selections, package_rule);

    let per_service = if policy.sunday_discount_from_rule {
        catalog
            .active_discount_rule(DiscountKind::Sunday, contract.sunday_discount_version)
            .map(|rule| rule.base_amount)
            .unwrap_or(Decimal::ZERO)
    } else {
        SUNDAY_DISCOUNT_PER_SERVICE
    };
    let sunday_discount = sunday_discount(contract.event_date, selections, per_service);

    let adhoc_discount = round_money(selections.discounts.iter().map(|d| d.amount).sum(), 2);
    let total_discount = package_discount + sunday_discount + adhoc_discount;

    let products = product_totals(&selections.products, catalog, contract.tax_rate)?;

    let total_cost =
        round_money(total_service_cost + products.subtotal + products.tax - total_discount, 2);

    Ok(TotalBreakdown {
        lines,
        total_service_cost,
        package_discount,
        sunday_discount,
        adhoc_discount,
        total_discount,
        products,
        total_cost,
    })
}

/// Cost of a single service line.
pub fn service_line_cost(
    service_type: ServiceType,
    selections: &Selections,
    catalog: &Catalog,
) -> Result<ServiceLineCost, PricingError> {
    let line = selections.line(service_type);

    let package = match line.package_id {
        Some(id) => {
            let package = catalog
                .package(id)
                .ok_or(PricingError::UnknownCatalogItem { kind: "package", id })?;
            ensure_line(service_type, package.service_type, "package", id)?;
            package.price
        }
        None => Decimal::ZERO,
    };

    let option = match line.option_id {
        Some(id) => {
            let option = catalog
                .option(id)
                .ok_or(PricingError::UnknownCatalogItem { kind: "option", id })?;
            ensure_line(service_type, option.service_type, "option", id)?;
            option.price
        }
        None => Decimal::ZERO,
    };

    let engagement = match (service_type, selections.engagement_session_id) {
        (ServiceType::Photography, Some(id)) => {
            catalog
                .engagement_session(id)
                .ok_or(PricingError::UnknownCatalogItem {
                    kind: "engagement session",
                    id,
                })?
                .price
        }
        _ => Decimal::ZERO,
    };

    let overtime: Decimal = selections
        .overtime
        .iter()
        .filter(|entry| entry.role.service_type() == service_type)
        .map(|entry| entry.hours * entry.rate)
        .sum();

    let package = round_money(package, 2);
    let option = round_money(option, 2);
    let engagement = round_money(engagement, 2);
    let overtime = round_money(overtime, 2);

    Ok(ServiceLineCost {
        service_type,
        package,
        option,
        engagement,
        overtime,
        total: package + option + engagement + overtime,
    })
}

fn ensure_line(
    expected: ServiceType,
    found: ServiceType,
    kind: &'static str,
    id: Uuid,
) -> Result<(), PricingError> {
    if expected == found {
        Ok(())
    } else {
        Err(PricingError::ServiceTypeMismatch {
            kind,
            id,
            expected,
            found,
        })
    }
}

/// Package-bundle discount.
///
/// Needs an active rule and at least two of photography, videography and DJ.
/// Each selected core package earns `base_amount`; a photobooth package adds
/// one more. Photobooth never counts towards the threshold.
pub fn package_discount(selections: &Selections, rule: Option<&DiscountRule>) -> Decimal {
    let Some(rule) = rule else {
        return Decimal::ZERO;
    };

    let core_count = ServiceType::CORE
        .iter()
        .filter(|service_type| selections.has_package(**service_type))
        .count();
    if core_count < 2 {
        return Decimal::ZERO;
    }

    let mut increments = core_count;
    if selections.has_package(ServiceType::Photobooth) {
        increments += 1;
    }

    round_money(rule.base_amount * Decimal::from(increments), 2)
}

/// Sunday discount: `per_service` for each of the four lines with a package.
pub fn sunday_discount(event_date: NaiveDate, selections: &Selections, per_service: Decimal) -> Decimal {
    if event_date.weekday() != Weekday::Sun {
        return Decimal::ZERO;
    }

    let selected = ServiceType::ALL
        .iter()
        .filter(|service_type| selections.has_package(**service_type))
        .count();

    round_money(per_service * Decimal::from(selected), 2)
}

/// Product subtotal, taxable amount and tax.
pub fn product_totals(
    lines: &[ProductLine],
    catalog: &Catalog,
    tax_rate: Option<Decimal>,
) -> Result<ProductTotals, PricingError> {
    let mut subtotal = Decimal::ZERO;
    let mut taxable_amount = Decimal::ZERO;

    for line in lines {
        let product = catalog
            .product(line.product_id)
            .ok_or(PricingError::UnknownCatalogItem {
                kind: "product",
                id: line.product_id,
            })?;

        let amount = product.unit_price * Decimal::from(line.quantity);
        subtotal += amount;
        if product.taxable {
            taxable_amount += amount;
        }
    }

    let tax_rate = tax_rate.unwrap_or(Decimal::ZERO);
    let subtotal = round_money(subtotal, 2);
    let taxable_amount = round_money(taxable_amount, 2);

    Ok(ProductTotals {
        subtotal,
        taxable_amount,
        tax_rate,
        tax: round_money(taxable_amount * tax_rate / dec!(100), 2),
    })
}
