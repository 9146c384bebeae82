//! Pricing service functions with store and cache access.
//!
//! Every contract mutation funnels through [`reprice`] before it is
//! persisted, so the cached `total_cost` and `tax_rate` never drift from the
//! selections.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Catalog, Contract};
use crate::AppState;

use super::calculators::{compute_total, PricingPolicy, TotalBreakdown};

/// Catalog snapshot through the application cache
pub async fn load_catalog(state: &AppState) -> Result<Arc<Catalog>> {
    state.cache.catalog(state.store.as_ref()).await
}

/// Refresh the contract's tax snapshot and cached total in place.
///
/// The tax rate is copied from the contract's location as it is right now;
/// no location means no tax. A location id the catalog does not know is a
/// configuration error, like any other dangling catalog reference.
pub fn reprice(
    contract: &mut Contract,
    catalog: &Catalog,
    policy: PricingPolicy,
) -> Result<TotalBreakdown> {
    contract.tax_rate = match contract.location_id {
        Some(location_id) => {
            let location = catalog.location(location_id).ok_or_else(|| {
                tracing::error!(contract_id = %contract.id, %location_id, "contract location missing from catalog");
                AppError::Configuration(format!("location {} is not in the catalog", location_id))
            })?;
            location.tax_rate
        }
        None => None,
    };

    let totals = compute_total(contract, catalog, policy).map_err(|e| {
        tracing::error!(contract_id = %contract.id, code = %contract.code, error = %e, "pricing failed");
        AppError::from(e)
    })?;

    contract.total_cost = totals.total_cost;
    Ok(totals)
}

/// Current price breakdown for a stored contract. Nothing is persisted.
pub async fn contract_total(state: &AppState, contract_id: Uuid) -> Result<(Contract, TotalBreakdown)> {
    let mut contract = state
        .store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AppError::not_found("contract", contract_id))?;
    let catalog = load_catalog(state).await?;

    let totals = reprice(&mut contract, &catalog, state.policy.pricing())?;
    Ok((contract, totals))
}
