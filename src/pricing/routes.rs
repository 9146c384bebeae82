//! Pricing API routes.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::error::Result;
use crate::models::Contract;
use crate::extract::{Json, Path};
use crate::AppState;

use super::requests::QuoteRequest;
use super::responses::TotalBreakdownResponse;
use super::services::{contract_total, load_catalog, reprice};

/// Create the pricing router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contracts/:id/total", get(get_contract_total))
        .route("/api/pricing/quote", post(quote))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/invalidate", post(invalidate_cache))
}

/// Authoritative total for a stored contract
async fn get_contract_total(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TotalBreakdownResponse>> {
    let (contract, totals) = contract_total(&state, id).await?;
    Ok(Json(TotalBreakdownResponse::new(Some(contract.id), &totals)))
}

/// Price a prospective set of selections without saving anything
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<TotalBreakdownResponse>> {
    let catalog = load_catalog(&state).await?;

    let mut draft = Contract::new(
        String::new(),
        String::new(),
        request.event_date,
        Utc::now().date_naive(),
    );
    draft.location_id = request.location_id;
    draft.selections = request.selections;
    draft.package_discount_version = request.package_discount_version;
    draft.sunday_discount_version = request.sunday_discount_version;

    let totals = reprice(&mut draft, &catalog, state.policy.pricing())?;
    Ok(Json(TotalBreakdownResponse::new(None, &totals)))
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

#[derive(Serialize)]
struct InvalidateResponse {
    invalidated: bool,
}

/// Drop cached catalog and roster data after back-office edits
async fn invalidate_cache(State(state): State<AppState>) -> Json<InvalidateResponse> {
    state.cache.invalidate_all();
    Json(InvalidateResponse { invalidated: true })
}
