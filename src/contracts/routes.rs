//! Contract API routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::Result;
use crate::extract::{Json, Path};
use crate::AppState;

use super::requests::{ChangeStatusRequest, CreateContractRequest, UpdateSelectionsRequest};
use super::responses::ContractResponse;
use super::services;

/// Create the contracts router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contracts", post(create_contract))
        .route("/api/contracts/:id", get(get_contract))
        .route("/api/contracts/:id/selections", put(update_selections))
        .route("/api/contracts/:id/status", post(change_status))
}

async fn create_contract(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractResponse>)> {
    let today = Utc::now().date_naive();
    let (contract, totals) = services::create_contract(&state, request.into(), today, &actor).await?;
    Ok((StatusCode::CREATED, Json(ContractResponse::priced(contract, &totals))))
}

async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>> {
    let view = services::get_contract(&state, id).await?;
    Ok(Json(view.into()))
}

async fn update_selections(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<UpdateSelectionsRequest>,
) -> Result<Json<ContractResponse>> {
    let today = Utc::now().date_naive();
    let (contract, totals) =
        services::update_selections(&state, id, request.into(), today, &actor).await?;
    Ok(Json(ContractResponse::priced(contract, &totals)))
}

async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<ContractResponse>> {
    let contract = services::change_status(&state, id, request.status, &actor).await?;
    Ok(Json(contract.into()))
}
