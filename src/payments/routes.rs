//! Ledger and payment schedule API routes.

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::Result;
use crate::extract::{Json, Path};
use crate::AppState;

use super::requests::{
    EditInstallmentRequest, RecordPaymentRequest, ScheduleRequest, UpdatePaymentRequest,
};
use super::responses::{LedgerChangeResponse, LedgerResponse, ScheduleResponse};
use super::services;

/// Create the payments router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contracts/:id/ledger", get(ledger))
        .route("/api/contracts/:id/payments", post(record_payment))
        .route(
            "/api/payments/:id",
            put(update_payment).delete(delete_payment),
        )
        .route("/api/contracts/:id/schedule", post(rebuild_schedule))
        .route(
            "/api/contracts/:id/schedule/installments/:installment_id",
            put(edit_installment),
        )
}

async fn ledger(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<LedgerResponse>> {
    let view = services::ledger_view(&state, id).await?;
    Ok(Json(view.into()))
}

async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<LedgerChangeResponse>> {
    let change = services::record_payment(&state, id, request.into(), &actor).await?;
    Ok(Json(change.into()))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<LedgerChangeResponse>> {
    let change = services::update_payment(&state, id, request.into(), &actor).await?;
    Ok(Json(change.into()))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<LedgerChangeResponse>> {
    let change = services::delete_payment(&state, id, &actor).await?;
    Ok(Json(change.into()))
}

async fn rebuild_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>> {
    let today = Utc::now().date_naive();
    let schedule = services::rebuild_schedule(
        &state,
        id,
        request.schedule_type,
        request.recalculate,
        today,
        &actor,
    )
    .await?;
    Ok(Json(schedule.into()))
}

async fn edit_installment(
    State(state): State<AppState>,
    Path((id, installment_id)): Path<(Uuid, Uuid)>,
    actor: Actor,
    Json(request): Json<EditInstallmentRequest>,
) -> Result<Json<ScheduleResponse>> {
    let schedule = services::edit_installment(
        &state,
        id,
        installment_id,
        request.amount,
        request.due_date,
        &actor,
    )
    .await?;
    Ok(Json(schedule.into()))
}
