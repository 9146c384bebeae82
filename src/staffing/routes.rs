//! Booking slot and availability API routes.

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::extract::{Json, Path};
use crate::AppState;

use super::requests::{AssignRoleRequest, BookingStatusRequest, MarkAvailabilityRequest};
use super::responses::{AvailabilityResponse, BookingResponse};
use super::services;

/// Create the staffing router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contracts/:id/bookings/:role",
            put(assign_role).delete(remove_booking),
        )
        .route(
            "/api/contracts/:id/bookings/:role/status",
            post(change_booking_status),
        )
        .route(
            "/api/staff/:id/availability/:date",
            get(get_availability).put(mark_availability),
        )
}

fn parse_role(raw: &str) -> Result<Role> {
    raw.parse()
        .map_err(|_| AppError::validation("role", format!("unknown role '{}'", raw)))
}

async fn assign_role(
    State(state): State<AppState>,
    Path((id, role)): Path<(Uuid, String)>,
    actor: Actor,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<BookingResponse>> {
    let role = parse_role(&role)?;
    let booking = services::assign_role(&state, id, role, request.into(), &actor).await?;
    Ok(Json(booking.into()))
}

async fn change_booking_status(
    State(state): State<AppState>,
    Path((id, role)): Path<(Uuid, String)>,
    actor: Actor,
    Json(request): Json<BookingStatusRequest>,
) -> Result<Json<BookingResponse>> {
    let role = parse_role(&role)?;
    let booking = services::change_booking_status(&state, id, role, request.status, &actor).await?;
    Ok(Json(booking.into()))
}

async fn remove_booking(
    State(state): State<AppState>,
    Path((id, role)): Path<(Uuid, String)>,
    actor: Actor,
) -> Result<Json<BookingResponse>> {
    let role = parse_role(&role)?;
    let booking = services::remove_booking(&state, id, role, &actor).await?;
    Ok(Json(booking.into()))
}

async fn get_availability(
    State(state): State<AppState>,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<AvailabilityResponse>> {
    let row = services::staff_availability(&state, id, date).await?;
    Ok(Json(row.into()))
}

async fn mark_availability(
    State(state): State<AppState>,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
    actor: Actor,
    Json(request): Json<MarkAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>> {
    let row = services::mark_availability(&state, id, date, request.unavailable, &actor).await?;
    Ok(Json(row.into()))
}
