//! Reservation endpoints. All require a bearer token; every operation is
//! scoped to the caller's own reservations.
//!
//! Create, terminate, and delete go through the lifecycle module, which
//! pairs the reservation write with the space-state flip in one
//! transaction.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use parqueo_shared::auth::middleware::AuthContext;
use parqueo_shared::lifecycle::{self, CreateReservation};
use parqueo_shared::models::reservation::{Reservation, ReservationView};
use serde::Deserialize;
use uuid::Uuid;

/// Reservation create request. `fecha_entrada` defaults to now.
#[derive(Debug, Deserialize)]
pub struct CreateReservaRequest {
    pub vehiculo_id: Uuid,
    pub espacio_id: Uuid,
    pub fecha_entrada: Option<DateTime<Utc>>,
}

/// `GET /reservas` - the caller's reservations, denormalized.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ReservationView>>> {
    let reservas = Reservation::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(reservas))
}

/// `GET /reservas/activas` - active reservations only.
pub async fn list_activas(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ReservationView>>> {
    let reservas = Reservation::list_activas_by_user(&state.db, auth.user_id).await?;
    Ok(Json(reservas))
}

/// `GET /reservas/:id`
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReservationView>> {
    let reserva = Reservation::find_view_by_id(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("reservation not found".to_string()))?;

    Ok(Json(reserva))
}

/// `POST /reservas` - reserve a space for a vehicle. On success the space
/// is marked occupied.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReservaRequest>,
) -> ApiResult<Json<ReservationView>> {
    let reserva = lifecycle::create_reservation(
        &state.db,
        auth.user_id,
        CreateReservation {
            vehiculo_id: req.vehiculo_id,
            espacio_id: req.espacio_id,
            fecha_entrada: req.fecha_entrada,
        },
    )
    .await?;

    Ok(Json(reserva))
}

/// `PUT /reservas/:id/terminar` - terminate a reservation and release its
/// space. Re-terminating is a client error.
pub async fn terminar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReservationView>> {
    let reserva = lifecycle::terminate_reservation(&state.db, auth.user_id, id).await?;
    Ok(Json(reserva))
}

/// `DELETE /reservas/:id` - permanently delete a reservation, releasing
/// its space if it was still active.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReservationView>> {
    let reserva = lifecycle::delete_reservation(&state.db, auth.user_id, id).await?;
    Ok(Json(reserva))
}
