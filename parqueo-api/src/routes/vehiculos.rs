//! Vehicle endpoints. All require a bearer token and are scoped to the
//! caller's own vehicles.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use parqueo_shared::auth::middleware::AuthContext;
use parqueo_shared::lifecycle;
use parqueo_shared::models::vehicle::{normalize_placa, CreateVehicle, UpdateVehicle, Vehicle};
use serde::Deserialize;
use uuid::Uuid;

/// Vehicle create request: only the plate is required.
#[derive(Debug, Deserialize)]
pub struct CreateVehiculoRequest {
    pub placa: String,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
}

/// Vehicle update request: any subset of fields; omitted fields keep their
/// current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehiculoRequest {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
}

/// `GET /vehiculos` - the caller's vehicles.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    let vehiculos = Vehicle::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(vehiculos))
}

/// `GET /vehiculos/:id`
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    let vehiculo = Vehicle::find_by_id(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("vehicle not found".to_string()))?;

    Ok(Json(vehiculo))
}

/// `POST /vehiculos` - register a vehicle. The plate is uppercased and must
/// be unique among the caller's vehicles.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateVehiculoRequest>,
) -> ApiResult<Json<Vehicle>> {
    let placa = normalize_placa(&req.placa);
    if placa.is_empty() {
        return Err(ApiError::BadRequest("placa is required".to_string()));
    }

    // Pre-check for a friendlier message; the (user_id, placa) unique
    // constraint still backs this under concurrency.
    if Vehicle::find_by_placa(&state.db, &placa, auth.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "you already have a vehicle with that plate".to_string(),
        ));
    }

    let vehiculo = Vehicle::create(
        &state.db,
        auth.user_id,
        CreateVehicle {
            placa,
            marca: req.marca.unwrap_or_default(),
            modelo: req.modelo.unwrap_or_default(),
            color: req.color.unwrap_or_default(),
        },
    )
    .await?;

    Ok(Json(vehiculo))
}

/// `PUT /vehiculos/:id` - update any subset of fields.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVehiculoRequest>,
) -> ApiResult<Json<Vehicle>> {
    let vehiculo = Vehicle::update(
        &state.db,
        id,
        auth.user_id,
        UpdateVehicle {
            placa: req.placa,
            marca: req.marca,
            modelo: req.modelo,
            color: req.color,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("vehicle not found".to_string()))?;

    Ok(Json(vehiculo))
}

/// `DELETE /vehiculos/:id` - delete a vehicle. Rejected while the vehicle
/// holds an active reservation; the guard and the delete run in one
/// transaction in the lifecycle module.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    let vehiculo = lifecycle::delete_vehicle(&state.db, auth.user_id, id).await?;
    Ok(Json(vehiculo))
}
