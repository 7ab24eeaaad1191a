//! Parking space endpoints.
//!
//! Reads are public; mutations require a bearer token. Create and delete
//! are deliberately unimplemented (spaces are provisioned by the seed, not
//! over the API).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use parqueo_shared::models::space::ParkingSpace;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A space as rendered over the wire, with the `disponible` convenience
/// flag derived from `estado`.
#[derive(Debug, Serialize)]
pub struct EspacioResponse {
    pub id: Uuid,
    pub numero_espacio: String,
    pub piso: i32,
    pub tipo: String,
    pub estado: String,
    pub disponible: bool,
}

impl From<ParkingSpace> for EspacioResponse {
    fn from(space: ParkingSpace) -> Self {
        let disponible = space.disponible();
        Self {
            id: space.id,
            numero_espacio: space.numero,
            piso: space.piso,
            tipo: space.tipo,
            estado: space.estado,
            disponible,
        }
    }
}

/// Space update request: only the state can change.
#[derive(Debug, Deserialize)]
pub struct UpdateEspacioRequest {
    pub estado: Option<String>,
}

/// `GET /espacios` - all spaces, ordered by floor then number.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EspacioResponse>>> {
    let espacios = ParkingSpace::list(&state.db).await?;
    Ok(Json(espacios.into_iter().map(Into::into).collect()))
}

/// `GET /espacios/disponibles` - available spaces only.
pub async fn list_disponibles(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EspacioResponse>>> {
    let espacios = ParkingSpace::list_disponibles(&state.db).await?;
    Ok(Json(espacios.into_iter().map(Into::into).collect()))
}

/// `GET /espacios/:id` - single space.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EspacioResponse>> {
    let espacio = ParkingSpace::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("space not found".to_string()))?;

    Ok(Json(espacio.into()))
}

/// `PUT /espacios/:id` - set a space's state. The value itself is not
/// validated here; the schema constraint rejects unknown states.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEspacioRequest>,
) -> ApiResult<Json<EspacioResponse>> {
    let estado = req
        .estado
        .ok_or_else(|| ApiError::BadRequest("estado is required".to_string()))?;

    let espacio = ParkingSpace::update_estado(&state.db, id, &estado)
        .await?
        .ok_or_else(|| ApiError::NotFound("space not found".to_string()))?;

    Ok(Json(espacio.into()))
}

/// `POST /espacios` - not implemented.
pub async fn create() -> ApiResult<()> {
    Err(ApiError::NotImplemented(
        "space creation is not implemented".to_string(),
    ))
}

/// `DELETE /espacios/:id` - not implemented.
pub async fn remove() -> ApiResult<()> {
    Err(ApiError::NotImplemented(
        "space deletion is not implemented".to_string(),
    ))
}
