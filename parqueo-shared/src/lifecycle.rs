//! Reservation lifecycle logic.
//!
//! State machine per reservation: created(active) → terminated, or
//! created(active) → deleted. Terminated reservations never re-enter the
//! active state.
//!
//! Every sequence that touches both `reservas` and `espacios_parqueadero`
//! runs inside one transaction, with the space row locked `FOR UPDATE` for
//! the duration. Combined with the partial unique indexes on active
//! reservations, that guarantees at most one create commits per space per
//! availability window, and that a space's persisted state always matches
//! the existence of an active reservation once a sequence completes.
//!
//! Vehicle deletion also lives here: the guard against deleting a vehicle
//! with an active reservation and the delete itself must be one
//! transaction, since `reservas.vehiculo_id` cascades on delete.
//!
//! Each sequence locks at most one row kind (create and terminate/delete
//! lock their space or reservation row, vehicle deletion locks the vehicle
//! row), so the sequences cannot deadlock each other.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::reservation::{Reservation, ReservationView};
use crate::models::space::EstadoEspacio;
use crate::models::vehicle::Vehicle;

/// Grace window for "entry time is not in the past", covering client clock
/// skew and request latency.
const ENTRADA_GRACE_SECONDS: i64 = 60;

/// Domain errors produced by the reservation lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("entry time cannot be in the past")]
    PastEntryTime,

    #[error("vehicle not found")]
    VehicleNotFound,

    #[error("space not found")]
    SpaceNotFound,

    #[error("space is not available")]
    SpaceUnavailable,

    #[error("this vehicle already has an active reservation")]
    ActiveReservationExists,

    #[error("cannot delete a vehicle with an active reservation")]
    VehicleHasActiveReservation,

    #[error("reservation not found")]
    ReservationNotFound,

    #[error("reservation is already terminated")]
    AlreadyTerminated,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Request to create a reservation.
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub vehiculo_id: Uuid,
    pub espacio_id: Uuid,
    /// Entry timestamp; defaults to now when omitted.
    pub fecha_entrada: Option<DateTime<Utc>>,
}

/// Validates an entry timestamp against the current time.
///
/// Returns the effective entry time (now, when omitted). A requested time
/// earlier than now minus a small grace window is a client error.
pub fn resolve_fecha_entrada(
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, LifecycleError> {
    match requested {
        None => Ok(now),
        Some(entrada) => {
            if entrada < now - Duration::seconds(ENTRADA_GRACE_SECONDS) {
                Err(LifecycleError::PastEntryTime)
            } else {
                Ok(entrada)
            }
        }
    }
}

/// Creates a reservation and marks its space occupied, atomically.
///
/// Sequence (any failing step aborts the rest and rolls back):
/// 1. entry timestamp must not be in the past
/// 2. the vehicle must belong to the requesting user
/// 3. the space must exist (row locked `FOR UPDATE`)
/// 4. the space must be `disponible`
/// 5. the vehicle must have no active reservation
/// 6. insert the reservation, flip the space to `ocupado`, commit
///
/// Two concurrent calls for the same space serialize on the row lock; the
/// loser observes `ocupado` and gets [`LifecycleError::SpaceUnavailable`].
/// A concurrent insert racing on the same vehicle trips the partial unique
/// index instead of double-booking.
pub async fn create_reservation(
    pool: &PgPool,
    user_id: Uuid,
    req: CreateReservation,
) -> Result<ReservationView, LifecycleError> {
    let fecha_entrada = resolve_fecha_entrada(req.fecha_entrada, Utc::now())?;

    let vehicle = Vehicle::find_by_id(pool, req.vehiculo_id, user_id)
        .await?
        .ok_or(LifecycleError::VehicleNotFound)?;

    let mut tx = pool.begin().await?;

    // Lock the space row for the remainder of the transaction.
    let espacio: Option<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT id, estado
        FROM espacios_parqueadero
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(req.espacio_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (espacio_id, estado) = espacio.ok_or(LifecycleError::SpaceNotFound)?;
    if estado != EstadoEspacio::Disponible.as_str() {
        return Err(LifecycleError::SpaceUnavailable);
    }

    if Reservation::find_activa_by_vehiculo(&mut *tx, vehicle.id)
        .await?
        .is_some()
    {
        return Err(LifecycleError::ActiveReservationExists);
    }

    let reserva = Reservation::insert(&mut *tx, vehicle.id, espacio_id, fecha_entrada, user_id)
        .await
        .map_err(map_active_unique_violation)?;

    sqlx::query("UPDATE espacios_parqueadero SET estado = $1 WHERE id = $2")
        .bind(EstadoEspacio::Ocupado.as_str())
        .bind(espacio_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!(reserva_id = %reserva.id, espacio_id = %espacio_id, "Reservation created");

    Reservation::find_view_by_id(pool, reserva.id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)
}

/// Terminates a reservation and releases its space, atomically.
///
/// Re-terminating an already terminated reservation is a client error, not
/// a fatal condition.
pub async fn terminate_reservation(
    pool: &PgPool,
    user_id: Uuid,
    reserva_id: Uuid,
) -> Result<ReservationView, LifecycleError> {
    let mut tx = pool.begin().await?;

    let reserva = lock_reservation(&mut tx, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)?;

    if reserva.terminado {
        return Err(LifecycleError::AlreadyTerminated);
    }

    Reservation::terminate(&mut *tx, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)?;

    sqlx::query("UPDATE espacios_parqueadero SET estado = $1 WHERE id = $2")
        .bind(EstadoEspacio::Disponible.as_str())
        .bind(reserva.espacio_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!(reserva_id = %reserva_id, espacio_id = %reserva.espacio_id, "Reservation terminated");

    Reservation::find_view_by_id(pool, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)
}

/// Hard-deletes a reservation, releasing its space first if it is still
/// active. Returns the view as it was before deletion.
pub async fn delete_reservation(
    pool: &PgPool,
    user_id: Uuid,
    reserva_id: Uuid,
) -> Result<ReservationView, LifecycleError> {
    let view = Reservation::find_view_by_id(pool, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)?;

    let mut tx = pool.begin().await?;

    let reserva = lock_reservation(&mut tx, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)?;

    if !reserva.terminado {
        sqlx::query("UPDATE espacios_parqueadero SET estado = $1 WHERE id = $2")
            .bind(EstadoEspacio::Disponible.as_str())
            .bind(reserva.espacio_id)
            .execute(&mut *tx)
            .await?;
    }

    Reservation::delete(&mut *tx, reserva_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound)?;

    tx.commit().await?;

    debug!(reserva_id = %reserva_id, "Reservation deleted");

    Ok(view)
}

/// Deletes a vehicle unless it holds an active reservation, atomically.
///
/// The vehicle row is locked `FOR UPDATE` for the transaction. A concurrent
/// `create_reservation` insert takes a key-share lock on the same row for
/// its foreign key check, so the two serialize: whichever commits first
/// makes the other fail its own check. The delete's cascade therefore only
/// ever removes terminated reservation history, never an active row.
///
/// An unknown id and an id owned by someone else are indistinguishable to
/// the caller ([`LifecycleError::VehicleNotFound`]); the active-reservation
/// guard runs only after ownership is resolved.
pub async fn delete_vehicle(
    pool: &PgPool,
    user_id: Uuid,
    vehiculo_id: Uuid,
) -> Result<Vehicle, LifecycleError> {
    let mut tx = pool.begin().await?;

    let vehicle: Option<Vehicle> = sqlx::query_as(
        r#"
        SELECT id, user_id, placa, marca, modelo, color, created_at
        FROM vehiculos
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(vehiculo_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let vehicle = vehicle.ok_or(LifecycleError::VehicleNotFound)?;

    if Reservation::find_activa_by_vehiculo(&mut *tx, vehicle.id)
        .await?
        .is_some()
    {
        return Err(LifecycleError::VehicleHasActiveReservation);
    }

    Vehicle::delete(&mut *tx, vehicle.id, user_id)
        .await?
        .ok_or(LifecycleError::VehicleNotFound)?;

    tx.commit().await?;

    debug!(vehiculo_id = %vehicle.id, "Vehicle deleted");

    Ok(vehicle)
}

/// Locks a reservation row (scoped by owner) for the transaction.
async fn lock_reservation(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Reservation>, sqlx::Error> {
    sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, vehiculo_id, espacio_id, user_id,
               fecha_entrada, fecha_salida, terminado, created_at
        FROM reservas
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Maps a partial-unique-index violation on insert to the matching domain
/// error; anything else passes through.
fn map_active_unique_violation(err: sqlx::Error) -> LifecycleError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("vehiculo_activa") {
                return LifecycleError::ActiveReservationExists;
            }
            if constraint.contains("espacio_activa") {
                return LifecycleError::SpaceUnavailable;
            }
        }
    }
    LifecycleError::Db(err)
}
