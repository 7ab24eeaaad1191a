//! Reservation model, the denormalized read view, and the raw statements
//! composed by the lifecycle logic.
//!
//! A reservation binds one vehicle to one space for an open-ended interval.
//! Its derived status is `activa` while `terminado = false` and `terminada`
//! afterwards; the derivation happens once, in the view query, instead of
//! being repeated ad hoc per caller.
//!
//! The write statements here take any `PgExecutor` so the lifecycle module
//! can run them inside a single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// A raw reservation row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub vehiculo_id: Uuid,
    pub espacio_id: Uuid,
    pub user_id: Uuid,
    pub fecha_entrada: DateTime<Utc>,
    pub fecha_salida: Option<DateTime<Utc>>,
    pub terminado: bool,
    pub created_at: DateTime<Utc>,
}

/// Denormalized reservation view joining vehicle and space data, with the
/// derived `estado` field.
///
/// Joined columns are optional to match the LEFT joins; with the current
/// schema they always resolve (vehicle deletion cascades to its
/// reservations, and spaces are never deleted). Note `espacio_estado` is
/// the space's *current* state, which for terminated reservations may
/// already reflect a later occupant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReservationView {
    pub id: Uuid,
    pub vehiculo_id: Uuid,
    pub espacio_id: Uuid,
    pub user_id: Uuid,
    pub fecha_entrada: DateTime<Utc>,
    pub fecha_salida: Option<DateTime<Utc>>,
    pub terminado: bool,

    // Vehicle
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,

    // Space
    pub numero_espacio: Option<String>,
    pub piso: Option<i32>,
    pub tipo: Option<String>,
    pub espacio_estado: Option<String>,

    /// Derived status: "activa" or "terminada"
    pub estado: String,
}

/// Shared SELECT for the denormalized view; callers append the WHERE clause.
const VIEW_SELECT: &str = r#"
    SELECT r.id, r.vehiculo_id, r.espacio_id, r.user_id,
           r.fecha_entrada, r.fecha_salida, r.terminado,
           v.placa, v.marca, v.modelo, v.color,
           e.numero AS numero_espacio, e.piso, e.tipo, e.estado AS espacio_estado,
           CASE WHEN r.terminado = FALSE THEN 'activa' ELSE 'terminada' END AS estado
    FROM reservas r
    LEFT JOIN vehiculos v ON r.vehiculo_id = v.id
    LEFT JOIN espacios_parqueadero e ON r.espacio_id = e.id
"#;

impl Reservation {
    /// Lists all of the user's reservations as denormalized views, newest
    /// first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ReservationView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC");

        sqlx::query_as::<_, ReservationView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Lists the user's active reservations as denormalized views.
    pub async fn list_activas_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ReservationView>, sqlx::Error> {
        let query = format!(
            "{VIEW_SELECT} WHERE r.user_id = $1 AND r.terminado = FALSE ORDER BY r.created_at DESC"
        );

        sqlx::query_as::<_, ReservationView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Finds one denormalized view by reservation id, scoped by owner.
    pub async fn find_view_by_id(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReservationView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE r.id = $1 AND r.user_id = $2");

        sqlx::query_as::<_, ReservationView>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a vehicle's active reservation, if any. Used for the
    /// one-active-reservation-per-vehicle check; the partial unique index
    /// on `reservas (vehiculo_id) WHERE NOT terminado` is the hard
    /// guarantee.
    pub async fn find_activa_by_vehiculo<'e>(
        executor: impl PgExecutor<'e>,
        vehiculo_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, vehiculo_id, espacio_id, user_id,
                   fecha_entrada, fecha_salida, terminado, created_at
            FROM reservas
            WHERE vehiculo_id = $1 AND terminado = FALSE
            "#,
        )
        .bind(vehiculo_id)
        .fetch_optional(executor)
        .await
    }

    /// Inserts a reservation row with `terminado = false`. Does not flip
    /// the space state; the lifecycle transaction pairs the two writes.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        vehiculo_id: Uuid,
        espacio_id: Uuid,
        fecha_entrada: DateTime<Utc>,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservas (vehiculo_id, espacio_id, fecha_entrada, user_id, terminado)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, vehiculo_id, espacio_id, user_id,
                      fecha_entrada, fecha_salida, terminado, created_at
            "#,
        )
        .bind(vehiculo_id)
        .bind(espacio_id)
        .bind(fecha_entrada)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Marks a reservation terminated with `fecha_salida = now()`, scoped
    /// by owner. Does not flip the space state.
    pub async fn terminate<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservas
            SET terminado = TRUE, fecha_salida = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, vehiculo_id, espacio_id, user_id,
                      fecha_entrada, fecha_salida, terminado, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Hard-deletes a reservation, scoped by owner. Does not flip the space
    /// state.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            DELETE FROM reservas
            WHERE id = $1 AND user_id = $2
            RETURNING id, vehiculo_id, espacio_id, user_id,
                      fecha_entrada, fecha_salida, terminado, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_derived_estado() {
        let view = ReservationView {
            id: Uuid::new_v4(),
            vehiculo_id: Uuid::new_v4(),
            espacio_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fecha_entrada: Utc::now(),
            fecha_salida: None,
            terminado: false,
            placa: Some("ABC123".to_string()),
            marca: Some("Mazda".to_string()),
            modelo: Some("3".to_string()),
            color: Some("rojo".to_string()),
            numero_espacio: Some("E-001".to_string()),
            piso: Some(1),
            tipo: Some("automovil".to_string()),
            espacio_estado: Some("ocupado".to_string()),
            estado: "activa".to_string(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["estado"], "activa");
        assert_eq!(json["numero_espacio"], "E-001");
        assert_eq!(json["placa"], "ABC123");
    }
}
