//! Vehicle model and database operations.
//!
//! All operations are scoped by the owning user id; a caller can never read
//! or mutate another user's vehicles. Plates are normalized to uppercase
//! before every write or lookup, and are unique per owner (not globally).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// A vehicle row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    /// Unique vehicle ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Plate, stored uppercase, unique per owner
    pub placa: String,

    pub marca: String,
    pub modelo: String,
    pub color: String,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a vehicle. Only the plate is required.
#[derive(Debug, Clone)]
pub struct CreateVehicle {
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub color: String,
}

/// Input for updating a vehicle. Omitted fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateVehicle {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
}

/// Normalizes a plate for storage and comparison.
pub fn normalize_placa(placa: &str) -> String {
    placa.trim().to_uppercase()
}

impl Vehicle {
    /// Lists the user's vehicles, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, user_id, placa, marca, modelo, color, created_at
            FROM vehiculos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Finds a vehicle by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, user_id, placa, marca, modelo, color, created_at
            FROM vehiculos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a vehicle by plate for a user. Used for the pre-insert
    /// uniqueness check; the `(user_id, placa)` unique constraint is the
    /// real guarantee.
    pub async fn find_by_placa(
        pool: &PgPool,
        placa: &str,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, user_id, placa, marca, modelo, color, created_at
            FROM vehiculos
            WHERE placa = $1 AND user_id = $2
            "#,
        )
        .bind(normalize_placa(placa))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a vehicle for the user.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateVehicle,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehiculos (user_id, placa, marca, modelo, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, placa, marca, modelo, color, created_at
            "#,
        )
        .bind(user_id)
        .bind(normalize_placa(&data.placa))
        .bind(data.marca)
        .bind(data.modelo)
        .bind(data.color)
        .fetch_one(pool)
        .await
    }

    /// Updates a vehicle; omitted fields keep their current value
    /// (COALESCE per field).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateVehicle,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehiculos
            SET placa = COALESCE($1, placa),
                marca = COALESCE($2, marca),
                modelo = COALESCE($3, modelo),
                color = COALESCE($4, color)
            WHERE id = $5 AND user_id = $6
            RETURNING id, user_id, placa, marca, modelo, color, created_at
            "#,
        )
        .bind(data.placa.as_deref().map(normalize_placa))
        .bind(data.marca)
        .bind(data.modelo)
        .bind(data.color)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a vehicle, scoped to its owner. Returns the deleted row, or
    /// `None` if it did not exist. Does not check for active reservations;
    /// that rule lives in the lifecycle module, which runs this inside a
    /// transaction with the vehicle row locked.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            DELETE FROM vehiculos
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, placa, marca, modelo, color, created_at
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
    fn test_normalize_placa() {
        assert_eq!(normalize_placa("abc123"), "ABC123");
        assert_eq!(normalize_placa("  abc-12 "), "ABC-12");
        assert_eq!(normalize_placa("ABC123"), "ABC123");
    }

    #[test]
    fn test_update_vehicle_default_is_empty() {
        let update = UpdateVehicle::default();
        assert!(update.placa.is_none());
        assert!(update.marca.is_none());
        assert!(update.modelo.is_none());
        assert!(update.color.is_none());
    }
}
