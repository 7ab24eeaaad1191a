//! Parking space model and database operations.
//!
//! Spaces are seeded in bulk at provisioning time and never deleted; their
//! `estado` flips between `disponible` and `ocupado` only as a side effect
//! of the reservation lifecycle (or an explicit admin update).
//!
//! The category (`tipo`) is persisted per row: the lot has car spaces
//! (`automovil`) and motorcycle spaces (`moto`).

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Space state values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoEspacio {
    Disponible,
    Ocupado,
}

impl EstadoEspacio {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoEspacio::Disponible => "disponible",
            EstadoEspacio::Ocupado => "ocupado",
        }
    }
}

/// A parking space row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParkingSpace {
    /// Unique space ID
    pub id: Uuid,

    /// Human-readable number (e.g. "E-001"), unique across the lot
    pub numero: String,

    /// Floor the space is on
    pub piso: i32,

    /// Category: "automovil" or "moto"
    pub tipo: String,

    /// Current state: "disponible" or "ocupado"
    pub estado: String,
}

impl ParkingSpace {
    /// Whether the space is currently available.
    pub fn disponible(&self) -> bool {
        self.estado == EstadoEspacio::Disponible.as_str()
    }

    /// Lists all spaces, ordered by floor then number.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ParkingSpace>(
            r#"
            SELECT id, numero, piso, tipo, estado
            FROM espacios_parqueadero
            ORDER BY piso, numero
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists available spaces, ordered by floor then number.
    pub async fn list_disponibles(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ParkingSpace>(
            r#"
            SELECT id, numero, piso, tipo, estado
            FROM espacios_parqueadero
            WHERE estado = 'disponible'
            ORDER BY piso, numero
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Finds a space by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ParkingSpace>(
            r#"
            SELECT id, numero, piso, tipo, estado
            FROM espacios_parqueadero
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Sets a space's state. The value is not validated here; the schema's
    /// CHECK constraint rejects anything outside {disponible, ocupado}.
    pub async fn update_estado(
        pool: &PgPool,
        id: Uuid,
        estado: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ParkingSpace>(
            r#"
            UPDATE espacios_parqueadero
            SET estado = $1
            WHERE id = $2
            RETURNING id, numero, piso, tipo, estado
            "#,
        )
        .bind(estado)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a space. Used by the provisioning seed, not exposed over the
    /// API (space create/delete are unimplemented endpoints).
    pub async fn create(
        pool: &PgPool,
        numero: &str,
        piso: i32,
        tipo: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ParkingSpace>(
            r#"
            INSERT INTO espacios_parqueadero (numero, piso, tipo, estado)
            VALUES ($1, $2, $3, 'disponible')
            RETURNING id, numero, piso, tipo, estado
            "#,
        )
        .bind(numero)
        .bind(piso)
        .bind(tipo)
        .fetch_one(pool)
        .await
    }

    /// Counts spaces in the lot.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM espacios_parqueadero")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
