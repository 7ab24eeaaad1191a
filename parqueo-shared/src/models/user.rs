//! User model and database operations.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE usuarios (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email TEXT NOT NULL UNIQUE,
//!     nombre TEXT NOT NULL DEFAULT '',
//!     telefono TEXT NOT NULL DEFAULT '',
//!     password_hash TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user account row.
///
/// Includes the password hash; strip it with [`User::into_public`] before
/// returning a user over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub nombre: String,

    /// Phone number
    pub telefono: String,

    /// Argon2id password hash, never exposed over the wire
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Wire-safe projection of a user, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub telefono: String,
}

/// Input for creating a new user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub nombre: String,
    pub telefono: String,
    pub password_hash: String,
}

impl User {
    /// Strips the credential for wire exposure.
    pub fn into_public(self) -> UserPublic {
        UserPublic {
            id: self.id,
            email: self.email,
            nombre: self.nombre,
            telefono: self.telefono,
        }
    }

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate email (unique constraint) or if the
    /// store is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (email, nombre, telefono, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, nombre, telefono, password_hash, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.nombre)
        .bind(data.telefono)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await
    }

    /// Finds a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, nombre, telefono, password_hash, created_at
            FROM usuarios
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, nombre, telefono, password_hash, created_at
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_public_strips_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            nombre: "Test".to_string(),
            telefono: "123".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let public = user.clone().into_public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
