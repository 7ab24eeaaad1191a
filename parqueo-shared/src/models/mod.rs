//! Database models for parqueo.
//!
//! Each model owns its CRUD operations as parameterized sqlx statements.
//! Errors from the store are surfaced unmodified (`sqlx::Error`); the API
//! layer maps constraint violations to domain errors.
//!
//! # Models
//!
//! - `user`: user accounts (`usuarios`)
//! - `vehicle`: vehicles owned by a user (`vehiculos`)
//! - `space`: parking spaces (`espacios_parqueadero`)
//! - `reservation`: reservations plus the denormalized read view (`reservas`)

pub mod reservation;
pub mod space;
pub mod user;
pub mod vehicle;
