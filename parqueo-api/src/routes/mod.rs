//! API route handlers, organized by resource:
//!
//! - `health`: health check endpoint
//! - `auth`: registration, login, current user
//! - `espacios`: parking spaces
//! - `vehiculos`: the caller's vehicles
//! - `reservas`: the caller's reservations

pub mod auth;
pub mod espacios;
pub mod health;
pub mod reservas;
pub mod vehiculos;
