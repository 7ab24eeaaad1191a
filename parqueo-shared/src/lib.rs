//! # Parqueo Shared Library
//!
//! Shared types and business logic used by the parqueo API server:
//!
//! - `models`: database models with embedded CRUD operations
//! - `auth`: password hashing, JWT tokens, and the auth middleware context
//! - `db`: connection pool and migration runner
//! - `lifecycle`: the reservation state machine (create / terminate / delete)

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;

/// Current version of the parqueo shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
