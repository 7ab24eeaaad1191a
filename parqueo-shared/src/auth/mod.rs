//! Authentication primitives for parqueo.
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: stateless bearer tokens carrying user id and email
//! - [`middleware`]: the `AuthContext` injected into authenticated requests

pub mod jwt;
pub mod middleware;
pub mod password;
