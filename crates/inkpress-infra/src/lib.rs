//! # Inkpress Infrastructure
//!
//! Concrete implementations of the ports defined in `inkpress-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory post store only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::DatabaseConfig;
pub use store::InMemoryPostStore;

#[cfg(feature = "postgres")]
pub use database::{PostgresPostStore, connect};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
