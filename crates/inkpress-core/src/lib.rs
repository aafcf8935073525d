//! # Inkpress Core
//!
//! The domain layer of Inkpress.
//! Post entities, the store port, and the services that sit between
//! readers/admins and the remote post store. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, StoreError};

#[cfg(test)]
pub(crate) mod test_support;
