//! Ports - trait definitions for external dependencies.
//! Infrastructure crates provide the implementations.

mod auth;
mod post_store;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use post_store::{
    Counter, CursorPosition, PostDocument, PostQuery, PostStore, StoreTimestamp, StoredPost,
};
