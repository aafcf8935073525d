//! Opaque pagination cursors.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::domain::Post;
use crate::error::DomainError;
use crate::ports::{CursorPosition, StoreTimestamp, StoredPost};

/// Which slice of the collection a listing covers.
///
/// A cursor only resumes the listing scope it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    /// Reader-facing: `isPublished == true` only.
    Published,
    /// Admin-facing: every post.
    All,
}

impl ListScope {
    pub(crate) fn published_filter(self) -> Option<bool> {
        match self {
            ListScope::Published => Some(true),
            ListScope::All => None,
        }
    }

    /// Whether a document fetched by id belongs to this scope.
    pub(crate) fn admits(self, stored: &StoredPost) -> bool {
        match self.published_filter() {
            Some(published) => stored.document.is_published.unwrap_or(false) == published,
            None => true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    scope: ListScope,
    publish_date: StoreTimestamp,
    id: String,
}

/// Token pointing just past the last post of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Cursor that resumes after `post` within `scope`.
    pub fn after(scope: ListScope, post: &Post) -> Self {
        let payload = CursorPayload {
            scope,
            publish_date: StoreTimestamp::from_datetime(post.publish_date),
            id: post.id.clone(),
        };
        // Serializing a plain struct of strings and integers cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        Self(URL_SAFE_NO_PAD.encode(json))
    }

    /// Wrap a token received from a client.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the store position, rejecting tokens issued for another scope.
    pub fn position(&self, scope: ListScope) -> Result<CursorPosition, DomainError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|e| DomainError::InvalidCursor(e.to_string()))?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|e| DomainError::InvalidCursor(e.to_string()))?;

        if payload.scope != scope {
            return Err(DomainError::InvalidCursor(format!(
                "cursor was issued for {:?} listings",
                payload.scope
            )));
        }

        Ok(CursorPosition {
            publish_date: payload.publish_date,
            id: payload.id,
        })
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_post() -> Post {
        let mut post: Post = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        post.publish_date = Utc::now();
        post
    }

    #[test]
    fn cursor_resolves_to_last_post_position() {
        let post = sample_post();
        let cursor = Cursor::after(ListScope::All, &post);

        let position = cursor.position(ListScope::All).unwrap();
        assert_eq!(position.id, "abc");
        assert_eq!(position.publish_date.to_datetime(), Some(post.publish_date));
    }

    #[test]
    fn cursor_from_another_scope_is_rejected() {
        let cursor = Cursor::after(ListScope::Published, &sample_post());
        assert!(matches!(
            cursor.position(ListScope::All),
            Err(DomainError::InvalidCursor(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let cursor = Cursor::from_token("not a cursor!");
        assert!(matches!(
            cursor.position(ListScope::All),
            Err(DomainError::InvalidCursor(_))
        ));
    }
}
