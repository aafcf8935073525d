//! Single-post reader view.
//!
//! `Loading -> Found | NotFound | Error`. Entering `Found` bumps the view
//! counter in the background. Likes and bookmarks are optimistic: the local
//! state flips first and stays flipped whatever the store says.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::cursor::ListScope;
use super::document::post_from_stored;
use crate::domain::Post;
use crate::error::StoreError;
use crate::ports::{Counter, PostStore};

/// Message surfaced when the post cannot be fetched.
pub const READ_ERROR_MESSAGE: &str = "Failed to load post. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderState {
    Loading,
    Found(Post),
    NotFound,
    Error(String),
}

/// Reader-side view of one post.
pub struct ReaderView {
    store: Arc<dyn PostStore>,
    scope: ListScope,
    state: ReaderState,
    liked: bool,
    bookmarked: bool,
    view_task: Option<JoinHandle<()>>,
}

impl ReaderView {
    /// A reader that only shows posts inside `scope`.
    pub fn new(store: Arc<dyn PostStore>, scope: ListScope) -> Self {
        Self {
            store,
            scope,
            state: ReaderState::Loading,
            liked: false,
            bookmarked: false,
            view_task: None,
        }
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn post(&self) -> Option<&Post> {
        match &self.state {
            ReaderState::Found(post) => Some(post),
            _ => None,
        }
    }

    pub fn is_liked(&self) -> bool {
        self.liked
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Fetch `id` and settle the state machine.
    pub async fn open(&mut self, id: &str) -> &ReaderState {
        self.state = ReaderState::Loading;
        self.state = match self.store.get(id).await {
            Ok(Some(stored)) if self.scope.admits(&stored) => {
                let mut post = post_from_stored(stored);
                post.views += 1;
                self.view_task = Some(spawn_view_increment(self.store.clone(), post.id.clone()));
                ReaderState::Found(post)
            }
            Ok(_) => ReaderState::NotFound,
            Err(e) => {
                tracing::error!(post_id = %id, error = %e, "Failed to load post");
                ReaderState::Error(READ_ERROR_MESSAGE.to_string())
            }
        };
        &self.state
    }

    /// Wait for the background view increment, if one is running.
    pub async fn settle(&mut self) {
        if let Some(task) = self.view_task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "View counter task did not finish");
            }
        }
    }

    /// Flip the like state and push the matching counter change.
    ///
    /// The local state is kept even when the store call fails. Returns the
    /// new like state, or `None` when no post is shown.
    pub async fn toggle_like(&mut self) -> Option<bool> {
        let ReaderState::Found(post) = &mut self.state else {
            return None;
        };

        self.liked = !self.liked;
        if self.liked {
            post.likes += 1;
        } else {
            post.likes = post.likes.saturating_sub(1);
        }

        // A vanished post keeps its local like state too.
        if let Err(e) = push_like(self.store.as_ref(), &post.id, self.liked).await {
            tracing::debug!(post_id = %post.id, error = %e, "Liked post is gone from the store");
        }
        Some(self.liked)
    }

    /// Flip the bookmark flag. Bookmarks never leave the client.
    pub fn toggle_bookmark(&mut self) -> bool {
        self.bookmarked = !self.bookmarked;
        self.bookmarked
    }

}

/// Add or remove one like on `id`, best effort.
///
/// Store outages are logged and the requested state stands. Only a post
/// the store does not know is reported back.
pub async fn push_like(store: &dyn PostStore, id: &str, liked: bool) -> Result<bool, StoreError> {
    let delta = if liked { 1 } else { -1 };
    match store.increment(id, Counter::Likes, delta).await {
        Ok(()) => Ok(liked),
        Err(e @ (StoreError::NotFound | StoreError::InvalidId(_))) => Err(e),
        Err(e) => {
            tracing::warn!(post_id = %id, error = %e, "Failed to update like counter");
            Ok(liked)
        }
    }
}

/// Increment the view counter without waiting for the result. Failures are
/// logged only.
pub fn spawn_view_increment(store: Arc<dyn PostStore>, id: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store.increment(&id, Counter::Views, 1).await {
            tracing::warn!(post_id = %id, error = %e, "Failed to increment view counter");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedStore;

    #[tokio::test]
    async fn found_post_counts_a_view() {
        let store = Arc::new(ScriptedStore::with_posts(2));
        let mut reader = ReaderView::new(store.clone(), ListScope::All);

        let state = reader.open("post-01").await;
        assert!(matches!(state, ReaderState::Found(post) if post.views == 2));

        reader.settle().await;
        assert_eq!(store.document("post-01").unwrap().views, Some(2));
    }

    #[tokio::test]
    async fn missing_post_is_not_found_not_error() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        let mut reader = ReaderView::new(store, ListScope::All);

        assert_eq!(reader.open("nope").await, &ReaderState::NotFound);
        assert_eq!(reader.toggle_like().await, None);
    }

    #[tokio::test]
    async fn store_outage_is_an_error_state() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        store.fail_queries(true);
        let mut reader = ReaderView::new(store, ListScope::All);

        assert_eq!(
            reader.open("post-00").await,
            &ReaderState::Error(READ_ERROR_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn failed_view_increment_is_swallowed() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        store.fail_increments(true);
        let mut reader = ReaderView::new(store.clone(), ListScope::All);

        reader.open("post-00").await;
        reader.settle().await;

        assert!(reader.post().is_some());
        assert_eq!(store.document("post-00").unwrap().views, Some(0));
    }

    #[tokio::test]
    async fn like_round_trip_updates_store() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        let mut reader = ReaderView::new(store.clone(), ListScope::All);
        reader.open("post-00").await;

        assert_eq!(reader.toggle_like().await, Some(true));
        assert_eq!(reader.post().unwrap().likes, 1);
        assert_eq!(store.document("post-00").unwrap().likes, Some(1));

        assert_eq!(reader.toggle_like().await, Some(false));
        assert_eq!(reader.post().unwrap().likes, 0);
        assert_eq!(store.document("post-00").unwrap().likes, Some(0));
    }

    #[tokio::test]
    async fn like_stays_optimistic_when_store_fails() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        let mut reader = ReaderView::new(store.clone(), ListScope::All);
        reader.open("post-00").await;
        store.fail_increments(true);

        assert_eq!(reader.toggle_like().await, Some(true));
        assert!(reader.is_liked());
        assert_eq!(reader.post().unwrap().likes, 1);
        assert_eq!(store.document("post-00").unwrap().likes, Some(0));
    }

    #[tokio::test]
    async fn published_reader_does_not_show_drafts() {
        let store = Arc::new(ScriptedStore::with_posts(2));
        store.set_published("post-01", false);
        let mut reader = ReaderView::new(store.clone(), ListScope::Published);

        assert_eq!(reader.open("post-01").await, &ReaderState::NotFound);
        reader.settle().await;
        assert_eq!(store.document("post-01").unwrap().views, Some(1));

        assert!(matches!(reader.open("post-00").await, ReaderState::Found(_)));
    }

    #[tokio::test]
    async fn like_push_survives_outage_but_not_missing_post() {
        let store = Arc::new(ScriptedStore::with_posts(1));

        store.fail_increments(true);
        assert!(push_like(store.as_ref(), "post-00", true).await.unwrap());

        store.fail_increments(false);
        assert!(matches!(
            push_like(store.as_ref(), "nope", true).await,
            Err(StoreError::NotFound)
        ));
        assert!(push_like(store.as_ref(), "post-00", true).await.unwrap());
        assert_eq!(store.document("post-00").unwrap().likes, Some(1));
    }

    #[tokio::test]
    async fn bookmark_is_local() {
        let store = Arc::new(ScriptedStore::with_posts(1));
        let mut reader = ReaderView::new(store, ListScope::All);
        reader.open("post-00").await;

        assert!(reader.toggle_bookmark());
        assert!(!reader.toggle_bookmark());
        assert!(!reader.is_bookmarked());
    }
}
