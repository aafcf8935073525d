//! Post data-access layer.
//!
//! A [`PostCollection`] is the locally cached view of the `posts` collection
//! held by one consumer. It talks to the injected [`PostStore`], normalizes
//! documents into [`Post`]s, tracks the pagination cursor and patches its
//! local copy after each successful remote mutation. Nothing is shared
//! between collections: two consumers can drift apart until they refresh.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use super::cursor::{Cursor, ListScope};
use super::document::{document_for_new, document_for_patch, post_from_stored};
use crate::domain::{NewPost, Post, PostPatch};
use crate::error::DomainError;
use crate::ports::{PostQuery, PostStore};

/// Message surfaced when a listing cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load posts. Please try again.";

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub posts: Vec<Post>,
    /// Resumes after the last post; `None` for an empty page.
    pub next_cursor: Option<Cursor>,
    /// `true` when the page came back full. A final page that exactly fills
    /// the page size also reports `true`.
    pub has_more: bool,
}

/// Locally cached, paginated post collection backed by a [`PostStore`].
pub struct PostCollection {
    store: Arc<dyn PostStore>,
    scope: ListScope,
    page_size: usize,
    posts: Vec<Post>,
    cursor: Option<Cursor>,
    has_more: bool,
    error: Option<String>,
}

impl PostCollection {
    /// An empty collection. Call [`PostCollection::refresh`] to load page one.
    pub fn new(store: Arc<dyn PostStore>, scope: ListScope, page_size: usize) -> Self {
        Self {
            store,
            scope,
            page_size: page_size.max(1),
            posts: Vec::new(),
            cursor: None,
            has_more: false,
            error: None,
        }
    }

    /// Posts loaded so far, in listing order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Generic message of the last failed load, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch one page ordered by publish date descending, without touching
    /// local state.
    pub async fn list(&self, page_size: usize, cursor: Option<&Cursor>) -> Result<Page, DomainError> {
        let page_size = page_size.max(1);
        let start_after = cursor.map(|c| c.position(self.scope)).transpose()?;
        let query = PostQuery {
            published: self.scope.published_filter(),
            start_after,
            limit: Some(page_size),
            ..PostQuery::default()
        };

        let posts: Vec<Post> = self
            .store
            .query(&query)
            .await?
            .into_iter()
            .map(post_from_stored)
            .collect();

        let next_cursor = posts.last().map(|last| Cursor::after(self.scope, last));
        let has_more = posts.len() == page_size;

        Ok(Page {
            posts,
            next_cursor,
            has_more,
        })
    }

    /// Restart pagination from page one and replace the loaded posts.
    ///
    /// On failure the error flag is set and loaded posts stay as they were.
    pub async fn refresh(&mut self) {
        match self.list(self.page_size, None).await {
            Ok(page) => {
                tracing::debug!(count = page.posts.len(), has_more = page.has_more, "Loaded first page");
                self.posts = page.posts;
                self.cursor = page.next_cursor;
                self.has_more = page.has_more;
                self.error = None;
            }
            Err(e) => self.fail_load(e),
        }
    }

    /// Append the next page. Does nothing once the listing is exhausted.
    pub async fn load_more(&mut self) {
        if !self.has_more {
            return;
        }
        match self.list(self.page_size, self.cursor.as_ref()).await {
            Ok(page) => {
                tracing::debug!(count = page.posts.len(), has_more = page.has_more, "Loaded next page");
                if page.next_cursor.is_some() {
                    self.cursor = page.next_cursor;
                }
                self.has_more = page.has_more;
                // Posts created locally may reappear once the cursor reaches them.
                let fresh: Vec<Post> = page
                    .posts
                    .into_iter()
                    .filter(|post| self.find(&post.id).is_none())
                    .collect();
                self.posts.extend(fresh);
                self.error = None;
            }
            Err(e) => self.fail_load(e),
        }
    }

    fn fail_load(&mut self, error: DomainError) {
        tracing::error!(error = %error, scope = ?self.scope, "Failed to load posts");
        self.error = Some(LOAD_ERROR_MESSAGE.to_string());
    }

    /// Fetch a single post from the store, within this collection's scope.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Post>, DomainError> {
        Ok(self
            .store
            .get(id)
            .await?
            .filter(|stored| self.scope.admits(stored))
            .map(post_from_stored))
    }

    /// Fetch the first post carrying `slug`, within this collection's scope.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let query = PostQuery {
            published: self.scope.published_filter(),
            slug: Some(slug.to_string()),
            limit: Some(1),
            ..PostQuery::default()
        };
        Ok(self
            .store
            .query(&query)
            .await?
            .into_iter()
            .next()
            .map(post_from_stored))
    }

    /// Create a post remotely, then prepend it locally. Returns the new id.
    pub async fn create(&mut self, input: NewPost) -> Result<String, DomainError> {
        let document = document_for_new(input, Utc::now());
        let stored = self.store.insert(document).await?;
        let post = post_from_stored(stored);
        let id = post.id.clone();

        tracing::info!(post_id = %id, "Post created");
        self.posts.insert(0, post);
        Ok(id)
    }

    /// Merge `patch` remotely, then mirror the same merge locally.
    pub async fn update(&mut self, id: &str, patch: PostPatch) -> Result<(), DomainError> {
        let previous = self.find(id).and_then(|p| p.updated_at);
        let updated_at = next_update_time(previous, Utc::now());

        self.store
            .update(id, document_for_patch(&patch, updated_at))
            .await?;

        if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
            post.apply(&patch, updated_at);
        }
        tracing::info!(post_id = %id, "Post updated");
        Ok(())
    }

    /// Delete remotely, then drop the post locally.
    pub async fn delete(&mut self, id: &str) -> Result<(), DomainError> {
        self.store.delete(id).await?;
        self.posts.retain(|p| p.id != id);
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Local copy of a loaded post.
    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Snapshot of every loaded post.
    pub fn export(&self) -> Vec<Post> {
        self.posts.clone()
    }

    /// Replace the loaded posts wholesale. Nothing is written to the store.
    pub fn import(&mut self, posts: Vec<Post>) {
        tracing::info!(count = posts.len(), "Replacing local posts from import");
        self.posts = posts;
    }
}

/// Update stamp strictly later than `previous`, even when the clock has not
/// advanced past it.
pub fn next_update_time(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}
