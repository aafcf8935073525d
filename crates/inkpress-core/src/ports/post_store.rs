//! Remote post store port.
//!
//! The store speaks in [`PostDocument`]s: schema-flexible records whose
//! fields may be missing and whose timestamps are [`StoreTimestamp`]s.
//! Conversion into [`crate::domain::Post`] happens in the data-access layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Store-native temporal value (seconds + nanoseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    pub const EPOCH: StoreTimestamp = StoreTimestamp {
        seconds: 0,
        nanos: 0,
    };

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos(),
        }
    }

    /// `None` when the value is outside the representable calendar range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

impl From<DateTime<Utc>> for StoreTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}

/// A post as it is stored. Absent fields were never written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub publish_date: Option<StoreTimestamp>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub created_at: Option<StoreTimestamp>,
    pub updated_at: Option<StoreTimestamp>,
    pub featured: Option<bool>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub slug: Option<String>,
    pub read_time: Option<u32>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub category: Option<String>,
}

impl PostDocument {
    /// Date the document is listed under: its publish date, else its
    /// creation time, else the Unix epoch.
    pub fn listing_date(&self) -> StoreTimestamp {
        self.publish_date
            .or(self.created_at)
            .unwrap_or(StoreTimestamp::EPOCH)
    }

    /// Overwrite every field present in `changes`.
    pub fn merge(&mut self, changes: PostDocument) {
        overwrite(&mut self.title, changes.title);
        overwrite(&mut self.content, changes.content);
        overwrite(&mut self.excerpt, changes.excerpt);
        overwrite(&mut self.featured_image, changes.featured_image);
        overwrite(&mut self.publish_date, changes.publish_date);
        overwrite(&mut self.author, changes.author);
        overwrite(&mut self.tags, changes.tags);
        overwrite(&mut self.is_published, changes.is_published);
        overwrite(&mut self.created_at, changes.created_at);
        overwrite(&mut self.updated_at, changes.updated_at);
        overwrite(&mut self.featured, changes.featured);
        overwrite(&mut self.seo_title, changes.seo_title);
        overwrite(&mut self.seo_description, changes.seo_description);
        overwrite(&mut self.slug, changes.slug);
        overwrite(&mut self.read_time, changes.read_time);
        overwrite(&mut self.views, changes.views);
        overwrite(&mut self.likes, changes.likes);
        overwrite(&mut self.category, changes.category);
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// A document together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: String,
    pub document: PostDocument,
}

/// Position in the `(publish_date desc, id desc)` ordering to resume after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    pub publish_date: StoreTimestamp,
    pub id: String,
}

/// The query shapes the application issues against the store.
///
/// Results are always ordered by publish date descending, ties broken by id
/// descending. Documents without a publish date are listed by creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Equality filter on `isPublished`.
    pub published: Option<bool>,
    /// Equality filter on `slug`.
    pub slug: Option<String>,
    /// Resume strictly after this position.
    pub start_after: Option<CursorPosition>,
    pub limit: Option<usize>,
}

impl PostQuery {
    /// Sort key of a stored document in this ordering.
    pub fn sort_key(post: &StoredPost) -> (StoreTimestamp, &str) {
        (
            post.document.listing_date(),
            post.id.as_str(),
        )
    }

    /// Whether `post` passes the equality filters and lies after the cursor.
    pub fn accepts(&self, post: &StoredPost) -> bool {
        if let Some(published) = self.published {
            if post.document.is_published.unwrap_or(false) != published {
                return false;
            }
        }
        if let Some(slug) = &self.slug {
            if post.document.slug.as_deref() != Some(slug.as_str()) {
                return false;
            }
        }
        if let Some(after) = &self.start_after {
            let key = Self::sort_key(post);
            if key >= (after.publish_date, after.id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Counters adjusted only through increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Likes,
}

/// Post store trait - abstraction over the managed document database.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Run an ordered, filtered, optionally paginated query.
    async fn query(&self, query: &PostQuery) -> Result<Vec<StoredPost>, StoreError>;

    /// Fetch a single document by id.
    async fn get(&self, id: &str) -> Result<Option<StoredPost>, StoreError>;

    /// Insert a document. The store assigns the id, fills missing
    /// `createdAt`/`updatedAt` and starts counters at zero.
    async fn insert(&self, document: PostDocument) -> Result<StoredPost, StoreError>;

    /// Merge the present fields of `changes` into an existing document.
    async fn update(&self, id: &str, changes: PostDocument) -> Result<(), StoreError>;

    /// Hard delete.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Add `delta` to a counter. A counter never drops below zero.
    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<(), StoreError>;
}
