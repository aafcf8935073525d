//! In-memory post store - used when no database is configured.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpress_core::StoreError;
use inkpress_core::ports::{Counter, PostDocument, PostQuery, PostStore, StoreTimestamp, StoredPost};

/// Post store backed by a `HashMap` behind an async `RwLock`.
pub struct InMemoryPostStore {
    docs: RwLock<HashMap<String, PostDocument>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn query(&self, query: &PostQuery) -> Result<Vec<StoredPost>, StoreError> {
        let docs = self.docs.read().await;

        let mut matched: Vec<StoredPost> = docs
            .iter()
            .map(|(id, document)| StoredPost {
                id: id.clone(),
                document: document.clone(),
            })
            .filter(|post| query.accepts(post))
            .collect();
        matched.sort_by(|a, b| PostQuery::sort_key(b).cmp(&PostQuery::sort_key(a)));

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        tracing::debug!(
            published = ?query.published,
            slug = ?query.slug,
            paged = query.start_after.is_some(),
            returned = matched.len(),
            "In-memory post query"
        );
        Ok(matched)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredPost>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.get(id).map(|document| StoredPost {
            id: id.to_string(),
            document: document.clone(),
        }))
    }

    async fn insert(&self, mut document: PostDocument) -> Result<StoredPost, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = StoreTimestamp::now();
        document.created_at.get_or_insert(now);
        document.updated_at.get_or_insert(now);
        document.views = Some(0);
        document.likes = Some(0);

        let mut docs = self.docs.write().await;
        docs.insert(id.clone(), document.clone());
        tracing::debug!(post_id = %id, "Document inserted");

        Ok(StoredPost { id, document })
    }

    async fn update(&self, id: &str, changes: PostDocument) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let document = docs.get_mut(id).ok_or(StoreError::NotFound)?;
        document.merge(changes);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let document = docs.get_mut(id).ok_or(StoreError::NotFound)?;
        let slot = match counter {
            Counter::Views => &mut document.views,
            Counter::Likes => &mut document.likes,
        };
        let current = i64::try_from(slot.unwrap_or(0)).unwrap_or(i64::MAX);
        *slot = Some(current.saturating_add(delta).max(0) as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use inkpress_core::ports::CursorPosition;

    fn doc(title: &str, hours_ago: i64, published: bool) -> PostDocument {
        PostDocument {
            title: Some(title.to_string()),
            publish_date: Some(StoreTimestamp::from_datetime(Utc::now() - Duration::hours(hours_ago))),
            is_published: Some(published),
            slug: Some(title.to_lowercase()),
            ..PostDocument::default()
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_timestamps_and_counters() {
        let store = InMemoryPostStore::new();
        let stored = store.insert(doc("Hello", 1, true)).await.unwrap();

        assert!(Uuid::parse_str(&stored.id).is_ok());
        assert!(stored.document.created_at.is_some());
        assert_eq!(stored.document.views, Some(0));
        assert_eq!(store.get(&stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn query_orders_filters_and_resumes() {
        let store = InMemoryPostStore::new();
        store.insert(doc("Old", 3, true)).await.unwrap();
        store.insert(doc("Draft", 2, false)).await.unwrap();
        let newest = store.insert(doc("New", 1, true)).await.unwrap();

        let all = store.query(&PostQuery::default()).await.unwrap();
        let titles: Vec<_> = all.iter().filter_map(|p| p.document.title.clone()).collect();
        assert_eq!(titles, vec!["New", "Draft", "Old"]);

        let published = store
            .query(&PostQuery {
                published: Some(true),
                start_after: Some(CursorPosition {
                    publish_date: newest.document.publish_date.unwrap(),
                    id: newest.id.clone(),
                }),
                ..PostQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].document.title.as_deref(), Some("Old"));

        let by_slug = store
            .query(&PostQuery {
                slug: Some("draft".into()),
                ..PostQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_slug.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_and_missing_ids_fail() {
        let store = InMemoryPostStore::new();
        let stored = store.insert(doc("Hello", 1, false)).await.unwrap();

        store
            .update(
                &stored.id,
                PostDocument {
                    is_published: Some(true),
                    ..PostDocument::default()
                },
            )
            .await
            .unwrap();

        let after = store.get(&stored.id).await.unwrap().unwrap().document;
        assert_eq!(after.is_published, Some(true));
        assert_eq!(after.title.as_deref(), Some("Hello"));

        assert!(matches!(
            store.update("missing", PostDocument::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete("missing").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn counters_never_go_negative() {
        let store = InMemoryPostStore::new();
        let stored = store.insert(doc("Hello", 1, true)).await.unwrap();

        store.increment(&stored.id, Counter::Likes, -1).await.unwrap();
        store.increment(&stored.id, Counter::Views, 1).await.unwrap();
        store.increment(&stored.id, Counter::Views, 1).await.unwrap();

        let after = store.get(&stored.id).await.unwrap().unwrap().document;
        assert_eq!(after.likes, Some(0));
        assert_eq!(after.views, Some(2));
    }

    #[tokio::test]
    async fn delete_is_hard() {
        let store = InMemoryPostStore::new();
        let stored = store.insert(doc("Bye", 1, true)).await.unwrap();

        store.delete(&stored.id).await.unwrap();

        assert!(store.get(&stored.id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
