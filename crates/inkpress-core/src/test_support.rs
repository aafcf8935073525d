//! Scripted in-crate store for service tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::StoreError;
use crate::ports::{Counter, PostDocument, PostQuery, PostStore, StoreTimestamp, StoredPost};

/// Vector-backed store with switches for simulating outages.
#[derive(Default)]
pub struct ScriptedStore {
    docs: Mutex<BTreeMap<String, PostDocument>>,
    next_id: AtomicUsize,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
    fail_increments: AtomicBool,
}

impl ScriptedStore {
    /// `count` published posts `post-00`, `post-01`, ... each an hour older
    /// than the previous one.
    pub fn with_posts(count: usize) -> Self {
        let store = Self::default();
        let now = Utc::now();
        {
            let mut docs = store.docs.lock().unwrap();
            for i in 0..count {
                let id = format!("post-{i:02}");
                let at = StoreTimestamp::from_datetime(now - Duration::hours(i as i64 + 1));
                docs.insert(
                    id.clone(),
                    PostDocument {
                        title: Some(format!("Post {i}")),
                        content: Some(format!("<p>Body of post {i}</p>")),
                        excerpt: Some(format!("Excerpt {i}")),
                        publish_date: Some(at),
                        author: Some("Ada".into()),
                        tags: Some(vec!["rust".into()]),
                        is_published: Some(true),
                        created_at: Some(at),
                        updated_at: Some(at),
                        slug: Some(id),
                        views: Some(i as u64),
                        likes: Some(0),
                        ..PostDocument::default()
                    },
                );
            }
        }
        store.next_id.store(count, Ordering::SeqCst);
        store
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    pub fn set_published(&self, id: &str, published: bool) {
        if let Some(doc) = self.docs.lock().unwrap().get_mut(id) {
            doc.is_published = Some(published);
        }
    }

    /// Drop `publishDate`, leaving `createdAt` as the only date.
    pub fn clear_publish_date(&self, id: &str) {
        if let Some(doc) = self.docs.lock().unwrap().get_mut(id) {
            doc.publish_date = None;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.lock().unwrap().contains_key(id)
    }

    pub fn document(&self, id: &str) -> Option<PostDocument> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Connection("scripted outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PostStore for ScriptedStore {
    async fn query(&self, query: &PostQuery) -> Result<Vec<StoredPost>, StoreError> {
        Self::check(&self.fail_queries)?;
        let docs = self.docs.lock().unwrap();
        let mut matched: Vec<StoredPost> = docs
            .iter()
            .map(|(id, doc)| StoredPost {
                id: id.clone(),
                document: doc.clone(),
            })
            .filter(|post| query.accepts(post))
            .collect();
        matched.sort_by(|a, b| PostQuery::sort_key(b).cmp(&PostQuery::sort_key(a)));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredPost>, StoreError> {
        Self::check(&self.fail_queries)?;
        Ok(self.document(id).map(|document| StoredPost {
            id: id.to_string(),
            document,
        }))
    }

    async fn insert(&self, mut document: PostDocument) -> Result<StoredPost, StoreError> {
        Self::check(&self.fail_writes)?;
        let id = format!("post-{:02}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = StoreTimestamp::now();
        document.created_at.get_or_insert(now);
        document.updated_at.get_or_insert(now);
        document.views = Some(0);
        document.likes = Some(0);
        self.docs.lock().unwrap().insert(id.clone(), document.clone());
        Ok(StoredPost { id, document })
    }

    async fn update(&self, id: &str, changes: PostDocument) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(id).ok_or(StoreError::NotFound)?;
        doc.merge(changes);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.docs
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<(), StoreError> {
        Self::check(&self.fail_increments)?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(id).ok_or(StoreError::NotFound)?;
        let slot = match counter {
            Counter::Views => &mut doc.views,
            Counter::Likes => &mut doc.likes,
        };
        let current = slot.unwrap_or(0) as i64;
        *slot = Some((current + delta).max(0) as u64);
        Ok(())
    }
}
