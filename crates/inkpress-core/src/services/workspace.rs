//! Admin workspace: the data-access layer plus the dashboard's own state.
//!
//! The workspace owns its [`PostCollection`], the current [`PostFilter`],
//! the selected post ids and a process-local [`ActivityLog`]. Dropping the
//! workspace discards all of it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::collection::PostCollection;
use super::cursor::ListScope;
use crate::domain::{
    ActivityEntry, ActivityKind, ActivityLog, Category, NewPost, Post, PostFilter, PostPatch,
};
use crate::error::DomainError;
use crate::ports::PostStore;

/// Number of posts reported in [`DashboardMetrics::top_posts`].
pub const TOP_POSTS: usize = 5;

/// Mutation applied to every selected post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Publish,
    Unpublish,
    Feature,
    Delete,
}

/// Serialized export ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub body: String,
}

/// `blog-posts-<YYYY-MM-DD>.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("blog-posts-{}.json", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
}

/// Aggregate numbers shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_posts: usize,
    pub published: usize,
    pub drafts: usize,
    pub scheduled: usize,
    pub featured: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub by_category: BTreeMap<Category, usize>,
    pub top_posts: Vec<PostSummary>,
}

impl DashboardMetrics {
    pub fn compute(posts: &[Post], now: DateTime<Utc>) -> Self {
        let mut metrics = Self {
            total_posts: posts.len(),
            ..Self::default()
        };
        for post in posts {
            if post.is_live(now) {
                metrics.published += 1;
            }
            if !post.is_published {
                metrics.drafts += 1;
            }
            if post.is_scheduled(now) {
                metrics.scheduled += 1;
            }
            if post.featured {
                metrics.featured += 1;
            }
            metrics.total_views += post.views;
            metrics.total_likes += post.likes;
            *metrics.by_category.entry(post.category).or_default() += 1;
        }

        let mut ranked: Vec<&Post> = posts.iter().collect();
        ranked.sort_by(|a, b| b.views.cmp(&a.views));
        metrics.top_posts = ranked
            .into_iter()
            .take(TOP_POSTS)
            .map(|p| PostSummary {
                id: p.id.clone(),
                title: p.title.clone(),
                views: p.views,
                likes: p.likes,
            })
            .collect();
        metrics
    }
}

/// Admin dashboard state over one [`PostCollection`].
pub struct AdminWorkspace {
    posts: PostCollection,
    filter: PostFilter,
    selection: BTreeSet<String>,
    activity: ActivityLog,
}

impl AdminWorkspace {
    /// Open a workspace and load the first page of every post.
    pub async fn mount(store: Arc<dyn PostStore>, page_size: usize) -> Self {
        let mut posts = PostCollection::new(store, ListScope::All, page_size);
        posts.refresh().await;
        Self {
            posts,
            filter: PostFilter::default(),
            selection: BTreeSet::new(),
            activity: ActivityLog::seeded(Utc::now()),
        }
    }

    pub fn collection(&self) -> &PostCollection {
        &self.posts
    }

    pub fn filter(&self) -> &PostFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: PostFilter) {
        self.filter = filter;
    }

    /// Loaded posts after the filter pipeline.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<&Post> {
        self.filter.apply(self.posts.posts(), now)
    }

    pub async fn refresh(&mut self) {
        self.posts.refresh().await;
        self.prune_selection();
    }

    pub async fn load_more(&mut self) {
        self.posts.load_more().await;
    }

    pub fn error(&self) -> Option<&str> {
        self.posts.error()
    }

    // --- selection ---

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Select a loaded post. Returns `false` for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if self.posts.find(id).is_none() {
            return false;
        }
        self.selection.insert(id.to_string());
        true
    }

    pub fn deselect(&mut self, id: &str) {
        self.selection.remove(id);
    }

    pub fn select_all_visible(&mut self, now: DateTime<Utc>) {
        let ids: Vec<String> = self.visible(now).into_iter().map(|p| p.id.clone()).collect();
        self.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn prune_selection(&mut self) {
        let posts = &self.posts;
        self.selection.retain(|id| posts.find(id).is_some());
    }

    // --- mutations ---

    pub async fn create(&mut self, input: NewPost) -> Result<String, DomainError> {
        let title = input.title.clone();
        let id = self.posts.create(input).await?;
        self.activity
            .record(ActivityKind::Created, format!("Created \"{title}\""), Some(&id));
        Ok(id)
    }

    pub async fn update(&mut self, id: &str, patch: PostPatch) -> Result<(), DomainError> {
        let kind = activity_kind_for(&patch);
        self.posts.update(id, patch).await?;
        let message = format!("{} \"{}\"", verb(kind), self.title_of(id));
        self.activity.record(kind, message, Some(id));
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), DomainError> {
        let title = self.title_of(id);
        self.posts.delete(id).await?;
        self.selection.remove(id);
        self.activity
            .record(ActivityKind::Deleted, format!("Deleted \"{title}\""), Some(id));
        Ok(())
    }

    /// Flip the published flag of a loaded post.
    pub async fn toggle_published(&mut self, id: &str) -> Result<bool, DomainError> {
        let current = self
            .posts
            .find(id)
            .ok_or_else(|| DomainError::post_not_found(id))?
            .is_published;
        self.update(id, PostPatch::published(!current)).await?;
        Ok(!current)
    }

    /// Flip the featured flag of a loaded post.
    pub async fn toggle_featured(&mut self, id: &str) -> Result<bool, DomainError> {
        let current = self
            .posts
            .find(id)
            .ok_or_else(|| DomainError::post_not_found(id))?
            .featured;
        self.update(id, PostPatch::featured(!current)).await?;
        Ok(!current)
    }

    /// Apply `action` to each selected post in order, one store call each.
    ///
    /// Stops at the first failure; posts handled before it keep their new
    /// state. Clears the selection once every post succeeded. Returns the
    /// number of posts mutated.
    pub async fn bulk(&mut self, action: BulkAction) -> Result<usize, DomainError> {
        let ids: Vec<String> = self.selection.iter().cloned().collect();
        let mut done = 0;
        for id in &ids {
            let outcome = match action {
                BulkAction::Publish => self.update(id, PostPatch::published(true)).await,
                BulkAction::Unpublish => self.update(id, PostPatch::published(false)).await,
                BulkAction::Feature => self.update(id, PostPatch::featured(true)).await,
                BulkAction::Delete => self.delete(id).await,
            };
            if let Err(e) = outcome {
                tracing::error!(
                    action = ?action,
                    post_id = %id,
                    completed = done,
                    remaining = ids.len() - done,
                    error = %e,
                    "Bulk action aborted"
                );
                return Err(e);
            }
            done += 1;
        }
        tracing::info!(action = ?action, count = done, "Bulk action finished");
        self.selection.clear();
        Ok(done)
    }

    // --- import / export ---

    /// Pretty-printed JSON of every loaded post.
    pub fn export_file(&mut self, now: DateTime<Utc>) -> Result<ExportFile, DomainError> {
        let posts = self.posts.export();
        let body =
            serde_json::to_string_pretty(&posts).map_err(|e| DomainError::Internal(e.to_string()))?;
        self.activity.record(
            ActivityKind::Exported,
            format!("Exported {} posts", posts.len()),
            None,
        );
        Ok(ExportFile {
            file_name: export_file_name(now.date_naive()),
            body,
        })
    }

    /// Replace the loaded posts with the contents of an exported file.
    ///
    /// Only the JSON shape is checked. Nothing is written to the store.
    pub fn import_json(&mut self, body: &str) -> Result<usize, DomainError> {
        let posts: Vec<Post> =
            serde_json::from_str(body).map_err(|e| DomainError::Import(e.to_string()))?;
        let count = posts.len();
        self.posts.import(posts);
        self.prune_selection();
        self.activity
            .record(ActivityKind::Imported, format!("Imported {count} posts"), None);
        Ok(count)
    }

    // --- dashboard ---

    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.activity.entries().cloned().collect()
    }

    pub fn metrics(&self, now: DateTime<Utc>) -> DashboardMetrics {
        DashboardMetrics::compute(self.posts.posts(), now)
    }

    fn title_of(&self, id: &str) -> String {
        self.posts
            .find(id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

fn activity_kind_for(patch: &PostPatch) -> ActivityKind {
    let only_published = PostPatch {
        is_published: patch.is_published,
        ..PostPatch::default()
    };
    let only_featured = PostPatch {
        featured: patch.featured,
        ..PostPatch::default()
    };
    match (patch.is_published, patch.featured) {
        (Some(true), None) if *patch == only_published => ActivityKind::Published,
        (Some(false), None) if *patch == only_published => ActivityKind::Unpublished,
        (None, Some(true)) if *patch == only_featured => ActivityKind::Featured,
        (None, Some(false)) if *patch == only_featured => ActivityKind::Unfeatured,
        _ => ActivityKind::Updated,
    }
}

fn verb(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Published => "Published",
        ActivityKind::Unpublished => "Unpublished",
        ActivityKind::Featured => "Featured",
        ActivityKind::Unfeatured => "Unfeatured",
        _ => "Updated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedStore;
    use chrono::Duration;

    async fn workspace(count: usize) -> (Arc<ScriptedStore>, AdminWorkspace) {
        let store = Arc::new(ScriptedStore::with_posts(count));
        let ws = AdminWorkspace::mount(store.clone(), 20).await;
        (store, ws)
    }

    #[tokio::test]
    async fn mount_loads_posts_and_seeds_activity() {
        let (_, ws) = workspace(3).await;
        assert_eq!(ws.collection().posts().len(), 3);
        assert_eq!(ws.activity().len(), 1);
        assert_eq!(ws.activity()[0].kind, ActivityKind::System);
    }

    #[tokio::test]
    async fn bulk_publish_updates_every_selected_post() {
        let (store, mut ws) = workspace(3).await;
        store.set_published("post-00", false);
        store.set_published("post-02", false);
        ws.refresh().await;

        assert!(ws.select("post-00"));
        assert!(ws.select("post-02"));
        assert!(!ws.select("ghost"));

        assert_eq!(ws.bulk(BulkAction::Publish).await.unwrap(), 2);
        assert!(ws.selection().is_empty());
        assert_eq!(store.document("post-00").unwrap().is_published, Some(true));
        assert_eq!(store.document("post-02").unwrap().is_published, Some(true));
        assert_eq!(ws.activity()[0].kind, ActivityKind::Published);
    }

    #[tokio::test]
    async fn bulk_delete_stops_at_first_failure_without_rollback() {
        let (store, mut ws) = workspace(3).await;
        ws.select("post-00");
        ws.select("post-01");
        ws.select("post-02");

        // post-01 disappears behind the workspace's back.
        store.delete("post-01").await.unwrap();

        let err = ws.bulk(BulkAction::Delete).await.unwrap_err();
        assert!(matches!(err, DomainError::Store(crate::StoreError::NotFound)));

        assert!(!store.contains("post-00"));
        assert!(store.contains("post-02"));
        assert!(ws.collection().find("post-00").is_none());
        assert!(ws.collection().find("post-02").is_some());
        assert!(ws.selection().contains("post-02"));
    }

    #[tokio::test]
    async fn toggles_flip_flags() {
        let (store, mut ws) = workspace(1).await;

        assert!(ws.toggle_featured("post-00").await.unwrap());
        assert!(!ws.toggle_published("post-00").await.unwrap());
        assert_eq!(store.document("post-00").unwrap().featured, Some(true));
        assert_eq!(store.document("post-00").unwrap().is_published, Some(false));
        assert!(matches!(
            ws.toggle_featured("missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn export_names_file_by_date_and_import_restores() {
        let (_, mut ws) = workspace(4).await;
        let now = Utc::now();
        let before = ws.collection().export();

        let file = ws.export_file(now).unwrap();
        assert_eq!(file.file_name, format!("blog-posts-{}.json", now.format("%Y-%m-%d")));
        assert!(file.body.contains("\n  {"));

        ws.import_json("[]").unwrap();
        assert!(ws.collection().posts().is_empty());

        assert_eq!(ws.import_json(&file.body).unwrap(), 4);
        assert_eq!(ws.collection().export(), before);
        assert_eq!(ws.activity()[0].kind, ActivityKind::Imported);
    }

    #[tokio::test]
    async fn malformed_import_is_rejected_and_state_kept() {
        let (_, mut ws) = workspace(2).await;

        assert!(matches!(ws.import_json("{not json"), Err(DomainError::Import(_))));
        assert_eq!(ws.collection().posts().len(), 2);
    }

    #[tokio::test]
    async fn metrics_split_statuses() {
        let (_, mut ws) = workspace(3).await;
        let now = Utc::now();
        ws.update("post-00", PostPatch::published(false)).await.unwrap();
        ws.update(
            "post-01",
            PostPatch {
                publish_date: Some(now + Duration::hours(1)),
                featured: Some(true),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

        let metrics = ws.metrics(now);
        assert_eq!(metrics.total_posts, 3);
        assert_eq!(metrics.drafts, 1);
        assert_eq!(metrics.scheduled, 1);
        assert_eq!(metrics.published, 1);
        assert_eq!(metrics.featured, 1);
        assert_eq!(metrics.total_views, 3);
        assert_eq!(metrics.top_posts[0].id, "post-02");
        assert_eq!(metrics.by_category.get(&Category::General), Some(&3));
    }

    #[tokio::test]
    async fn visible_applies_current_filter() {
        let (_, mut ws) = workspace(5).await;
        ws.set_filter(PostFilter {
            search: "post 3".into(),
            ..PostFilter::default()
        });

        let visible: Vec<_> = ws.visible(Utc::now()).into_iter().map(|p| p.id.clone()).collect();
        assert_eq!(visible, vec!["post-03"]);

        ws.select_all_visible(Utc::now());
        assert_eq!(ws.selection().len(), 1);
        assert_eq!(ws.filter().search, "post 3");

        ws.deselect("post-03");
        assert!(ws.selection().is_empty());
        assert!(!ws.select("post-99"));
    }
}
