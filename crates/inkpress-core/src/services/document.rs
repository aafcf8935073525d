//! Translation between store documents and post entities.

use chrono::{DateTime, Utc};
use slug::slugify;

use crate::domain::{Category, NewPost, Post, PostPatch, derive_excerpt, read_time};
use crate::ports::{PostDocument, StoreTimestamp, StoredPost};

fn to_datetime(id: &str, field: &str, value: Option<StoreTimestamp>) -> Option<DateTime<Utc>> {
    let value = value?;
    let converted = value.to_datetime();
    if converted.is_none() {
        tracing::warn!(post_id = %id, field, seconds = value.seconds, "Timestamp out of range, dropping");
    }
    converted
}

/// Normalize a stored document into a [`Post`], filling defaults for
/// anything the store never held.
pub fn post_from_stored(stored: StoredPost) -> Post {
    let StoredPost { id, document: doc } = stored;

    let created_at = to_datetime(&id, "createdAt", doc.created_at);
    let updated_at = to_datetime(&id, "updatedAt", doc.updated_at);
    let publish_date = to_datetime(&id, "publishDate", Some(doc.listing_date())).unwrap_or_default();

    let category = match doc.category.as_deref() {
        None => Category::default(),
        Some(name) => name.parse().unwrap_or_else(|_| {
            tracing::debug!(post_id = %id, category = %name, "Unknown category, using default");
            Category::default()
        }),
    };

    let content = doc.content.unwrap_or_default();
    let read_time = doc.read_time.unwrap_or_else(|| read_time(&content));

    Post {
        id,
        title: doc.title.unwrap_or_default(),
        content,
        excerpt: doc.excerpt.unwrap_or_default(),
        featured_image: doc.featured_image.unwrap_or_default(),
        publish_date,
        author: doc.author.unwrap_or_default(),
        tags: doc.tags.unwrap_or_default(),
        is_published: doc.is_published.unwrap_or(false),
        created_at,
        updated_at,
        featured: doc.featured.unwrap_or(false),
        seo_title: doc.seo_title,
        seo_description: doc.seo_description,
        slug: doc.slug,
        read_time,
        views: doc.views.unwrap_or(0),
        likes: doc.likes.unwrap_or(0),
        category,
    }
}

/// Document written when creating a post.
///
/// Derives `readTime`, and fills a missing excerpt or slug from content and
/// title. Counters start at zero.
pub fn document_for_new(input: NewPost, now: DateTime<Utc>) -> PostDocument {
    let read_time = read_time(&input.content);
    let excerpt = if input.excerpt.trim().is_empty() {
        derive_excerpt(&input.content)
    } else {
        input.excerpt
    };
    let slug = input
        .slug
        .filter(|s| !s.trim().is_empty())
        .or_else(|| Some(slugify(&input.title)).filter(|s| !s.is_empty()));
    let stamp = StoreTimestamp::from_datetime(now);

    PostDocument {
        title: Some(input.title),
        content: Some(input.content),
        excerpt: Some(excerpt),
        featured_image: Some(input.featured_image),
        publish_date: Some(StoreTimestamp::from_datetime(input.publish_date.unwrap_or(now))),
        author: Some(input.author),
        tags: Some(input.tags),
        is_published: Some(input.is_published),
        created_at: Some(stamp),
        updated_at: Some(stamp),
        featured: Some(input.featured),
        seo_title: input.seo_title,
        seo_description: input.seo_description,
        slug,
        read_time: Some(read_time),
        views: Some(0),
        likes: Some(0),
        category: Some(input.category.as_str().to_string()),
    }
}

/// Changes written for a partial update, stamped with `updated_at`.
pub fn document_for_patch(patch: &PostPatch, updated_at: DateTime<Utc>) -> PostDocument {
    PostDocument {
        title: patch.title.clone(),
        content: patch.content.clone(),
        excerpt: patch.excerpt.clone(),
        featured_image: patch.featured_image.clone(),
        publish_date: patch.publish_date.map(StoreTimestamp::from_datetime),
        author: patch.author.clone(),
        tags: patch.tags.clone(),
        is_published: patch.is_published,
        updated_at: Some(StoreTimestamp::from_datetime(updated_at)),
        featured: patch.featured,
        seo_title: patch.seo_title.clone(),
        seo_description: patch.seo_description.clone(),
        slug: patch.slug.clone(),
        read_time: patch.content.as_deref().map(read_time),
        category: patch.category.map(|c| c.as_str().to_string()),
        ..PostDocument::default()
    }
}
