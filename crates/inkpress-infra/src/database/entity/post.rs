//! Post entity for SeaORM.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Unchanged, Set};

use inkpress_core::ports::{PostDocument, StoreTimestamp, StoredPost};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub featured_image: String,
    pub publish_date: DateTimeWithTimeZone,
    pub author: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub featured: bool,
    pub seo_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub seo_description: Option<String>,
    pub slug: Option<String>,
    pub read_time: i32,
    pub views: i64,
    pub likes: i64,
    pub category: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn to_store(at: DateTimeWithTimeZone) -> StoreTimestamp {
    StoreTimestamp::from_datetime(at.with_timezone(&Utc))
}

fn from_store(at: StoreTimestamp) -> Option<DateTimeWithTimeZone> {
    at.to_datetime().map(Into::into)
}

fn tags_from_json(id: Uuid, tags: Json) -> Vec<String> {
    serde_json::from_value(tags).unwrap_or_else(|e| {
        tracing::warn!(post_id = %id, error = %e, "Stored tags are not a string array");
        Vec::new()
    })
}

/// Conversion from a SeaORM row to a store document.
impl From<Model> for StoredPost {
    fn from(model: Model) -> Self {
        let tags = tags_from_json(model.id, model.tags);
        Self {
            id: model.id.to_string(),
            document: PostDocument {
                title: Some(model.title),
                content: Some(model.content),
                excerpt: Some(model.excerpt),
                featured_image: Some(model.featured_image),
                publish_date: Some(to_store(model.publish_date)),
                author: Some(model.author),
                tags: Some(tags),
                is_published: Some(model.is_published),
                created_at: Some(to_store(model.created_at)),
                updated_at: Some(to_store(model.updated_at)),
                featured: Some(model.featured),
                seo_title: model.seo_title,
                seo_description: model.seo_description,
                slug: model.slug,
                read_time: Some(model.read_time.max(0) as u32),
                views: Some(model.views.max(0) as u64),
                likes: Some(model.likes.max(0) as u64),
                category: Some(model.category),
            },
        }
    }
}

/// Full row for a new document. Missing fields take column defaults and
/// counters start at zero.
pub fn new_row(id: Uuid, document: PostDocument) -> ActiveModel {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let created_at = document.created_at.and_then(from_store).unwrap_or(now);
    ActiveModel {
        id: Set(id),
        title: Set(document.title.unwrap_or_default()),
        content: Set(document.content.unwrap_or_default()),
        excerpt: Set(document.excerpt.unwrap_or_default()),
        featured_image: Set(document.featured_image.unwrap_or_default()),
        publish_date: Set(document.publish_date.and_then(from_store).unwrap_or(created_at)),
        author: Set(document.author.unwrap_or_default()),
        tags: Set(Json::from(document.tags.unwrap_or_default())),
        is_published: Set(document.is_published.unwrap_or(false)),
        created_at: Set(created_at),
        updated_at: Set(document.updated_at.and_then(from_store).unwrap_or(created_at)),
        featured: Set(document.featured.unwrap_or(false)),
        seo_title: Set(document.seo_title),
        seo_description: Set(document.seo_description),
        slug: Set(document.slug),
        read_time: Set(document.read_time.unwrap_or(0) as i32),
        views: Set(0),
        likes: Set(0),
        category: Set(document.category.unwrap_or_else(|| "general".to_string())),
    }
}

/// Partial row touching only the fields present in `changes`.
///
/// Counters are left alone; they move through increments only.
pub fn changed_row(id: Uuid, changes: PostDocument) -> ActiveModel {
    let mut row = ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(title) = changes.title {
        row.title = Set(title);
    }
    if let Some(content) = changes.content {
        row.content = Set(content);
    }
    if let Some(excerpt) = changes.excerpt {
        row.excerpt = Set(excerpt);
    }
    if let Some(image) = changes.featured_image {
        row.featured_image = Set(image);
    }
    if let Some(date) = changes.publish_date.and_then(from_store) {
        row.publish_date = Set(date);
    }
    if let Some(author) = changes.author {
        row.author = Set(author);
    }
    if let Some(tags) = changes.tags {
        row.tags = Set(Json::from(tags));
    }
    if let Some(published) = changes.is_published {
        row.is_published = Set(published);
    }
    if let Some(at) = changes.updated_at.and_then(from_store) {
        row.updated_at = Set(at);
    }
    if let Some(featured) = changes.featured {
        row.featured = Set(featured);
    }
    if let Some(seo_title) = changes.seo_title {
        row.seo_title = Set(Some(seo_title));
    }
    if let Some(seo_description) = changes.seo_description {
        row.seo_description = Set(Some(seo_description));
    }
    if let Some(slug) = changes.slug {
        row.slug = Set(Some(slug));
    }
    if let Some(read_time) = changes.read_time {
        row.read_time = Set(read_time as i32);
    }
    if let Some(category) = changes.category {
        row.category = Set(category);
    }
    row
}
