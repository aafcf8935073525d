use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Words per minute used to derive [`Post::read_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// Length of an excerpt derived from content when none is supplied.
pub const EXCERPT_LENGTH: usize = 160;

/// Post entity - a blog post as the application sees it.
///
/// Timestamps are normalized from the store's native representation and
/// serialize as ISO-8601 strings. Every field except `id` tolerates absence
/// when deserialized so imported files need not be complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub read_time: u32,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub category: Category,
}

impl Post {
    /// Whether the post is live for readers at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.publish_date <= now
    }

    /// Whether the post is dated in the future relative to `now`.
    pub fn is_scheduled(&self, now: DateTime<Utc>) -> bool {
        self.publish_date > now
    }

    /// Merge a partial update into this post.
    ///
    /// Only fields present in `patch` change. Content changes recompute
    /// `read_time`. Counters and identity are never touched here.
    pub fn apply(&mut self, patch: &PostPatch, updated_at: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
            self.read_time = read_time(content);
        }
        if let Some(excerpt) = &patch.excerpt {
            self.excerpt = excerpt.clone();
        }
        if let Some(image) = &patch.featured_image {
            self.featured_image = image.clone();
        }
        if let Some(date) = patch.publish_date {
            self.publish_date = date;
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(published) = patch.is_published {
            self.is_published = published;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(seo_title) = &patch.seo_title {
            self.seo_title = Some(seo_title.clone());
        }
        if let Some(seo_description) = &patch.seo_description {
            self.seo_description = Some(seo_description.clone());
        }
        if let Some(slug) = &patch.slug {
            self.slug = Some(slug.clone());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.updated_at = Some(updated_at);
    }
}

/// Fixed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Technology,
    Design,
    Business,
    Lifestyle,
    Tutorial,
    News,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Technology,
        Category::Design,
        Category::Business,
        Category::Lifestyle,
        Category::Tutorial,
        Category::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Technology => "technology",
            Category::Design => "design",
            Category::Business => "business",
            Category::Lifestyle => "lifestyle",
            Category::Tutorial => "tutorial",
            Category::News => "news",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category name is not one of [`Category::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Input for creating a post. The store assigns id, timestamps and counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: String,
    /// Defaults to the creation time when absent.
    pub publish_date: Option<DateTime<Utc>>,
    pub author: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub featured: bool,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub slug: Option<String>,
    pub category: Category,
}

/// Partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub featured: Option<bool>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub slug: Option<String>,
    pub category: Option<Category>,
}

impl PostPatch {
    pub fn published(is_published: bool) -> Self {
        Self {
            is_published: Some(is_published),
            ..Self::default()
        }
    }

    pub fn featured(featured: bool) -> Self {
        Self {
            featured: Some(featured),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Reading time in minutes: `ceil(words / 200)`. Empty content reads in 0.
pub fn read_time(content: &str) -> u32 {
    let words = plain_text(content).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Strip markup tags, leaving the text content separated by whitespace.
pub fn plain_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}

/// Excerpt derived from content: the leading plain text, cut on a char boundary.
pub fn derive_excerpt(content: &str) -> String {
    let text = plain_text(content);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(EXCERPT_LENGTH) {
        Some((cut, _)) => format!("{}...", collapsed[..cut].trim_end()),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn read_time_rounds_up_per_two_hundred_words() {
        assert_eq!(read_time(&words(400)), 2);
        assert_eq!(read_time(&words(401)), 3);
        assert_eq!(read_time(&words(1)), 1);
    }

    #[test]
    fn read_time_of_empty_content_is_zero() {
        assert_eq!(read_time(""), 0);
        assert_eq!(read_time("   \n\t"), 0);
        assert_eq!(read_time("<p></p>"), 0);
    }

    #[test]
    fn read_time_ignores_markup() {
        let html = format!("<p>{}</p><p><strong>{}</strong></p>", words(200), words(1));
        assert_eq!(read_time(&html), 2);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Design".parse::<Category>().unwrap(), Category::Design);
        assert!("gardening".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn derive_excerpt_truncates_plain_text() {
        let content = format!("<h1>Title</h1><p>{}</p>", "abc ".repeat(100));
        let excerpt = derive_excerpt(&content);
        assert!(excerpt.starts_with("Title abc"));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.chars().count() <= EXCERPT_LENGTH + 3);

        assert_eq!(derive_excerpt("<p>short one</p>"), "short one");
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut post: Post = serde_json::from_str(r#"{"id":"p1","title":"Old","content":"a b c"}"#).unwrap();
        let before = post.clone();
        let at = Utc::now();

        post.apply(
            &PostPatch {
                title: Some("New".into()),
                ..PostPatch::default()
            },
            at,
        );

        assert_eq!(post.title, "New");
        assert_eq!(post.content, before.content);
        assert_eq!(post.views, before.views);
        assert_eq!(post.updated_at, Some(at));
    }
}
