//! Search, status, category and sort pipeline over an in-memory post list.
//!
//! Every stage is a pure function of its inputs; callers rerun the whole
//! pipeline whenever an input changes.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::{Category, Post};

/// Publication status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    /// Published and dated at or before now.
    Published,
    /// Not published.
    Draft,
    /// Dated in the future, whatever the published flag says.
    Scheduled,
    Featured,
}

impl StatusFilter {
    pub fn matches(&self, post: &Post, now: DateTime<Utc>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Published => post.is_live(now),
            StatusFilter::Draft => !post.is_published,
            StatusFilter::Scheduled => post.is_scheduled(now),
            StatusFilter::Featured => post.featured,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "published" => Ok(StatusFilter::Published),
            "draft" => Ok(StatusFilter::Draft),
            "scheduled" => Ok(StatusFilter::Scheduled),
            "featured" => Ok(StatusFilter::Featured),
            other => Err(format!("unknown status filter `{other}`")),
        }
    }
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    MostViewed,
}

impl SortOrder {
    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            SortOrder::Newest => b.publish_date.cmp(&a.publish_date),
            SortOrder::Oldest => a.publish_date.cmp(&b.publish_date),
            SortOrder::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortOrder::MostViewed => b.views.cmp(&a.views),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "newest" | "date-desc" => Ok(SortOrder::Newest),
            "oldest" | "date-asc" => Ok(SortOrder::Oldest),
            "title" => Ok(SortOrder::Title),
            "most-viewed" | "views" => Ok(SortOrder::MostViewed),
            other => Err(format!("unknown sort order `{other}`")),
        }
    }
}

/// The full filter state of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    pub search: String,
    pub status: StatusFilter,
    pub category: Option<Category>,
    pub sort: SortOrder,
}

impl PostFilter {
    /// Run search, status, category and sort over `posts`.
    pub fn apply<'a>(&self, posts: &'a [Post], now: DateTime<Utc>) -> Vec<&'a Post> {
        let needle = self.search.trim().to_lowercase();
        let mut visible: Vec<&Post> = posts
            .iter()
            .filter(|post| matches_search(post, &needle))
            .filter(|post| self.status.matches(post, now))
            .filter(|post| self.category.is_none_or(|c| post.category == c))
            .collect();
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

/// Case-insensitive substring match over title, excerpt, content and tags.
///
/// `needle` must already be lowercased. An empty needle matches everything.
pub fn matches_search(post: &Post, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
        || post.content.to_lowercase().contains(needle)
        || post.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(id: &str, title: &str, offset_hours: i64, published: bool) -> Post {
        let mut post: Post = serde_json::from_value(serde_json::json!({ "id": id })).unwrap();
        post.title = title.to_string();
        post.publish_date = Utc::now() + Duration::hours(offset_hours);
        post.is_published = published;
        post
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn scheduled_post_is_not_published_even_when_flagged() {
        let now = Utc::now();
        let posts = vec![post("future", "Soon", 1, true), post("past", "Then", -1, true)];

        let scheduled = PostFilter {
            status: StatusFilter::Scheduled,
            ..PostFilter::default()
        };
        let published = PostFilter {
            status: StatusFilter::Published,
            ..PostFilter::default()
        };

        assert_eq!(ids(&scheduled.apply(&posts, now)), vec!["future"]);
        assert_eq!(ids(&published.apply(&posts, now)), vec!["past"]);
    }

    #[test]
    fn unfiltered_listing_includes_drafts() {
        let now = Utc::now();
        let posts = vec![post("draft", "Draft", -2, false), post("live", "Live", -1, true)];

        let all = PostFilter::default().apply(&posts, now);
        assert_eq!(ids(&all), vec!["live", "draft"]);

        let drafts = PostFilter {
            status: StatusFilter::Draft,
            ..PostFilter::default()
        };
        assert_eq!(ids(&drafts.apply(&posts, now)), vec!["draft"]);
    }

    #[test]
    fn search_covers_tags_and_ignores_case() {
        let now = Utc::now();
        let mut tagged = post("a", "Nothing here", -1, true);
        tagged.tags = vec!["Rust".into()];
        let mut body = post("b", "Other", -1, true);
        body.content = "<p>Learning RUST daily</p>".into();
        let miss = post("c", "Gardening", -1, true);
        let posts = vec![tagged, body, miss];

        let filter = PostFilter {
            search: "  rust ".into(),
            ..PostFilter::default()
        };
        let mut found = ids(&filter.apply(&posts, now));
        found.sort();
        assert_eq!(found, vec!["a", "b"]);
    }

    #[test]
    fn category_and_sort_stages_compose() {
        let now = Utc::now();
        let mut a = post("a", "beta", -3, true);
        a.category = Category::Design;
        a.views = 5;
        let mut b = post("b", "Alpha", -2, true);
        b.category = Category::Design;
        b.views = 50;
        let mut c = post("c", "gamma", -1, true);
        c.category = Category::News;
        let posts = vec![a, b, c];

        let by_title = PostFilter {
            category: Some(Category::Design),
            sort: SortOrder::Title,
            ..PostFilter::default()
        };
        assert_eq!(ids(&by_title.apply(&posts, now)), vec!["b", "a"]);

        let oldest = PostFilter {
            sort: SortOrder::Oldest,
            ..PostFilter::default()
        };
        assert_eq!(ids(&oldest.apply(&posts, now)), vec!["a", "b", "c"]);

        let popular = PostFilter {
            sort: SortOrder::MostViewed,
            ..PostFilter::default()
        };
        assert_eq!(ids(&popular.apply(&posts, now))[0], "b");
    }

    #[test]
    fn filters_parse_from_query_strings() {
        assert_eq!("Scheduled".parse::<StatusFilter>().unwrap(), StatusFilter::Scheduled);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("most-viewed".parse::<SortOrder>().unwrap(), SortOrder::MostViewed);
        assert!("random".parse::<SortOrder>().is_err());
    }
}
