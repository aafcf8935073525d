//! Social sharing links for a post.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::Post;

/// Ready-to-open share targets for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    /// Canonical reader URL, also used for "copy link".
    pub permalink: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub email: String,
}

impl ShareLinks {
    /// Build share links for `post` under the public site root `base`.
    pub fn for_post(base: &Url, post: &Post) -> Result<Self, url::ParseError> {
        let permalink = base.join(&format!("posts/{}", post.id))?;
        let link = permalink.as_str();
        let title = post.seo_title.as_deref().unwrap_or(&post.title);

        let twitter = Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("url", link), ("text", title)],
        )?;
        let facebook =
            Url::parse_with_params("https://www.facebook.com/sharer/sharer.php", &[("u", link)])?;
        let linkedin = Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            &[("url", link)],
        )?;

        let mut email = Url::parse("mailto:")?;
        email
            .query_pairs_mut()
            .append_pair("subject", title)
            .append_pair("body", link);

        Ok(Self {
            permalink: permalink.to_string(),
            twitter: twitter.into(),
            facebook: facebook.into(),
            linkedin: linkedin.into(),
            email: email.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_encode_permalink_and_title() {
        let mut post: Post = serde_json::from_str(r#"{"id":"abc123"}"#).unwrap();
        post.title = "Rust & You".into();
        let base = Url::parse("https://blog.example.com/").unwrap();

        let links = ShareLinks::for_post(&base, &post).unwrap();

        assert_eq!(links.permalink, "https://blog.example.com/posts/abc123");
        assert!(links.twitter.starts_with("https://twitter.com/intent/tweet?url=https%3A%2F%2Fblog.example.com%2Fposts%2Fabc123"));
        assert!(links.twitter.contains("text=Rust+%26+You"));
        assert!(links.facebook.contains("u=https%3A%2F%2Fblog.example.com"));
        assert!(links.email.starts_with("mailto:?subject=Rust+%26+You"));
    }
}
