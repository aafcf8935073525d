//! Domain entities - the core business objects.

mod activity;
mod filter;
mod post;

pub use activity::{ACTIVITY_CAPACITY, ActivityEntry, ActivityKind, ActivityLog};
pub use filter::{PostFilter, SortOrder, StatusFilter, matches_search};
pub use post::{
    Category, EXCERPT_LENGTH, NewPost, Post, PostPatch, UnknownCategory, WORDS_PER_MINUTE,
    derive_excerpt, plain_text, read_time,
};
