//! Services - orchestration between consumers and the post store.

mod collection;
mod cursor;
mod document;
mod reader;
mod share;
mod workspace;

pub use collection::{LOAD_ERROR_MESSAGE, Page, PostCollection, next_update_time};
pub use cursor::{Cursor, ListScope};
pub use document::{document_for_new, document_for_patch, post_from_stored};
pub use reader::{READ_ERROR_MESSAGE, ReaderState, ReaderView, push_like, spawn_view_increment};
pub use share::ShareLinks;
pub use workspace::{
    AdminWorkspace, BulkAction, DashboardMetrics, ExportFile, PostSummary, TOP_POSTS,
    export_file_name,
};
