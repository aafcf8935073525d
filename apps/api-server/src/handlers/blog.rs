//! Public blog: paged index, reader view, likes and share links.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use inkpress_core::domain::{Post, PostFilter, StatusFilter};
use inkpress_core::services::{Cursor, ListScope, ReaderState, ReaderView, ShareLinks, push_like};
use inkpress_shared::dto::{LikeResponse, ListPostsQuery, PageResponse};

use super::{parse_category, parse_param};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: usize = 50;

/// GET /api/posts
///
/// One page of published posts. `search`, `category` and `sort` apply to the
/// returned page only; the cursor always follows publish order.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let page_size = match query.page_size {
        Some(0) => return Err(AppError::BadRequest("pageSize must be positive".to_string())),
        Some(size) => size.min(MAX_PAGE_SIZE),
        None => state.page_size,
    };
    let filter = PostFilter {
        search: query.search.unwrap_or_default(),
        status: StatusFilter::All,
        category: parse_category(query.category.as_deref())?,
        sort: parse_param(query.sort.as_deref())?.unwrap_or_default(),
    };
    let cursor = query
        .cursor
        .filter(|token| !token.is_empty())
        .map(Cursor::from_token);

    let page = state.published().list(page_size, cursor.as_ref()).await?;
    let items: Vec<Post> = filter
        .apply(&page.posts, Utc::now())
        .into_iter()
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(PageResponse {
        items,
        next_cursor: page.next_cursor.map(|c| c.to_string()),
        has_more: page.has_more,
    }))
}

/// GET /api/posts/{id}
///
/// Opens the reader view on a published post. The view counter is bumped in
/// the background.
pub async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut reader = ReaderView::new(state.store.clone(), ListScope::Published);

    match reader.open(&id).await {
        ReaderState::Found(post) => Ok(HttpResponse::Ok().json(post)),
        ReaderState::NotFound => Err(AppError::NotFound(format!("Post with id {id} not found"))),
        ReaderState::Loading | ReaderState::Error(_) => Err(AppError::ServiceUnavailable),
    }
}

/// GET /api/posts/slug/{slug}
pub async fn get_post_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let post = state
        .published()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with slug {slug} not found")))?;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/like
pub async fn like_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    set_like(&state, &path.into_inner(), true).await
}

/// DELETE /api/posts/{id}/like
pub async fn unlike_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    set_like(&state, &path.into_inner(), false).await
}

/// Store outages leave the requested like state standing; unknown posts 404.
async fn set_like(state: &AppState, id: &str, liked: bool) -> AppResult<HttpResponse> {
    let liked = push_like(state.store.as_ref(), id, liked).await?;
    tracing::debug!(post_id = %id, liked, "Like recorded");
    Ok(HttpResponse::Ok().json(LikeResponse { liked }))
}

/// GET /api/posts/{id}/share
pub async fn share_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .published()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {id} not found")))?;
    let links = ShareLinks::for_post(&state.public_base_url, &post)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(links))
}
