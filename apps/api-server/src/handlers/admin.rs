//! Admin workspace endpoints. Every handler takes an [`Identity`].

use actix_web::http::header::ContentDisposition;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use inkpress_core::domain::{Category, NewPost, Post, PostFilter, PostPatch};
use inkpress_core::services::{AdminWorkspace, BulkAction};
use inkpress_shared::dto::{
    AdminPostsQuery, BulkActionRequest, BulkActionResponse, CreatePostRequest, CreatedResponse,
    ImportResponse, UpdatePostRequest, WorkspaceResponse,
};

use super::{parse_category, parse_date, parse_param};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn snapshot(workspace: &AdminWorkspace) -> WorkspaceResponse<Post> {
    let items = workspace
        .visible(Utc::now())
        .into_iter()
        .cloned()
        .collect();
    WorkspaceResponse {
        items,
        loaded: workspace.collection().posts().len(),
        has_more: workspace.collection().has_more(),
        error: workspace.error().map(str::to_string),
    }
}

/// GET /api/admin/posts
///
/// Replaces the workspace filter with the query and returns the loaded posts
/// that pass it.
pub async fn list_posts(
    _identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<AdminPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        search: query.search.unwrap_or_default(),
        status: parse_param(query.status.as_deref())?.unwrap_or_default(),
        category: parse_category(query.category.as_deref())?,
        sort: parse_param(query.sort.as_deref())?.unwrap_or_default(),
    };

    let mut workspace = state.workspace.lock().await;
    workspace.set_filter(filter);
    Ok(HttpResponse::Ok().json(snapshot(&workspace)))
}

/// POST /api/admin/posts/refresh
pub async fn refresh(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut workspace = state.workspace.lock().await;
    workspace.refresh().await;
    Ok(HttpResponse::Ok().json(snapshot(&workspace)))
}

/// POST /api/admin/posts/load-more
pub async fn load_more(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut workspace = state.workspace.lock().await;
    workspace.load_more().await;
    Ok(HttpResponse::Ok().json(snapshot(&workspace)))
}

/// POST /api/admin/posts
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let input = new_post(body.into_inner())?;

    let id = state.workspace.lock().await.create(input).await?;

    tracing::info!(post_id = %id, admin = %identity.subject, "Post created via admin");
    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

/// PATCH /api/admin/posts/{id}
pub async fn update_post(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let patch = post_patch(body.into_inner())?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let mut workspace = state.workspace.lock().await;
    workspace.update(&id, patch).await?;
    updated_post(&workspace, &id)
}

/// POST /api/admin/posts/{id}/toggle-published
pub async fn toggle_published(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut workspace = state.workspace.lock().await;
    workspace.toggle_published(&id).await?;
    updated_post(&workspace, &id)
}

/// POST /api/admin/posts/{id}/toggle-featured
pub async fn toggle_featured(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut workspace = state.workspace.lock().await;
    workspace.toggle_featured(&id).await?;
    updated_post(&workspace, &id)
}

fn updated_post(workspace: &AdminWorkspace, id: &str) -> AppResult<HttpResponse> {
    match workspace.collection().find(id) {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.workspace.lock().await.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/admin/posts/bulk
///
/// Selects the given ids, or every visible post with `allVisible`, and
/// applies the action to each in turn. The first failing post ends the run;
/// earlier posts keep their new state.
pub async fn bulk_action(
    _identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<BulkActionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let action = bulk_action_from(&req.action)?;
    if req.ids.is_empty() && !req.all_visible {
        return Err(AppError::Validation(vec![
            "ids must name at least one post".to_string(),
        ]));
    }

    let mut workspace = state.workspace.lock().await;
    workspace.clear_selection();
    if req.all_visible {
        workspace.select_all_visible(Utc::now());
    }
    for id in &req.ids {
        if !workspace.select(id) {
            workspace.clear_selection();
            return Err(AppError::NotFound(format!("Post with id {id} is not loaded")));
        }
    }

    let processed = workspace.bulk(action).await?;
    Ok(HttpResponse::Ok().json(BulkActionResponse { processed }))
}

/// GET /api/admin/export
pub async fn export(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let file = state.workspace.lock().await.export_file(Utc::now())?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(ContentDisposition::attachment(file.file_name))
        .body(file.body))
}

/// POST /api/admin/import
///
/// Replaces the workspace's loaded posts. The store is not written.
pub async fn import(
    _identity: Identity,
    state: web::Data<AppState>,
    body: String,
) -> AppResult<HttpResponse> {
    let imported = state.workspace.lock().await.import_json(&body)?;
    Ok(HttpResponse::Ok().json(ImportResponse { imported }))
}

/// GET /api/admin/activity
pub async fn activity(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let entries = state.workspace.lock().await.activity();
    Ok(HttpResponse::Ok().json(entries))
}

/// GET /api/admin/metrics
pub async fn metrics(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let metrics = state.workspace.lock().await.metrics(Utc::now());
    Ok(HttpResponse::Ok().json(metrics))
}

fn bulk_action_from(raw: &str) -> Result<BulkAction, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "publish" => Ok(BulkAction::Publish),
        "unpublish" => Ok(BulkAction::Unpublish),
        "feature" => Ok(BulkAction::Feature),
        "delete" => Ok(BulkAction::Delete),
        other => Err(AppError::BadRequest(format!("unknown bulk action `{other}`"))),
    }
}

fn new_post(req: CreatePostRequest) -> Result<NewPost, AppError> {
    let mut errors = Vec::new();
    for (field, value) in [
        ("title", &req.title),
        ("content", &req.content),
        ("author", &req.author),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{field} is required"));
        }
    }

    let publish_date = match req.publish_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => parse_date("publishDate", raw)
            .map_err(|e| errors.push(e))
            .ok(),
        None => None,
    };
    let category = match parse_category(req.category.as_deref()) {
        Ok(category) => category.unwrap_or_default(),
        Err(e) => {
            errors.push(category_error(e));
            Category::default()
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(NewPost {
        title: req.title.trim().to_string(),
        content: req.content,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
        publish_date,
        author: req.author.trim().to_string(),
        tags: clean_tags(req.tags),
        is_published: req.is_published,
        featured: req.featured,
        seo_title: req.seo_title,
        seo_description: req.seo_description,
        slug: req.slug.filter(|s| !s.trim().is_empty()),
        category,
    })
}

fn post_patch(req: UpdatePostRequest) -> Result<PostPatch, AppError> {
    let mut errors = Vec::new();
    for (field, value) in [
        ("title", &req.title),
        ("content", &req.content),
        ("author", &req.author),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(format!("{field} must not be empty"));
        }
    }

    let publish_date = match req.publish_date.as_deref() {
        Some(raw) => parse_date("publishDate", raw)
            .map_err(|e| errors.push(e))
            .ok(),
        None => None,
    };
    let category = parse_category(req.category.as_deref()).unwrap_or_else(|e| {
        errors.push(category_error(e));
        None
    });

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(PostPatch {
        title: req.title.map(|t| t.trim().to_string()),
        content: req.content,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
        publish_date,
        author: req.author.map(|a| a.trim().to_string()),
        tags: req.tags.map(clean_tags),
        is_published: req.is_published,
        featured: req.featured,
        seo_title: req.seo_title,
        seo_description: req.seo_description,
        slug: req.slug,
        category,
    })
}

fn category_error(error: AppError) -> String {
    match error {
        AppError::BadRequest(msg) => msg,
        other => other.to_string(),
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reports_every_missing_field() {
        let result = new_post(CreatePostRequest {
            category: Some("gardening".into()),
            publish_date: Some("yesterday".into()),
            ..CreatePostRequest::default()
        });

        let Err(AppError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&"title is required".to_string()));
        assert!(errors.iter().any(|e| e.contains("gardening")));
        assert!(errors.iter().any(|e| e.contains("publishDate")));
    }

    #[test]
    fn create_request_maps_category_and_date() {
        let input = new_post(CreatePostRequest {
            title: "  Hello  ".into(),
            content: "<p>Hi</p>".into(),
            author: "Ada".into(),
            tags: vec![" rust ".into(), "".into()],
            category: Some("Design".into()),
            publish_date: Some("2024-05-01T08:00:00Z".into()),
            ..CreatePostRequest::default()
        })
        .unwrap();

        assert_eq!(input.title, "Hello");
        assert_eq!(input.category, Category::Design);
        assert_eq!(input.tags, vec!["rust".to_string()]);
        assert_eq!(
            input.publish_date.map(|d| d.to_rfc3339()),
            Some("2024-05-01T08:00:00+00:00".to_string())
        );
    }

    #[test]
    fn patch_rejects_blank_title() {
        let result = post_patch(UpdatePostRequest {
            title: Some("   ".into()),
            ..UpdatePostRequest::default()
        });

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn bulk_action_names_are_case_insensitive() {
        assert_eq!(bulk_action_from("Publish").unwrap(), BulkAction::Publish);
        assert_eq!(bulk_action_from("delete").unwrap(), BulkAction::Delete);
        assert!(bulk_action_from("archive").is_err());
    }
}
