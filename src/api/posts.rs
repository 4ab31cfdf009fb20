use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{ApiResponse, PostDto, PostForm};
use super::validation::{validate_limit, validate_post_form, validate_post_id};
use super::{ApiError, AppState, NotificationEvent};
use crate::models::post::{PostChanges, PostDraft};

#[derive(Deserialize)]
pub struct FeaturedQuery {
    #[serde(default = "default_featured_limit")]
    pub limit: u64,
}

const fn default_featured_limit() -> u64 {
    3
}

/// GET /api/posts
/// Every post, newest first. An empty collection is an empty list, not an
/// error.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let posts = state.store().list_posts().await?;

    Ok(Json(ApiResponse::success(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

/// GET /api/posts/featured?limit=3
pub async fn featured_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let posts = state.store().list_featured_posts(limit).await?;

    Ok(Json(ApiResponse::success(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

/// GET /api/posts/{slug}
pub async fn get_post_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let post = state
        .store()
        .find_post_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::slug_not_found(&slug))?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// POST /api/dashboard/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PostForm>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    validate_post_form(&form)?;

    let draft = PostDraft {
        title: form.title.trim().to_string(),
        summary: form.summary.trim().to_string(),
        content: form.content.trim().to_string(),
        image_urls: form.image_urls,
        author: form.author,
        category: form.category,
        featured: form.featured,
    };

    let post = state.store().create_post(&draft).await?;

    let _ = state.event_bus().send(NotificationEvent::PostCreated {
        id: post.id,
        slug: post.slug.clone(),
        title: post.title.clone(),
    });

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// PUT /api/dashboard/posts/{id}
/// Edits never move the slug or creation date, only the writable fields.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(form): Json<PostForm>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let id = validate_post_id(id)?;
    validate_post_form(&form)?;

    let changes = PostChanges {
        title: form.title.trim().to_string(),
        summary: form.summary.trim().to_string(),
        content: form.content.trim().to_string(),
        image_urls: form.image_urls,
        author: form.author,
        category: form.category,
        featured: form.featured,
    };

    let post = state
        .store()
        .update_post(id, &changes)
        .await?
        .ok_or_else(|| ApiError::post_not_found(id))?;

    let _ = state.event_bus().send(NotificationEvent::PostUpdated {
        id: post.id,
        slug: post.slug.clone(),
        title: post.title.clone(),
    });

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// DELETE /api/dashboard/posts/{id}
/// Hard delete. Hosted images are left behind on the image host.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_post_id(id)?;

    let removed = state.store().delete_post(id).await?;
    if !removed {
        return Err(ApiError::post_not_found(id));
    }

    let _ = state
        .event_bus()
        .send(NotificationEvent::PostDeleted { id });

    Ok(Json(ApiResponse::success(())))
}
