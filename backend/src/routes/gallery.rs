use crate::{
    error::AppError,
    extractors::AdminSession,
    gallery::{self, CategoryFilter, HOME_HIGHLIGHTS_LIMIT, MediaScope, NewGalleryMedia},
    models::{GalleryCategory, GalleryMedia},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

pub async fn get_categories(
    State(pool): State<SqlitePool>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<GalleryCategory>>, AppError> {
    Ok(Json(gallery::list_categories(&pool, filter).await?))
}

#[derive(Deserialize)]
pub struct MediaParams {
    pub category: Option<String>,
}

pub async fn get_media(
    State(pool): State<SqlitePool>,
    Query(params): Query<MediaParams>,
) -> Result<Json<Vec<GalleryMedia>>, AppError> {
    let scope = match params.category.as_deref() {
        Some(raw) => MediaScope::parse(raw)?,
        None => MediaScope::All,
    };
    Ok(Json(gallery::list_media(&pool, scope).await?))
}

#[derive(Deserialize)]
pub struct HighlightParams {
    pub category: Option<Uuid>,
    pub limit: Option<i64>,
}

pub async fn get_highlights(
    State(pool): State<SqlitePool>,
    Query(params): Query<HighlightParams>,
) -> Result<Json<Vec<GalleryMedia>>, AppError> {
    let limit = params
        .limit
        .filter(|n| *n > 0)
        .unwrap_or(HOME_HIGHLIGHTS_LIMIT);
    Ok(Json(
        gallery::home_highlights(&pool, params.category, limit).await?,
    ))
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub show_on_home: bool,
}

pub async fn create_category(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<GalleryCategory>), AppError> {
    let category = gallery::create_category(&pool, &payload.name, payload.show_on_home).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    gallery::delete_category(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `current` is the value the caller saw, so a repeated request lands on
/// the same state instead of flipping back.
#[derive(Deserialize)]
pub struct ToggleHomeRequest {
    pub current: bool,
}

pub async fn toggle_show_on_home(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<ToggleHomeRequest>,
) -> Result<Json<GalleryCategory>, AppError> {
    Ok(Json(
        gallery::toggle_show_on_home(&pool, id, payload.current).await?,
    ))
}

pub async fn add_media(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Json(payload): Json<NewGalleryMedia>,
) -> Result<(StatusCode, Json<GalleryMedia>), AppError> {
    let media = gallery::add_media(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

#[derive(Deserialize)]
pub struct CaptionRequest {
    pub caption: Option<String>,
}

pub async fn update_caption(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<CaptionRequest>,
) -> Result<Json<GalleryMedia>, AppError> {
    Ok(Json(
        gallery::update_caption(&pool, id, payload.caption).await?,
    ))
}

pub async fn delete_media(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    gallery::delete_media(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
