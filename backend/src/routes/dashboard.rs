use crate::{error::AppError, extractors::AdminSession, gallery, stories};
use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Serialize)]
pub struct DashboardResponse {
    total_stories: i64,
    published_stories: i64,
    gallery_media: i64,
}

pub async fn get_dashboard(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
) -> Result<Json<DashboardResponse>, AppError> {
    let counts = stories::counts(&pool).await?;
    let gallery_media = gallery::count_media(&pool).await?;

    Ok(Json(DashboardResponse {
        total_stories: counts.total,
        published_stories: counts.published,
        gallery_media,
    }))
}
