use crate::{
    content::{
        self, ContentOwner, ContentPair, Narrative, OUR_STORY_TITLE, PersonaSelection,
    },
    error::AppError,
    extractors::AdminSession,
    inflight::InFlight,
    models::Persona,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Serialize)]
pub struct PageResponse {
    title: &'static str,
    content: ContentPair,
    narrative: Narrative,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub persona: Option<Persona>,
}

async fn our_story(pool: &SqlitePool, persona: Option<Persona>) -> Result<PageResponse, AppError> {
    let content = content::get_content_pair(pool, &ContentOwner::our_story()).await?;
    let mut selection = PersonaSelection::default();
    if let Some(persona) = persona {
        selection.select(persona);
    }
    Ok(PageResponse {
        title: OUR_STORY_TITLE,
        narrative: selection.render(&content),
        content,
    })
}

pub async fn get_our_story(
    State(pool): State<SqlitePool>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse>, AppError> {
    Ok(Json(our_story(&pool, params.persona).await?))
}

pub async fn update_our_story(
    State(pool): State<SqlitePool>,
    State(inflight): State<InFlight>,
    admin: AdminSession,
    Json(payload): Json<ContentPair>,
) -> Result<Json<PageResponse>, AppError> {
    let _guard = inflight.begin("page:our-story")?;
    content::save_content_pair(&pool, &ContentOwner::our_story(), &payload).await?;
    tracing::info!(identity = %admin.identity.id, "our story page saved");
    Ok(Json(our_story(&pool, admin.persona).await?))
}
