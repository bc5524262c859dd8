use crate::{
    error::AppError,
    extractors::Viewer,
    models::Persona,
    persona::PersonaRegistry,
    theme::{self, ThemeContext, ThemeDiff, ThemeEngine, ThemeMode, ThemeState},
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Deserialize)]
pub struct ThemeParams {
    pub mode: Option<ThemeMode>,
    pub persona: Option<Persona>,
}

/// The viewer's theme. `mode` and `persona` preview another state without
/// storing anything.
pub async fn get_theme(
    State(pool): State<SqlitePool>,
    State(registry): State<PersonaRegistry>,
    viewer: Viewer,
    Query(params): Query<ThemeParams>,
) -> Result<Json<ThemeContext>, AppError> {
    let identity = viewer.identity.as_ref().map(|identity| identity.id);
    let context = ThemeContext::load(&pool, &registry, identity, params.mode).await?;

    let context = match params.persona {
        Some(persona) if context.persona != Some(persona) => ThemeContext::from_state(ThemeState {
            mode: context.mode,
            couple: context.couple,
            current_persona: Some(persona),
        }),
        _ => context,
    };
    Ok(Json(context))
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: ThemeMode,
}

#[derive(Serialize)]
pub struct ModeChange {
    theme: ThemeContext,
    diff: ThemeDiff,
}

/// Stores the viewer's mode and returns what the page has to change.
pub async fn set_mode(
    State(pool): State<SqlitePool>,
    State(registry): State<PersonaRegistry>,
    viewer: Viewer,
    Json(payload): Json<ModeRequest>,
) -> Result<Json<ModeChange>, AppError> {
    let identity = viewer.identity.ok_or(AppError::Unauthorized)?;

    let mut engine = ThemeEngine::default();
    let before = ThemeContext::load(&pool, &registry, Some(identity.id), None).await?;
    engine.apply(&before.state());

    theme::set_mode(&pool, identity.id, payload.mode).await?;
    tracing::debug!(identity = %identity.id, mode = ?payload.mode, "theme mode saved");

    let theme = ThemeContext::load(&pool, &registry, Some(identity.id), None).await?;
    let diff = engine.apply(&theme.state());
    if diff.is_empty() {
        tracing::debug!(identity = %identity.id, "theme mode unchanged");
    }
    Ok(Json(ModeChange { theme, diff }))
}
