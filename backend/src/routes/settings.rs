use std::collections::HashMap;

use crate::{
    auth::{IdentityService, IdentitySummary},
    error::AppError,
    extractors::AdminSession,
    models::Persona,
    persona::PersonaRegistry,
    profile::{self, CoupleProfile, ProfileHex, ProfileUpdate},
    settings::{PLAYLIST_URL_KEY, get_setting, set_setting},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

pub async fn get_profile(State(pool): State<SqlitePool>) -> Result<Json<CoupleProfile>, AppError> {
    Ok(Json(profile::get_profile(&pool).await?))
}

/// Profile as stored plus the hex values the color editor works with.
#[derive(Serialize)]
pub struct AdminProfile {
    profile: CoupleProfile,
    hex: ProfileHex,
}

impl From<CoupleProfile> for AdminProfile {
    fn from(profile: CoupleProfile) -> Self {
        Self {
            hex: profile.hex(),
            profile,
        }
    }
}

pub async fn admin_get_profile(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
) -> Result<Json<AdminProfile>, AppError> {
    Ok(Json(profile::get_profile(&pool).await?.into()))
}

pub async fn update_profile(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<AdminProfile>, AppError> {
    Ok(Json(profile::save_profile(&pool, payload).await?.into()))
}

#[derive(Serialize, Deserialize)]
pub struct Playlist {
    pub url: Option<String>,
}

pub async fn get_playlist(State(pool): State<SqlitePool>) -> Result<Json<Playlist>, AppError> {
    let url = get_setting(&pool, PLAYLIST_URL_KEY)
        .await?
        .filter(|url| !url.trim().is_empty());
    Ok(Json(Playlist { url }))
}

/// An empty or missing url clears the playlist.
pub async fn update_playlist(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Json(payload): Json<Playlist>,
) -> Result<Json<Playlist>, AppError> {
    let url = payload.url.as_deref().map(str::trim).unwrap_or_default();
    set_setting(&pool, PLAYLIST_URL_KEY, url).await?;
    tracing::info!(cleared = url.is_empty(), "playlist url saved");

    Ok(Json(Playlist {
        url: Some(url.to_string()).filter(|url| !url.is_empty()),
    }))
}

pub async fn list_users(
    State(identities): State<IdentityService>,
    _admin: AdminSession,
) -> Result<Json<Vec<IdentitySummary>>, AppError> {
    Ok(Json(identities.list_identities().await?))
}

#[derive(Serialize)]
pub struct PersonaAssignment {
    identity_id: Uuid,
    email: String,
    persona: Option<Persona>,
}

/// Every identity with its persona, unassigned ones included.
pub async fn list_personas(
    State(identities): State<IdentityService>,
    State(registry): State<PersonaRegistry>,
    _admin: AdminSession,
) -> Result<Json<Vec<PersonaAssignment>>, AppError> {
    let links: HashMap<Uuid, Persona> = registry
        .list_links()
        .await?
        .into_iter()
        .map(|link| (link.identity_id, link.persona))
        .collect();

    let assignments = identities
        .list_identities()
        .await?
        .into_iter()
        .map(|identity| PersonaAssignment {
            persona: links.get(&identity.id).copied(),
            identity_id: identity.id,
            email: identity.email,
        })
        .collect();
    Ok(Json(assignments))
}

#[derive(Deserialize)]
pub struct AssignPersonaRequest {
    pub persona: Persona,
}

pub async fn assign_persona(
    State(registry): State<PersonaRegistry>,
    _admin: AdminSession,
    Path(identity_id): Path<Uuid>,
    Json(payload): Json<AssignPersonaRequest>,
) -> Result<StatusCode, AppError> {
    registry.assign(identity_id, payload.persona).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_persona(
    State(registry): State<PersonaRegistry>,
    _admin: AdminSession,
    Path(identity_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    registry.unassign(identity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
