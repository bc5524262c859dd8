use crate::{
    auth::{IdentityService, IdentitySummary, SignedIn},
    error::AppError,
    extractors::Viewer,
    persona::PersonaResolution,
};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub async fn sign_in(
    State(identities): State<IdentityService>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignedIn>, AppError> {
    Ok(Json(
        identities.sign_in(&payload.email, &payload.password).await?,
    ))
}

pub async fn sign_out(
    State(identities): State<IdentityService>,
    viewer: Viewer,
) -> Result<StatusCode, AppError> {
    if let Some(token) = &viewer.token {
        identities.sign_out(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct MeResponse {
    identity: Option<IdentitySummary>,
    persona: Option<PersonaResolution>,
}

/// Anonymous viewers get `null` for both fields rather than a 401.
pub async fn me(viewer: Viewer) -> Json<MeResponse> {
    let persona = viewer.identity.as_ref().map(|_| match viewer.persona {
        Some(persona) => PersonaResolution::Assigned(persona),
        None => PersonaResolution::Unassigned,
    });
    Json(MeResponse {
        identity: viewer.identity.map(IdentitySummary::from),
        persona,
    })
}
