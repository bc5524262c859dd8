use crate::auth::IdentityService;
use crate::error::AppError;
use crate::models::{Identity, Persona};
use crate::persona::PersonaRegistry;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Whoever is calling, signed in or not. Never rejects on a missing or
/// stale token.
pub struct Viewer {
    pub identity: Option<Identity>,
    pub persona: Option<Persona>,
    pub token: Option<String>,
}

impl<S> FromRequestParts<S> for Viewer
where
    IdentityService: FromRef<S>,
    PersonaRegistry: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Viewer {
                identity: None,
                persona: None,
                token: None,
            });
        };

        let identities = IdentityService::from_ref(state);
        let registry = PersonaRegistry::from_ref(state);

        let identity = identities.session_identity(&token).await?;
        let persona = match &identity {
            Some(identity) => registry.resolve(identity.id).await?.persona(),
            None => None,
        };

        Ok(Viewer {
            identity,
            persona,
            token: Some(token),
        })
    }
}

/// A signed-in identity. Every admin route takes one of these.
pub struct AdminSession {
    pub identity: Identity,
    pub persona: Option<Persona>,
}

impl<S> FromRequestParts<S> for AdminSession
where
    IdentityService: FromRef<S>,
    PersonaRegistry: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        let identity = viewer.identity.ok_or(AppError::Unauthorized)?;

        tracing::debug!(identity = %identity.id, path = %parts.uri.path(), "admin request");
        Ok(AdminSession {
            identity,
            persona: viewer.persona,
        })
    }
}
