mod auth;
mod color;
mod config;
mod content;
mod db;
mod error;
mod extractors;
mod gallery;
mod inflight;
mod logging;
mod models;
mod params;
mod persona;
mod profile;
mod routes;
mod settings;
mod stories;
mod theme;
use crate::auth::IdentityService;
use crate::config::AppConfig;
use crate::inflight::InFlight;
use crate::persona::{AuthEvent, PersonaRegistry};
use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::broadcast::error::RecvError;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub registry: PersonaRegistry,
    pub identities: IdentityService,
    pub inflight: InFlight,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let registry = PersonaRegistry::new(db.clone());
        let identities = IdentityService::new(db.clone(), registry.clone(), config.session_ttl_hours);
        Self {
            db,
            config,
            registry,
            identities,
            inflight: InFlight::default(),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for PersonaRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.registry.clone()
    }
}

impl FromRef<AppState> for IdentityService {
    fn from_ref(state: &AppState) -> Self {
        state.identities.clone()
    }
}

impl FromRef<AppState> for InFlight {
    fn from_ref(state: &AppState) -> Self {
        state.inflight.clone()
    }
}

// Auth events are already applied to the registry by the time they land here.
fn spawn_auth_event_log(identities: &IdentityService) {
    let mut events = identities.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn(identity)) => {
                    tracing::debug!(%identity, "auth event: signed in")
                }
                Ok(AuthEvent::SignedOut(identity)) => {
                    tracing::debug!(%identity, "auth event: signed out")
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event log lagging")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&settings.logging)?;

    let pool = db::setup_database(&settings).await?;
    let state = AppState::new(pool, settings.clone());

    if let (Some(email), Some(password)) = (&settings.admin_email, &settings.admin_password) {
        state
            .identities
            .ensure_identity(email, password)
            .await
            .context("Failed to bootstrap admin identity")?;
    }

    spawn_auth_event_log(&state.identities);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;
    tracing::info!(addr = %settings.server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
