use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Persona, PersonaLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "persona", rename_all = "lowercase")]
pub enum PersonaResolution {
    Assigned(Persona),
    Unassigned,
}

impl PersonaResolution {
    pub fn persona(&self) -> Option<Persona> {
        match self {
            Self::Assigned(persona) => Some(*persona),
            Self::Unassigned => None,
        }
    }
}

/// Identity lifecycle notifications. The registry sees every event before
/// any other subscriber does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Uuid),
    SignedOut(Uuid),
}

/// Maps identities to personas. Links are only ever written by an admin.
#[derive(Clone)]
pub struct PersonaRegistry {
    pool: SqlitePool,
    cache: Arc<RwLock<HashMap<Uuid, PersonaResolution>>>,
}

impl PersonaRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn resolve(&self, identity: Uuid) -> Result<PersonaResolution, AppError> {
        if let Some(cached) = self.cache.read().await.get(&identity) {
            return Ok(*cached);
        }

        // Held across the lookup: a concurrent assign/unassign must land
        // after this insert, never before it.
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.get(&identity) {
            return Ok(*cached);
        }
        let resolution = self.lookup(identity).await?;
        cache.insert(identity, resolution);
        Ok(resolution)
    }

    async fn lookup(&self, identity: Uuid) -> Result<PersonaResolution, AppError> {
        let persona = sqlx::query_scalar::<_, Persona>(
            "SELECT persona FROM persona_links WHERE identity_id = ?",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(persona.map_or(PersonaResolution::Unassigned, PersonaResolution::Assigned))
    }

    pub async fn assign(&self, identity: Uuid, persona: Persona) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO persona_links (identity_id, persona, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (identity_id)
            DO UPDATE SET
                persona = excluded.persona,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(identity)
        .bind(persona)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                AppError::NotFound
            } else {
                AppError::Database(e)
            }
        })?;

        self.cache
            .write()
            .await
            .insert(identity, PersonaResolution::Assigned(persona));
        tracing::info!(%identity, persona = persona.as_str(), "persona assigned");
        Ok(())
    }

    pub async fn unassign(&self, identity: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM persona_links WHERE identity_id = ?")
            .bind(identity)
            .execute(&self.pool)
            .await?;

        self.cache
            .write()
            .await
            .insert(identity, PersonaResolution::Unassigned);
        if result.rows_affected() > 0 {
            tracing::info!(%identity, "persona unassigned");
        }
        Ok(())
    }

    pub async fn list_links(&self) -> Result<Vec<PersonaLink>, AppError> {
        let links = sqlx::query_as::<_, PersonaLink>(
            "SELECT identity_id, persona, updated_at FROM persona_links ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    pub async fn handle_event(&self, event: AuthEvent) -> Result<(), AppError> {
        match event {
            AuthEvent::SignedOut(identity) => {
                self.cache.write().await.remove(&identity);
            }
            AuthEvent::SignedIn(identity) => {
                let resolution = self.lookup(identity).await?;
                self.cache.write().await.insert(identity, resolution);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    async fn is_cached(&self, identity: Uuid) -> bool {
        self.cache.read().await.contains_key(&identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IdentityService;
    use crate::db::test_pool;

    async fn setup() -> (PersonaRegistry, Uuid) {
        let pool = test_pool().await;
        let registry = PersonaRegistry::new(pool.clone());
        let identity = IdentityService::new(pool, registry.clone(), 1)
            .create_identity("ele@example.com", "segredo123")
            .await
            .unwrap();
        (registry, identity.id)
    }

    #[tokio::test]
    async fn unknown_identity_is_unassigned() {
        let (registry, _) = setup().await;
        let resolution = registry.resolve(Uuid::new_v4()).await.unwrap();
        assert_eq!(resolution, PersonaResolution::Unassigned);
        assert_eq!(resolution.persona(), None);
    }

    #[tokio::test]
    async fn assign_twice_keeps_one_link_with_latest_persona() {
        let (registry, identity) = setup().await;

        registry.assign(identity, Persona::Him).await.unwrap();
        registry.assign(identity, Persona::Her).await.unwrap();

        let links = registry.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].identity_id, identity);
        assert_eq!(links[0].persona, Persona::Her);
        assert_eq!(
            registry.resolve(identity).await.unwrap(),
            PersonaResolution::Assigned(Persona::Her)
        );
    }

    #[tokio::test]
    async fn assigning_unknown_identity_is_not_found() {
        let (registry, _) = setup().await;
        let result = registry.assign(Uuid::new_v4(), Persona::Him).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn unassign_is_idempotent() {
        let (registry, identity) = setup().await;

        registry.assign(identity, Persona::Him).await.unwrap();
        registry.unassign(identity).await.unwrap();
        registry.unassign(identity).await.unwrap();

        assert!(registry.list_links().await.unwrap().is_empty());
        assert_eq!(
            registry.resolve(identity).await.unwrap(),
            PersonaResolution::Unassigned
        );
    }

    #[tokio::test]
    async fn sign_out_drops_cached_resolution() {
        let (registry, identity) = setup().await;
        registry.assign(identity, Persona::Her).await.unwrap();
        assert!(registry.is_cached(identity).await);

        registry
            .handle_event(AuthEvent::SignedOut(identity))
            .await
            .unwrap();
        assert!(!registry.is_cached(identity).await);

        registry
            .handle_event(AuthEvent::SignedIn(identity))
            .await
            .unwrap();
        assert!(registry.is_cached(identity).await);
        assert_eq!(
            registry.resolve(identity).await.unwrap().persona(),
            Some(Persona::Her)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn resolve_racing_assign_never_caches_the_old_persona() {
        let (registry, identity) = setup().await;

        for _ in 0..50 {
            registry.unassign(identity).await.unwrap();
            registry
                .handle_event(AuthEvent::SignedOut(identity))
                .await
                .unwrap();

            let resolving = tokio::spawn({
                let registry = registry.clone();
                async move { registry.resolve(identity).await }
            });
            registry.assign(identity, Persona::Her).await.unwrap();
            resolving.await.unwrap().unwrap();

            assert_eq!(
                registry.resolve(identity).await.unwrap(),
                PersonaResolution::Assigned(Persona::Her)
            );
        }
    }

    #[test]
    fn resolution_serializes_with_status_tag() {
        let assigned = serde_json::to_value(PersonaResolution::Assigned(Persona::Him)).unwrap();
        assert_eq!(assigned, serde_json::json!({"status": "assigned", "persona": "him"}));
        let unassigned = serde_json::to_value(PersonaResolution::Unassigned).unwrap();
        assert_eq!(unassigned, serde_json::json!({"status": "unassigned"}));
    }
}
