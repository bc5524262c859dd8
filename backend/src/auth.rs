use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Identity, Session};
use crate::persona::{AuthEvent, PersonaRegistry};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentitySummary {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            created_at: identity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub identity_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Email/password identities and their sessions.
#[derive(Clone)]
pub struct IdentityService {
    pool: SqlitePool,
    registry: PersonaRegistry,
    events: broadcast::Sender<AuthEvent>,
    session_ttl: Duration,
}

impl IdentityService {
    pub fn new(pool: SqlitePool, registry: PersonaRegistry, session_ttl_hours: i64) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            pool,
            registry,
            events,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    // Registry first so persona-dependent readers never see a stale resolution.
    async fn publish(&self, event: AuthEvent) -> Result<(), AppError> {
        self.registry.handle_event(event).await?;
        let _ = self.events.send(event);
        Ok(())
    }

    pub async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let email = validate_credentials(email, password)?;

        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM identities WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::validation("Email já cadastrado"));
        }

        let identity = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(hash_password(password))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(identity = %identity.id, "identity created");
        Ok(identity)
    }

    /// Creates the configured admin account when it does not exist yet.
    pub async fn ensure_identity(&self, email: &str, password: &str) -> Result<(), AppError> {
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM identities WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_none() {
            self.create_identity(email, password).await?;
        }
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AppError> {
        let email = validate_credentials(email, password)?;

        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, created_at FROM identities WHERE email = ?",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?
        .filter(|identity| verify_password(password, &identity.password_hash))
        .ok_or_else(|| {
            tracing::warn!("sign-in rejected");
            AppError::InvalidCredentials
        })?;

        let now = Utc::now();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, identity_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING token, identity_id, created_at, expires_at
            "#,
        )
        .bind(new_token())
        .bind(identity.id)
        .bind(now)
        .bind(now + self.session_ttl)
        .fetch_one(&self.pool)
        .await?;

        self.publish(AuthEvent::SignedIn(identity.id)).await?;
        tracing::info!(identity = %identity.id, "signed in");

        Ok(SignedIn {
            token: session.token,
            identity_id: session.identity_id,
            expires_at: session.expires_at,
        })
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        let identity = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM sessions WHERE token = ? RETURNING identity_id",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(identity) = identity {
            self.publish(AuthEvent::SignedOut(identity)).await?;
            tracing::info!(%identity, "signed out");
        }
        Ok(())
    }

    /// The identity behind a live session token, if any.
    pub async fn session_identity(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, identity_id, created_at, expires_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(&session.token)
                .execute(&self.pool)
                .await?;
            self.publish(AuthEvent::SignedOut(session.identity_id)).await?;
            return Ok(None);
        }

        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, created_at FROM identities WHERE id = ?",
        )
        .bind(session.identity_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    pub async fn list_identities(&self) -> Result<Vec<IdentitySummary>, AppError> {
        let identities = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, created_at FROM identities ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(identities.into_iter().map(Into::into).collect())
    }
}

/// Checks the sign-in form before anything touches the database and
/// returns the normalised email.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Email inválido"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Senha deve ter pelo menos 6 caracteres",
        ));
    }
    Ok(email)
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), digest(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let actual = digest(&salt, password);
    // Compare every byte so timing does not leak the matching prefix.
    actual.len() == expected.len()
        && actual
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
