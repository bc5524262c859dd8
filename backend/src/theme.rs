//! Derives the CSS variables a page applies from the light/dark mode, the
//! couple profile and the persona of whoever is signed in.
//!
//! Dark mode always uses the fixed palette, so every persona variable is
//! removed there. In light mode a signed-in persona gets its own primary as
//! the accent, plus all four him/her reference colors so accents can point at
//! the other persona too.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Persona;
use crate::persona::PersonaRegistry;
use crate::profile::{CoupleProfile, get_profile};

pub const VAR_PRIMARY: &str = "--primary";
pub const VAR_HIM: &str = "--color-him";
pub const VAR_HIM_SECONDARY: &str = "--color-him-secondary";
pub const VAR_HER: &str = "--color-her";
pub const VAR_HER_SECONDARY: &str = "--color-her-secondary";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub couple: CoupleProfile,
    pub current_persona: Option<Persona>,
}

pub type ThemeVariables = BTreeMap<String, String>;

pub fn compute(state: &ThemeState) -> ThemeVariables {
    let mut vars = ThemeVariables::new();
    let (ThemeMode::Light, Some(persona)) = (state.mode, state.current_persona) else {
        return vars;
    };

    let couple = &state.couple;
    vars.insert(VAR_PRIMARY.to_string(), couple.primary(persona).to_string());
    for (side, (primary_var, secondary_var)) in Persona::ALL
        .into_iter()
        .zip([(VAR_HIM, VAR_HIM_SECONDARY), (VAR_HER, VAR_HER_SECONDARY)])
    {
        vars.insert(primary_var.to_string(), couple.primary(side).to_string());
        vars.insert(secondary_var.to_string(), couple.secondary(side).to_string());
    }
    vars
}

/// What has to change on the page to go from the previous variable set to
/// the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeDiff {
    pub set: BTreeMap<String, String>,
    pub removed: Vec<String>,
}

impl ThemeDiff {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.removed.is_empty()
    }
}

/// Tracks the variables currently applied so switching state reverts every
/// override it no longer wants.
#[derive(Debug, Default)]
pub struct ThemeEngine {
    applied: ThemeVariables,
}

impl ThemeEngine {
    #[cfg(test)]
    pub fn applied(&self) -> &ThemeVariables {
        &self.applied
    }

    pub fn apply(&mut self, state: &ThemeState) -> ThemeDiff {
        let next = compute(state);

        let removed = self
            .applied
            .keys()
            .filter(|key| !next.contains_key(*key))
            .cloned()
            .collect();
        let set = next
            .iter()
            .filter(|(key, value)| self.applied.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        self.applied = next;
        ThemeDiff { set, removed }
    }
}

/// Everything a themed view needs, loaded once per request.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeContext {
    pub mode: ThemeMode,
    pub couple: CoupleProfile,
    pub persona: Option<Persona>,
    pub variables: ThemeVariables,
}

impl ThemeContext {
    /// `mode` overrides the viewer's stored preference when given.
    pub async fn load(
        pool: &SqlitePool,
        registry: &PersonaRegistry,
        viewer: Option<Uuid>,
        mode: Option<ThemeMode>,
    ) -> Result<Self, AppError> {
        let couple = get_profile(pool).await?;

        let (persona, stored_mode) = match viewer {
            Some(identity) => (
                registry.resolve(identity).await?.persona(),
                get_mode(pool, identity).await?,
            ),
            None => (None, ThemeMode::default()),
        };

        let state = ThemeState {
            mode: mode.unwrap_or(stored_mode),
            couple,
            current_persona: persona,
        };
        Ok(Self::from_state(state))
    }

    pub fn state(&self) -> ThemeState {
        ThemeState {
            mode: self.mode,
            couple: self.couple.clone(),
            current_persona: self.persona,
        }
    }

    pub fn from_state(state: ThemeState) -> Self {
        let variables = compute(&state);
        Self {
            mode: state.mode,
            couple: state.couple,
            persona: state.current_persona,
            variables,
        }
    }
}

pub async fn get_mode(pool: &SqlitePool, identity: Uuid) -> Result<ThemeMode, AppError> {
    let mode = sqlx::query_scalar::<_, ThemeMode>(
        "SELECT mode FROM theme_preferences WHERE identity_id = ?",
    )
    .bind(identity)
    .fetch_optional(pool)
    .await?;
    Ok(mode.unwrap_or_default())
}

pub async fn set_mode(pool: &SqlitePool, identity: Uuid, mode: ThemeMode) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO theme_preferences (identity_id, mode)
        VALUES (?, ?)
        ON CONFLICT (identity_id)
        DO UPDATE SET mode = excluded.mode
        "#,
    )
    .bind(identity)
    .bind(mode)
    .execute(pool)
    .await?;
    Ok(())
}
