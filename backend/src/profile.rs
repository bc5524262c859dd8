use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::color::{normalize_color, stored_to_hex};
use crate::error::AppError;
use crate::models::Persona;
use crate::settings::{get_settings, set_setting};

const NAME_HIM: &str = "name_him";
const NAME_HER: &str = "name_her";
const PRIMARY_HIM: &str = "primary_him";
const SECONDARY_HIM: &str = "secondary_him";
const PRIMARY_HER: &str = "primary_her";
const SECONDARY_HER: &str = "secondary_her";

const PROFILE_KEYS: [&str; 6] = [
    NAME_HIM,
    NAME_HER,
    PRIMARY_HIM,
    SECONDARY_HIM,
    PRIMARY_HER,
    SECONDARY_HER,
];

/// Names and color pairs of the two personas. Colors are HSL triples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoupleProfile {
    pub name_him: String,
    pub name_her: String,
    pub primary_him: String,
    pub secondary_him: String,
    pub primary_her: String,
    pub secondary_her: String,
}

impl Default for CoupleProfile {
    fn default() -> Self {
        Self {
            name_him: "Ele".to_string(),
            name_her: "Ela".to_string(),
            primary_him: "220 70% 50%".to_string(),
            secondary_him: "220 60% 70%".to_string(),
            primary_her: "340 80% 55%".to_string(),
            secondary_her: "340 70% 75%".to_string(),
        }
    }
}

impl CoupleProfile {
    pub fn name(&self, persona: Persona) -> &str {
        match persona {
            Persona::Him => &self.name_him,
            Persona::Her => &self.name_her,
        }
    }

    pub fn primary(&self, persona: Persona) -> &str {
        match persona {
            Persona::Him => &self.primary_him,
            Persona::Her => &self.primary_her,
        }
    }

    pub fn secondary(&self, persona: Persona) -> &str {
        match persona {
            Persona::Him => &self.secondary_him,
            Persona::Her => &self.secondary_her,
        }
    }
}

/// The profile colors as the editor shows them. `None` when a stored value
/// no longer parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileHex {
    pub primary_him: Option<String>,
    pub secondary_him: Option<String>,
    pub primary_her: Option<String>,
    pub secondary_her: Option<String>,
}

impl CoupleProfile {
    pub fn hex(&self) -> ProfileHex {
        ProfileHex {
            primary_him: stored_to_hex(self.primary(Persona::Him)),
            secondary_him: stored_to_hex(self.secondary(Persona::Him)),
            primary_her: stored_to_hex(self.primary(Persona::Her)),
            secondary_her: stored_to_hex(self.secondary(Persona::Her)),
        }
    }
}

/// Partial profile edit. Colors may be hex or HSL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name_him: Option<String>,
    pub name_her: Option<String>,
    pub primary_him: Option<String>,
    pub secondary_him: Option<String>,
    pub primary_her: Option<String>,
    pub secondary_her: Option<String>,
}

impl ProfileUpdate {
    fn into_pairs(self) -> Result<Vec<(&'static str, String)>, AppError> {
        let mut pairs = Vec::new();

        for (key, name) in [(NAME_HIM, self.name_him), (NAME_HER, self.name_her)] {
            if let Some(name) = name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("O nome não pode ficar vazio"));
                }
                pairs.push((key, name.to_string()));
            }
        }

        for (key, color) in [
            (PRIMARY_HIM, self.primary_him),
            (SECONDARY_HIM, self.secondary_him),
            (PRIMARY_HER, self.primary_her),
            (SECONDARY_HER, self.secondary_her),
        ] {
            if let Some(color) = color {
                pairs.push((key, normalize_color(&color)?));
            }
        }

        Ok(pairs)
    }
}

pub async fn get_profile(pool: &SqlitePool) -> Result<CoupleProfile, AppError> {
    let stored = get_settings(pool, &PROFILE_KEYS).await?;
    let defaults = CoupleProfile::default();

    let pick = |key: &str, fallback: String| {
        stored
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or(fallback)
    };

    Ok(CoupleProfile {
        name_him: pick(NAME_HIM, defaults.name_him),
        name_her: pick(NAME_HER, defaults.name_her),
        primary_him: pick(PRIMARY_HIM, defaults.primary_him),
        secondary_him: pick(SECONDARY_HIM, defaults.secondary_him),
        primary_her: pick(PRIMARY_HER, defaults.primary_her),
        secondary_her: pick(SECONDARY_HER, defaults.secondary_her),
    })
}

/// Writes only the fields present in `update`, then returns the merged
/// profile.
pub async fn save_profile(
    pool: &SqlitePool,
    update: ProfileUpdate,
) -> Result<CoupleProfile, AppError> {
    let pairs = update.into_pairs()?;

    let mut tx = pool.begin().await?;
    for (key, value) in &pairs {
        set_setting(&mut *tx, key, value).await?;
    }
    tx.commit().await?;

    tracing::info!(fields = pairs.len(), "couple profile saved");
    get_profile(pool).await
}
