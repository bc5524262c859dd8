use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the two fixed points of view every narrative is written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Him,
    Her,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::Him, Persona::Her];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Him => "him",
            Self::Her => "her",
        }
    }

    pub fn other(&self) -> Persona {
        match self {
            Self::Him => Self::Her,
            Self::Her => Self::Him,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CoverType {
    #[default]
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub cover_url: Option<String>,
    pub cover_type: CoverType,
    pub author_persona: Persona,
    pub is_published: bool,
    pub story_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoryMedia {
    pub id: Uuid,
    pub story_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub caption: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GalleryCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub position: i64,
    pub is_protected: bool,
    pub show_on_home: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GalleryMedia {
    pub id: Uuid,
    pub category_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub caption: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub identity_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PersonaLink {
    pub identity_id: Uuid,
    pub persona: Persona,
    pub updated_at: DateTime<Utc>,
}
