//! Two-sided narratives. Every story and the "our story" page carry one
//! block per persona; a missing block is a normal state that renders as a
//! placeholder.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Persona;

pub const OUR_STORY_SLUG: &str = "nossa-historia";
pub const OUR_STORY_TITLE: &str = "Nossa História";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOwner {
    Story(Uuid),
    Page(String),
}

impl ContentOwner {
    pub fn our_story() -> Self {
        Self::Page(OUR_STORY_SLUG.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPair {
    pub him: Option<String>,
    pub her: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub persona: Persona,
    pub text: String,
    pub is_placeholder: bool,
}

pub fn placeholder(persona: Persona) -> &'static str {
    match persona {
        Persona::Him => "A versão dele ainda não foi escrita...",
        Persona::Her => "A versão dela ainda não foi escrita...",
    }
}

impl ContentPair {
    pub fn new(him: Option<String>, her: Option<String>) -> Self {
        Self { him, her }
    }

    pub fn get(&self, persona: Persona) -> Option<&str> {
        match persona {
            Persona::Him => self.him.as_deref(),
            Persona::Her => self.her.as_deref(),
        }
    }

    fn set(&mut self, persona: Persona, content: Option<String>) {
        match persona {
            Persona::Him => self.him = content,
            Persona::Her => self.her = content,
        }
    }

    pub fn render(&self, persona: Persona) -> Narrative {
        match self.get(persona).filter(|text| !text.trim().is_empty()) {
            Some(text) => Narrative {
                persona,
                text: text.to_string(),
                is_placeholder: false,
            },
            None => Narrative {
                persona,
                text: placeholder(persona).to_string(),
                is_placeholder: true,
            },
        }
    }
}

/// Which half of a pair a reader is looking at. Pure view state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSelection {
    pub selected: Persona,
}

impl PersonaSelection {
    pub fn select(&mut self, persona: Persona) {
        self.selected = persona;
    }

    pub fn toggle(&mut self) {
        self.selected = self.selected.other();
    }

    pub fn render(&self, pair: &ContentPair) -> Narrative {
        pair.render(self.selected)
    }
}

pub async fn get_content_pair(
    pool: &SqlitePool,
    owner: &ContentOwner,
) -> Result<ContentPair, AppError> {
    match owner {
        ContentOwner::Story(story_id) => {
            let rows = sqlx::query_as::<_, (Persona, Option<String>)>(
                "SELECT persona, content FROM story_versions WHERE story_id = ?",
            )
            .bind(story_id)
            .fetch_all(pool)
            .await?;

            let mut pair = ContentPair::default();
            for (persona, content) in rows {
                pair.set(persona, content);
            }
            Ok(pair)
        }
        ContentOwner::Page(slug) => {
            let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
                "SELECT content_him, content_her FROM pages WHERE slug = ?",
            )
            .bind(slug)
            .fetch_optional(pool)
            .await?;

            Ok(row
                .map(|(him, her)| ContentPair::new(him, her))
                .unwrap_or_default())
        }
    }
}

/// Replaces both halves at once. Callers changing one side resupply the other.
pub async fn save_content_pair(
    pool: &SqlitePool,
    owner: &ContentOwner,
    pair: &ContentPair,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    match owner {
        ContentOwner::Story(story_id) => {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories WHERE id = ?")
                .bind(story_id)
                .fetch_one(&mut *tx)
                .await?;
            if exists == 0 {
                return Err(AppError::NotFound);
            }
            replace_story_versions(&mut *tx, *story_id, pair).await?;
        }
        ContentOwner::Page(slug) => {
            let title = if slug == OUR_STORY_SLUG {
                OUR_STORY_TITLE
            } else {
                slug.as_str()
            };
            sqlx::query(
                r#"
                INSERT INTO pages (slug, title, content_him, content_her, updated_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (slug)
                DO UPDATE SET
                    title = excluded.title,
                    content_him = excluded.content_him,
                    content_her = excluded.content_her,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(slug)
            .bind(title)
            .bind(&pair.him)
            .bind(&pair.her)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::debug!(?owner, "content pair saved");
    Ok(())
}

// Upsert keyed on (story_id, persona): the owner always has both rows, so a
// concurrent reader never sees an empty pair mid-save.
pub(crate) async fn replace_story_versions(
    conn: &mut SqliteConnection,
    story_id: Uuid,
    pair: &ContentPair,
) -> Result<(), AppError> {
    let now = Utc::now();
    for persona in Persona::ALL {
        sqlx::query(
            r#"
            INSERT INTO story_versions (story_id, persona, content, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (story_id, persona)
            DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(story_id)
        .bind(persona)
        .bind(pair.get(persona))
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn insert_story(pool: &SqlitePool) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO stories (id, title, author_persona, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind("Viagem")
        .bind(Persona::Him)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    fn pair(him: Option<&str>, her: Option<&str>) -> ContentPair {
        ContentPair::new(him.map(str::to_string), her.map(str::to_string))
    }

    #[test]
    fn blank_half_renders_placeholder() {
        let content = pair(Some("Foi incrível"), Some("   "));
        let him = content.render(Persona::Him);
        assert_eq!(him.text, "Foi incrível");
        assert!(!him.is_placeholder);

        let her = content.render(Persona::Her);
        assert!(her.is_placeholder);
        assert_eq!(her.text, "A versão dela ainda não foi escrita...");

        let empty = ContentPair::default().render(Persona::Him);
        assert_eq!(empty.text, placeholder(Persona::Him));
    }

    #[test]
    fn selection_defaults_to_him_and_toggles() {
        let content = pair(Some("dele"), Some("dela"));
        let mut selection = PersonaSelection::default();
        assert_eq!(selection.render(&content).text, "dele");

        selection.toggle();
        assert_eq!(selection.selected, Persona::Her);
        assert_eq!(selection.render(&content).text, "dela");

        selection.select(Persona::Him);
        assert_eq!(selection.render(&content).text, "dele");
    }

    #[tokio::test]
    async fn story_pair_is_fully_superseded() {
        let pool = test_pool().await;
        let story = insert_story(&pool).await;
        let owner = ContentOwner::Story(story);

        save_content_pair(&pool, &owner, &pair(Some("primeira"), Some("first")))
            .await
            .unwrap();
        save_content_pair(&pool, &owner, &pair(None, Some("segunda")))
            .await
            .unwrap();

        assert_eq!(
            get_content_pair(&pool, &owner).await.unwrap(),
            pair(None, Some("segunda"))
        );

        let rows = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM story_versions WHERE story_id = ?",
        )
        .bind(story)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn saving_for_missing_story_is_not_found() {
        let pool = test_pool().await;
        let result = save_content_pair(
            &pool,
            &ContentOwner::Story(Uuid::new_v4()),
            &ContentPair::default(),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn our_story_page_upserts_by_slug() {
        let pool = test_pool().await;
        let owner = ContentOwner::our_story();
        assert_eq!(
            get_content_pair(&pool, &owner).await.unwrap(),
            ContentPair::default()
        );

        save_content_pair(&pool, &owner, &pair(Some("a"), Some("b")))
            .await
            .unwrap();
        save_content_pair(&pool, &owner, &pair(Some("c"), None))
            .await
            .unwrap();

        assert_eq!(
            get_content_pair(&pool, &owner).await.unwrap(),
            pair(Some("c"), None)
        );
        let (count, title) = sqlx::query_as::<_, (i64, String)>(
            "SELECT COUNT(*), MAX(title) FROM pages WHERE slug = ?",
        )
        .bind(OUR_STORY_SLUG)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, OUR_STORY_TITLE);
    }
}
