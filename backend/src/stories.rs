use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::content::{ContentOwner, ContentPair, get_content_pair, replace_story_versions};
use crate::error::AppError;
use crate::gallery::{append_media, story_mirror_category};
use crate::models::{CoverType, MediaType, Persona, Story, StoryMedia};
use crate::params::{SortDirection, StoryParams, StorySort};

const STORY_COLUMNS: &str = "id, title, cover_url, cover_type, author_persona, is_published, story_date, location, created_at, updated_at";
const MEDIA_COLUMNS: &str = "id, story_id, url, media_type, caption, position, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoryStatus {
    #[serde(rename = "Rascunho")]
    Draft,
    #[serde(rename = "Publicado")]
    Published,
}

impl StoryStatus {
    pub fn of(story: &Story) -> Self {
        if story.is_published {
            Self::Published
        } else {
            Self::Draft
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Rascunho",
            Self::Published => "Publicado",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryListItem {
    #[serde(flatten)]
    pub story: Story,
    pub status: StoryStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryDetail {
    #[serde(flatten)]
    pub story: Story,
    pub status: StoryStatus,
    pub content: ContentPair,
    pub media: Vec<StoryMedia>,
}

/// Media uploaded during this edit and not yet attached to the story.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedia {
    pub url: String,
    pub media_type: MediaType,
    pub caption: Option<String>,
}

/// How the media list changes on save. `keep` is the surviving existing
/// media in display order; `added` is appended after it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaChanges {
    #[serde(default)]
    pub keep: Vec<Uuid>,
    #[serde(default)]
    pub added: Vec<NewMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryInput {
    pub title: String,
    pub author_persona: Option<Persona>,
    #[serde(default)]
    pub is_published: bool,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub cover_type: CoverType,
    pub story_date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(default)]
    pub content: ContentPair,
    #[serde(default)]
    pub media: MediaChanges,
}

struct ValidStory<'a> {
    title: &'a str,
    author: Persona,
    location: Option<&'a str>,
    cover_url: Option<&'a str>,
}

impl StoryInput {
    fn validate(&self) -> Result<ValidStory<'_>, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Título obrigatório"));
        }
        let author = self
            .author_persona
            .ok_or_else(|| AppError::validation("Escolha quem está contando a história"))?;
        if self.media.added.iter().any(|m| m.url.trim().is_empty()) {
            return Err(AppError::validation("A URL da mídia é obrigatória"));
        }
        Ok(ValidStory {
            title,
            author,
            location: blank_to_none(self.location.as_deref()),
            cover_url: blank_to_none(self.cover_url.as_deref()),
        })
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn create_story(pool: &SqlitePool, input: StoryInput) -> Result<StoryDetail, AppError> {
    let valid = input.validate()?;
    if !input.media.keep.is_empty() {
        return Err(AppError::validation("Uma história nova não tem mídias existentes"));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO stories (
            id,
            title,
            cover_url,
            cover_type,
            author_persona,
            is_published,
            story_date,
            location,
            created_at,
            updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(valid.title)
    .bind(valid.cover_url)
    .bind(input.cover_type)
    .bind(valid.author)
    .bind(input.is_published)
    .bind(input.story_date)
    .bind(valid.location)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    replace_story_versions(&mut *tx, id, &input.content).await?;
    attach_new_media(&mut *tx, id, valid.title, 0, &input.media.added).await?;

    tx.commit().await?;
    tracing::info!(story = %id, published = input.is_published, "story created");
    get_story(pool, id).await
}

pub async fn update_story(
    pool: &SqlitePool,
    id: Uuid,
    input: StoryInput,
) -> Result<StoryDetail, AppError> {
    let valid = input.validate()?;
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE
            stories
        SET
            title = ?,
            cover_url = ?,
            cover_type = ?,
            author_persona = ?,
            is_published = ?,
            story_date = ?,
            location = ?,
            updated_at = ?
        WHERE
            id = ?
        "#,
    )
    .bind(valid.title)
    .bind(valid.cover_url)
    .bind(input.cover_type)
    .bind(valid.author)
    .bind(input.is_published)
    .bind(input.story_date)
    .bind(valid.location)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    replace_story_versions(&mut *tx, id, &input.content).await?;

    let existing: HashSet<Uuid> =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM story_media WHERE story_id = ?")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    let keep = &input.media.keep;
    if let Some(unknown) = keep.iter().find(|media_id| !existing.contains(*media_id)) {
        return Err(AppError::validation(format!(
            "Mídia {} não pertence a esta história",
            unknown
        )));
    }
    let kept: HashSet<&Uuid> = keep.iter().collect();
    if kept.len() != keep.len() {
        return Err(AppError::validation("Mídia repetida na lista"));
    }

    for removed in existing.iter().filter(|media_id| !kept.contains(media_id)) {
        sqlx::query("DELETE FROM story_media WHERE id = ?")
            .bind(removed)
            .execute(&mut *tx)
            .await?;
    }
    for (position, media_id) in keep.iter().enumerate() {
        sqlx::query("UPDATE story_media SET position = ? WHERE id = ?")
            .bind(position as i64)
            .bind(media_id)
            .execute(&mut *tx)
            .await?;
    }

    attach_new_media(&mut *tx, id, valid.title, keep.len() as i64, &input.media.added).await?;

    tx.commit().await?;
    tracing::info!(
        story = %id,
        kept = keep.len(),
        added = input.media.added.len(),
        "story updated"
    );
    get_story(pool, id).await
}

// New media goes to the story and, one way only, to the reserved gallery
// category. Gallery copies are never touched again by story edits.
async fn attach_new_media(
    conn: &mut SqliteConnection,
    story_id: Uuid,
    title: &str,
    first_position: i64,
    added: &[NewMedia],
) -> Result<(), AppError> {
    if added.is_empty() {
        return Ok(());
    }

    let mirror = story_mirror_category(&mut *conn).await?;
    if mirror.is_none() {
        tracing::warn!("story mirror category missing, new media stays on the story only");
    }

    let now = Utc::now();
    for (offset, media) in added.iter().enumerate() {
        let url = media.url.trim();
        let caption = media.caption.as_deref().filter(|c| !c.trim().is_empty());

        sqlx::query(
            r#"
            INSERT INTO story_media (id, story_id, url, media_type, caption, position, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(story_id)
        .bind(url)
        .bind(media.media_type)
        .bind(caption)
        .bind(first_position + offset as i64)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if let Some(category_id) = mirror {
            append_media(
                &mut *conn,
                category_id,
                url,
                media.media_type,
                Some(caption.unwrap_or(title)),
            )
            .await?;
        }
    }
    Ok(())
}

async fn fetch_story(pool: &SqlitePool, id: Uuid) -> Result<Option<Story>, AppError> {
    let query = format!("SELECT {} FROM stories WHERE id = ?", STORY_COLUMNS);
    let story = sqlx::query_as::<_, Story>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(story)
}

async fn detail(pool: &SqlitePool, story: Story) -> Result<StoryDetail, AppError> {
    let content = get_content_pair(pool, &ContentOwner::Story(story.id)).await?;
    let media = list_story_media(pool, story.id).await?;
    Ok(StoryDetail {
        status: StoryStatus::of(&story),
        story,
        content,
        media,
    })
}

/// Admin view, drafts included.
pub async fn get_story(pool: &SqlitePool, id: Uuid) -> Result<StoryDetail, AppError> {
    let story = fetch_story(pool, id).await?.ok_or(AppError::NotFound)?;
    detail(pool, story).await
}

/// Public view. Drafts are indistinguishable from missing stories.
pub async fn get_published(pool: &SqlitePool, id: Uuid) -> Result<StoryDetail, AppError> {
    let story = fetch_story(pool, id)
        .await?
        .filter(|story| story.is_published)
        .ok_or(AppError::NotFound)?;
    detail(pool, story).await
}

pub async fn list_story_media(pool: &SqlitePool, story_id: Uuid) -> Result<Vec<StoryMedia>, AppError> {
    let query = format!(
        "SELECT {} FROM story_media WHERE story_id = ? ORDER BY position ASC",
        MEDIA_COLUMNS
    );
    let media = sqlx::query_as::<_, StoryMedia>(&query)
        .bind(story_id)
        .fetch_all(pool)
        .await?;
    Ok(media)
}

pub async fn list_admin(pool: &SqlitePool) -> Result<Vec<StoryListItem>, AppError> {
    let query = format!(
        "SELECT {} FROM stories ORDER BY created_at DESC",
        STORY_COLUMNS
    );
    let stories = sqlx::query_as::<_, Story>(&query).fetch_all(pool).await?;
    Ok(stories
        .into_iter()
        .map(|story| StoryListItem {
            status: StoryStatus::of(&story),
            story,
        })
        .collect())
}

/// `LIKE` pattern matching `needle` literally anywhere in the column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_published(pool: &SqlitePool, params: &StoryParams) -> Result<Vec<Story>, AppError> {
    let from = params.from_date()?;
    let to = params.to_date()?;

    let (column, default_direction) = match params.base.sort() {
        Some(StorySort::Title) => ("title COLLATE NOCASE", SortDirection::Asc),
        _ => ("created_at", SortDirection::Desc),
    };
    let direction = params.base.sort_by().unwrap_or(default_direction).to_sql();

    let search_pattern = params.base.search().map(contains_pattern);
    let location_pattern = params.location().map(contains_pattern);

    let query = format!(
        r#"SELECT
            {}
        FROM
            stories
        WHERE
            is_published = 1
        AND
            (? IS NULL OR title LIKE ? ESCAPE '\')
        AND
            (? IS NULL OR location LIKE ? ESCAPE '\')
        AND
            (? IS NULL OR COALESCE(story_date, substr(created_at, 1, 10)) >= ?)
        AND
            (? IS NULL OR COALESCE(story_date, substr(created_at, 1, 10)) <= ?)
        ORDER BY
            {} {}
        LIMIT ? OFFSET ?"#,
        STORY_COLUMNS, column, direction
    );

    let stories = sqlx::query_as::<_, Story>(&query)
        .bind(&search_pattern)
        .bind(&search_pattern)
        .bind(&location_pattern)
        .bind(&location_pattern)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .bind(params.base.limit())
        .bind(params.base.offset())
        .fetch_all(pool)
        .await?;
    Ok(stories)
}

pub async fn set_published(pool: &SqlitePool, id: Uuid, published: bool) -> Result<Story, AppError> {
    let query = format!(
        "UPDATE stories SET is_published = ?, updated_at = ? WHERE id = ? RETURNING {}",
        STORY_COLUMNS
    );
    let story = sqlx::query_as::<_, Story>(&query)
        .bind(published)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(story = %id, status = StoryStatus::of(&story).label(), "publication changed");
    Ok(story)
}

pub async fn toggle_published(pool: &SqlitePool, id: Uuid) -> Result<Story, AppError> {
    let story = fetch_story(pool, id).await?.ok_or(AppError::NotFound)?;
    set_published(pool, id, !story.is_published).await
}

/// Deletes the story, its narratives and its media. Gallery copies stay.
pub async fn delete_story(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM story_media WHERE story_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM story_versions WHERE story_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM stories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tx.commit().await?;
    tracing::info!(story = %id, "story deleted");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoryCounts {
    pub total: i64,
    pub published: i64,
}

pub async fn counts(pool: &SqlitePool) -> Result<StoryCounts, AppError> {
    let (total, published) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(is_published), 0) FROM stories",
    )
    .fetch_one(pool)
    .await?;
    Ok(StoryCounts { total, published })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::gallery::{MediaScope, STORY_MIRROR_SLUG, list_categories, list_media};

    fn input(title: &str) -> StoryInput {
        StoryInput {
            title: title.to_string(),
            author_persona: Some(Persona::Him),
            is_published: false,
            cover_url: None,
            cover_type: CoverType::Image,
            story_date: None,
            location: None,
            content: ContentPair::new(Some("dele".to_string()), Some("dela".to_string())),
            media: MediaChanges::default(),
        }
    }

    fn image(url: &str) -> NewMedia {
        NewMedia {
            url: url.to_string(),
            media_type: MediaType::Image,
            caption: None,
        }
    }

    async fn mirror_media(pool: &SqlitePool) -> Vec<crate::models::GalleryMedia> {
        let mirror = list_categories(pool, Default::default())
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.slug == STORY_MIRROR_SLUG)
            .unwrap();
        list_media(pool, MediaScope::Category(mirror.id)).await.unwrap()
    }

    #[tokio::test]
    async fn draft_then_publish_moves_into_public_feed() {
        let pool = test_pool().await;
        let created = create_story(&pool, input("Trip")).await.unwrap();
        assert_eq!(created.status, StoryStatus::Draft);

        let admin = list_admin(&pool).await.unwrap();
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].status.label(), "Rascunho");
        assert!(list_published(&pool, &StoryParams::default()).await.unwrap().is_empty());
        assert!(matches!(
            get_published(&pool, created.story.id).await,
            Err(AppError::NotFound)
        ));

        let toggled = toggle_published(&pool, created.story.id).await.unwrap();
        assert!(toggled.is_published);
        assert_eq!(list_admin(&pool).await.unwrap()[0].status.label(), "Publicado");

        let feed = list_published(&pool, &StoryParams::default()).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "Trip");
        let public = get_published(&pool, created.story.id).await.unwrap();
        assert_eq!(public.content.him.as_deref(), Some("dele"));
    }

    #[tokio::test]
    async fn status_serializes_as_badge() {
        assert_eq!(
            serde_json::to_value(StoryStatus::Draft).unwrap(),
            serde_json::json!("Rascunho")
        );
        assert_eq!(
            serde_json::to_value(StoryStatus::Published).unwrap(),
            serde_json::json!("Publicado")
        );
    }

    #[tokio::test]
    async fn validation_happens_before_any_write() {
        let pool = test_pool().await;
        let mut untitled = input("   ");
        untitled.author_persona = Some(Persona::Her);
        assert!(matches!(
            create_story(&pool, untitled).await,
            Err(AppError::Validation(_))
        ));

        let mut authorless = input("Trip");
        authorless.author_persona = None;
        assert!(matches!(
            create_story(&pool, authorless).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(counts(&pool).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn new_media_is_mirrored_once() {
        let pool = test_pool().await;
        let mut first = input("Praia");
        first.is_published = true;
        let story = create_story(&pool, first).await.unwrap();
        assert!(mirror_media(&pool).await.is_empty());

        let mut edit = input("Praia");
        edit.is_published = true;
        edit.media.added = vec![image("https://cdn/praia.jpg")];
        let edited = update_story(&pool, story.story.id, edit).await.unwrap();
        assert_eq!(edited.media.len(), 1);
        assert_eq!(edited.media[0].url, "https://cdn/praia.jpg");

        let mirrored = mirror_media(&pool).await;
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].url, "https://cdn/praia.jpg");
        assert_eq!(mirrored[0].caption.as_deref(), Some("Praia"));

        let mut resave = input("Praia");
        resave.is_published = true;
        resave.media.keep = vec![edited.media[0].id];
        let resaved = update_story(&pool, story.story.id, resave).await.unwrap();
        assert_eq!(resaved.media.len(), 1);
        assert_eq!(mirror_media(&pool).await.len(), 1);
    }

    #[tokio::test]
    async fn media_on_new_story_is_mirrored_with_own_caption() {
        let pool = test_pool().await;
        let mut new = input("Viagem");
        new.media.added = vec![
            image("https://cdn/1.jpg"),
            NewMedia {
                url: "https://cdn/2.mp4".to_string(),
                media_type: MediaType::Video,
                caption: Some("Chegada".to_string()),
            },
        ];
        let story = create_story(&pool, new).await.unwrap();
        let positions: Vec<_> = story.media.iter().map(|m| m.position).collect();
        assert_eq!(positions, [0, 1]);

        let mirrored = mirror_media(&pool).await;
        assert_eq!(mirrored.len(), 2);
        assert_eq!(mirrored[0].caption.as_deref(), Some("Viagem"));
        assert_eq!(mirrored[1].caption.as_deref(), Some("Chegada"));
        assert_eq!(mirrored[1].media_type, MediaType::Video);
    }

    #[tokio::test]
    async fn removing_and_reordering_media_only_touches_the_story() {
        let pool = test_pool().await;
        let mut new = input("Viagem");
        new.media.added = vec![image("a"), image("b"), image("c")];
        let story = create_story(&pool, new).await.unwrap();
        let ids: Vec<_> = story.media.iter().map(|m| m.id).collect();

        let mut edit = input("Viagem");
        edit.media.keep = vec![ids[2], ids[0]];
        edit.media.added = vec![image("d")];
        let edited = update_story(&pool, story.story.id, edit).await.unwrap();

        let urls: Vec<_> = edited.media.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, ["c", "a", "d"]);
        let positions: Vec<_> = edited.media.iter().map(|m| m.position).collect();
        assert_eq!(positions, [0, 1, 2]);
        assert_eq!(mirror_media(&pool).await.len(), 4);

        let mut bogus = input("Viagem");
        bogus.media.keep = vec![Uuid::new_v4()];
        assert!(matches!(
            update_story(&pool, story.story.id, bogus).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(list_story_media(&pool, story.story.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_cascades_but_keeps_gallery_copies() {
        let pool = test_pool().await;
        let mut new = input("Viagem");
        new.media.added = vec![image("a")];
        let story = create_story(&pool, new).await.unwrap();

        delete_story(&pool, story.story.id).await.unwrap();

        assert!(matches!(
            get_story(&pool, story.story.id).await,
            Err(AppError::NotFound)
        ));
        assert!(list_story_media(&pool, story.story.id).await.unwrap().is_empty());
        assert_eq!(
            get_content_pair(&pool, &ContentOwner::Story(story.story.id))
                .await
                .unwrap(),
            ContentPair::default()
        );
        assert_eq!(mirror_media(&pool).await.len(), 1);
        assert!(matches!(
            delete_story(&pool, story.story.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn public_feed_filters() {
        let pool = test_pool().await;
        for (title, date, location) in [
            ("Lisboa no inverno", "2023-12-20", "Lisboa"),
            ("Praia", "2024-02-10", "Ubatuba"),
            ("Aniversário", "2024-06-01", "São Paulo"),
        ] {
            let mut story = input(title);
            story.is_published = true;
            story.story_date = Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
            story.location = Some(location.to_string());
            create_story(&pool, story).await.unwrap();
        }
        create_story(&pool, input("Rascunho secreto")).await.unwrap();

        let titles = |stories: Vec<Story>| -> Vec<String> {
            let mut titles: Vec<_> = stories.into_iter().map(|s| s.title).collect();
            titles.sort();
            titles
        };

        let all = list_published(&pool, &StoryParams::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let search = StoryParams {
            base: crate::params::SearchParams {
                search: Some("praia".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(titles(list_published(&pool, &search).await.unwrap()), ["Praia"]);

        let range = StoryParams {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(list_published(&pool, &range).await.unwrap()), ["Praia"]);

        let place = StoryParams {
            location: Some("lisboa".to_string()),
            ..Default::default()
        };
        assert_eq!(
            titles(list_published(&pool, &place).await.unwrap()),
            ["Lisboa no inverno"]
        );

        let counts = counts(&pool).await.unwrap();
        assert_eq!(counts, StoryCounts { total: 4, published: 3 });
    }

    #[tokio::test]
    async fn search_treats_like_wildcards_literally() {
        let pool = test_pool().await;
        for (title, location) in [
            ("Praia", "Ubatuba"),
            ("Serra", "Campos_do_Jordão"),
            ("100% nós", "Lisboa"),
        ] {
            let mut story = input(title);
            story.is_published = true;
            story.location = Some(location.to_string());
            create_story(&pool, story).await.unwrap();
        }

        let search = |term: &str| StoryParams {
            base: crate::params::SearchParams {
                search: Some(term.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(list_published(&pool, &search("_")).await.unwrap().is_empty());
        assert!(list_published(&pool, &search("\\")).await.unwrap().is_empty());
        let percent = list_published(&pool, &search("%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].title, "100% nós");

        let place = StoryParams {
            location: Some("_do_".to_string()),
            ..Default::default()
        };
        let found = list_published(&pool, &place).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Serra");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("a_b%c\\d"), "%a\\_b\\%c\\\\d%");
    }
}
