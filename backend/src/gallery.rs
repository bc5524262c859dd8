use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{GalleryCategory, GalleryMedia, MediaType};

/// Reserved category that receives media added to stories.
pub const STORY_MIRROR_SLUG: &str = "noticias-postadas";

pub const HOME_HIGHLIGHTS_LIMIT: i64 = 8;

const CATEGORY_COLUMNS: &str = "id, name, slug, position, is_protected, show_on_home";
const MEDIA_COLUMNS: &str = "id, category_id, url, media_type, caption, position, created_at";

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CategoryFilter {
    #[serde(default)]
    pub home_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaScope {
    All,
    Category(Uuid),
}

impl MediaScope {
    /// `"all"` or a category id.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Uuid::parse_str(raw)
            .map(Self::Category)
            .map_err(|_| AppError::validation(format!("Categoria inválida: {}", raw)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGalleryMedia {
    pub category_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub caption: Option<String>,
}

/// Lowercase, whitespace runs to `-`, anything outside `[a-z0-9-]` dropped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub async fn list_categories(
    pool: &SqlitePool,
    filter: CategoryFilter,
) -> Result<Vec<GalleryCategory>, AppError> {
    let query = format!(
        "SELECT {} FROM gallery_categories WHERE (? = 0 OR show_on_home = 1) ORDER BY position ASC, name ASC",
        CATEGORY_COLUMNS
    );
    let categories = sqlx::query_as::<_, GalleryCategory>(&query)
        .bind(filter.home_only)
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn get_category(pool: &SqlitePool, id: Uuid) -> Result<GalleryCategory, AppError> {
    let query = format!("SELECT {} FROM gallery_categories WHERE id = ?", CATEGORY_COLUMNS);
    sqlx::query_as::<_, GalleryCategory>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_media(pool: &SqlitePool, scope: MediaScope) -> Result<Vec<GalleryMedia>, AppError> {
    let media = match scope {
        MediaScope::Category(category_id) => {
            let query = format!(
                "SELECT {} FROM gallery_media WHERE category_id = ? ORDER BY position ASC, created_at ASC",
                MEDIA_COLUMNS
            );
            sqlx::query_as::<_, GalleryMedia>(&query)
                .bind(category_id)
                .fetch_all(pool)
                .await?
        }
        MediaScope::All => {
            sqlx::query_as::<_, GalleryMedia>(
                r#"SELECT m.id, m.category_id, m.url, m.media_type, m.caption, m.position, m.created_at
                FROM gallery_media m
                JOIN gallery_categories c ON c.id = m.category_id
                ORDER BY c.position ASC, c.name ASC, m.position ASC, m.created_at ASC"#,
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(media)
}

/// Media of every home-visible category, in category order. `category`
/// narrows it to one of them; a hidden category yields nothing.
pub async fn home_highlights(
    pool: &SqlitePool,
    category: Option<Uuid>,
    limit: i64,
) -> Result<Vec<GalleryMedia>, AppError> {
    let media = sqlx::query_as::<_, GalleryMedia>(
        r#"SELECT m.id, m.category_id, m.url, m.media_type, m.caption, m.position, m.created_at
        FROM gallery_media m
        JOIN gallery_categories c ON c.id = m.category_id
        WHERE c.show_on_home = 1
        AND (? IS NULL OR c.id = ?)
        ORDER BY c.position ASC, c.name ASC, m.position ASC, m.created_at ASC
        LIMIT ?"#,
    )
    .bind(category)
    .bind(category)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(media)
}

pub async fn create_category(
    pool: &SqlitePool,
    name: &str,
    show_on_home: bool,
) -> Result<GalleryCategory, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("O nome da categoria é obrigatório"));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::validation(
            "O nome da categoria precisa ter letras ou números",
        ));
    }

    let mut tx = pool.begin().await?;

    let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM gallery_categories WHERE slug = ?")
        .bind(&slug)
        .fetch_one(&mut *tx)
        .await?;
    if taken > 0 {
        return Err(slug_taken(&slug));
    }

    let position = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM gallery_categories")
        .fetch_one(&mut *tx)
        .await?;

    let query = format!(
        r#"INSERT INTO gallery_categories (id, name, slug, position, is_protected, show_on_home)
        VALUES (?, ?, ?, ?, 0, ?)
        RETURNING {}"#,
        CATEGORY_COLUMNS
    );
    let category = sqlx::query_as::<_, GalleryCategory>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(&slug)
        .bind(position)
        .bind(show_on_home)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_slug(e, &slug))?;

    tx.commit().await?;
    tracing::info!(category = %category.id, slug = %category.slug, "gallery category created");
    Ok(category)
}

fn slug_taken(slug: &str) -> AppError {
    AppError::validation(format!("Já existe uma categoria com o endereço {}", slug))
}

// A concurrent create can pass the COUNT check and still lose on the
// UNIQUE index.
fn duplicate_slug(e: sqlx::Error, slug: &str) -> AppError {
    if e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        slug_taken(slug)
    } else {
        AppError::Database(e)
    }
}

/// Removes a category together with its media. Protected categories stay.
pub async fn delete_category(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let category = get_category(pool, id).await?;
    if category.is_protected {
        tracing::warn!(category = %id, slug = %category.slug, "refused to delete protected category");
        return Err(AppError::protected("Esta categoria não pode ser excluída"));
    }

    let mut tx = pool.begin().await?;
    let removed = sqlx::query("DELETE FROM gallery_media WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM gallery_categories WHERE id = ? AND is_protected = 0")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(category = %id, media = removed, "gallery category deleted");
    Ok(())
}

/// Sets `show_on_home` to the opposite of what the caller last saw, so a
/// repeated request converges instead of flipping back.
pub async fn toggle_show_on_home(
    pool: &SqlitePool,
    id: Uuid,
    current: bool,
) -> Result<GalleryCategory, AppError> {
    let query = format!(
        "UPDATE gallery_categories SET show_on_home = ? WHERE id = ? RETURNING {}",
        CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, GalleryCategory>(&query)
        .bind(!current)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn add_media(pool: &SqlitePool, new: NewGalleryMedia) -> Result<GalleryMedia, AppError> {
    let url = new.url.trim();
    if url.is_empty() {
        return Err(AppError::validation("A URL da mídia é obrigatória"));
    }
    get_category(pool, new.category_id).await?;

    let mut tx = pool.begin().await?;
    let media = append_media(
        &mut *tx,
        new.category_id,
        url,
        new.media_type,
        new.caption.as_deref(),
    )
    .await?;
    tx.commit().await?;
    Ok(media)
}

/// Appends to the end of a category. Shared with story mirroring.
pub(crate) async fn append_media(
    conn: &mut SqliteConnection,
    category_id: Uuid,
    url: &str,
    media_type: MediaType,
    caption: Option<&str>,
) -> Result<GalleryMedia, AppError> {
    let position = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM gallery_media WHERE category_id = ?",
    )
    .bind(category_id)
    .fetch_one(&mut *conn)
    .await?;

    let query = format!(
        r#"INSERT INTO gallery_media (id, category_id, url, media_type, caption, position, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {}"#,
        MEDIA_COLUMNS
    );
    let media = sqlx::query_as::<_, GalleryMedia>(&query)
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(url)
        .bind(media_type)
        .bind(caption)
        .bind(position)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
    Ok(media)
}

pub(crate) async fn story_mirror_category(conn: &mut SqliteConnection) -> Result<Option<Uuid>, AppError> {
    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM gallery_categories WHERE slug = ?")
        .bind(STORY_MIRROR_SLUG)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn update_caption(
    pool: &SqlitePool,
    id: Uuid,
    caption: Option<String>,
) -> Result<GalleryMedia, AppError> {
    let caption = caption.filter(|c| !c.trim().is_empty());
    let query = format!(
        "UPDATE gallery_media SET caption = ? WHERE id = ? RETURNING {}",
        MEDIA_COLUMNS
    );
    sqlx::query_as::<_, GalleryMedia>(&query)
        .bind(caption)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete_media(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM gallery_media WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn count_media(pool: &SqlitePool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM gallery_media")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
