use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Sqlite, SqliteExecutor, SqlitePool};

use crate::error::AppError;

pub const PLAYLIST_URL_KEY: &str = "spotify_playlist_url";

pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>, AppError> {
    let value = sqlx::query_scalar::<_, Option<String>>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?
        .flatten();
    Ok(value)
}

pub async fn get_settings(
    pool: &SqlitePool,
    keys: &[&str],
) -> Result<HashMap<String, String>, AppError> {
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; keys.len()].join(", ");
    let query = format!(
        "SELECT key, value FROM settings WHERE key IN ({})",
        placeholders
    );

    let mut q = sqlx::query_as::<Sqlite, (String, Option<String>)>(&query);
    for key in keys {
        q = q.bind(*key);
    }

    let rows = q.fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect())
}

/// Insert or overwrite a single key. Other keys are never touched.
pub async fn set_setting<'e, E>(executor: E, key: &str, value: &str) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT (key)
        DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn set_overwrites_only_its_key() {
        let pool = test_pool().await;
        set_setting(&pool, PLAYLIST_URL_KEY, "https://a").await.unwrap();
        set_setting(&pool, "other", "x").await.unwrap();
        set_setting(&pool, PLAYLIST_URL_KEY, "https://b").await.unwrap();

        assert_eq!(
            get_setting(&pool, PLAYLIST_URL_KEY).await.unwrap().as_deref(),
            Some("https://b")
        );
        let all = get_settings(&pool, &[PLAYLIST_URL_KEY, "other", "missing"])
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["other"], "x");
    }
}
