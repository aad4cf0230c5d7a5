use chat_service_utils::env::parse_bool;

use crate::{
    database::Database,
    impls::{now_i64, to_u64},
    model::setting::{DEFAULT_SETTINGS, Setting},
};

#[derive(sqlx::FromRow)]
struct SettingRow {
    name: String,
    value: String,
    created_at: i64,
    updated_at: i64,
}

/// Read a setting value through the cache. Absent settings are cached as absent.
pub async fn get_setting(db: &Database, name: &str) -> anyhow::Result<Option<String>> {
    if let Some(cached) = db.cache().cached_setting(name).await {
        return Ok(cached.into_value());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE name = $1")
        .bind(name)
        .fetch_optional(db.pool())
        .await?;

    db.cache()
        .remember_setting(name, value.as_deref(), db.settings_ttl())
        .await;

    Ok(value)
}

/// Interpret a setting as a flag. Stored values use `True`/`False`.
pub async fn get_setting_flag(db: &Database, name: &str, default: bool) -> anyhow::Result<bool> {
    Ok(get_setting(db, name)
        .await?
        .map_or(default, |value| parse_bool(&value)))
}

pub async fn set_setting(db: &Database, name: &str, value: &str) -> anyhow::Result<()> {
    let now = now_i64()?;

    sqlx::query(
        "INSERT INTO settings (name, value, created_at, updated_at)
         VALUES ($1, $2, $3, $3)
         ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
    )
    .bind(name)
    .bind(value)
    .bind(now)
    .execute(db.pool())
    .await?;

    db.cache().forget_settings(&[name]).await;

    Ok(())
}

pub async fn list_settings(db: &Database) -> anyhow::Result<Vec<Setting>> {
    let rows: Vec<SettingRow> = sqlx::query_as(
        "SELECT name, value, created_at, updated_at
         FROM settings
         ORDER BY name ASC",
    )
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(Setting {
                name: row.name,
                value: row.value,
                created_at: to_u64(row.created_at, "created_at")?,
                updated_at: to_u64(row.updated_at, "updated_at")?,
            })
        })
        .collect()
}

/// Insert every default setting that is not present yet. Returns how many were inserted.
///
/// A name read before seeding may be cached as absent, so inserted names are evicted.
pub async fn seed_default_settings(db: &Database) -> anyhow::Result<u64> {
    let now = now_i64()?;
    let mut tx = db.pool().begin().await?;
    let mut inserted = Vec::new();

    for (name, value) in DEFAULT_SETTINGS {
        let created: Option<String> = sqlx::query_scalar(
            "INSERT INTO settings (name, value, created_at, updated_at)
             VALUES ($1, $2, $3, $3)
             ON CONFLICT (name) DO NOTHING
             RETURNING name",
        )
        .bind(*name)
        .bind(*value)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        inserted.extend(created);
    }

    tx.commit().await?;

    db.cache().forget_settings(&inserted).await;

    Ok(inserted.len() as u64)
}

#[cfg(test)]
mod tests {
    use chat_service_utils::env::parse_bool;

    use crate::model::setting::DEFAULT_SETTINGS;

    #[test]
    fn defaults_open_registration_only_with_frugal_mode() {
        let enabled: Vec<&str> = DEFAULT_SETTINGS
            .iter()
            .filter(|(_, value)| parse_bool(value))
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(enabled, vec!["open_registration", "open_frugal_mode_control"]);
    }
}
