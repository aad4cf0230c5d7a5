use anyhow::Context as _;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use chat_service_core::{AdminCredentials, CacheConfig, DatabaseConfig};
use chat_service_database::{
    SettingsCache, Database, MIGRATOR,
    impls::{admin_users, schema, settings},
    model::admin_user::ProvisionOutcome,
};

use crate::sequencer::Bootstrap;

/// Build the pool without connecting; the first query surfaces an unreachable database.
pub(crate) fn connect_lazy(
    config: &DatabaseConfig,
    cache: SettingsCache,
) -> anyhow::Result<Database> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_lazy(&config.url)
        .context("invalid DATABASE_URL")?;

    Ok(Database::with_cache(pool, cache))
}

pub(crate) async fn build_cache(config: &CacheConfig) -> SettingsCache {
    let prefix = config.key_prefix.clone();

    if !config.redis_enabled {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return SettingsCache::disabled(prefix);
    }

    let Some(redis_url) = config.redis_url.as_deref() else {
        warn!(key_prefix = %prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
        return SettingsCache::disabled(prefix);
    };

    let cache = match SettingsCache::redis(redis_url, prefix.clone()) {
        Ok(cache) => cache,
        Err(err) => {
            warn!(?err, key_prefix = %prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
            return SettingsCache::disabled(prefix);
        }
    };

    match cache.ping().await {
        Ok(()) => info!(key_prefix = %prefix, "Redis cache enabled."),
        Err(err) => warn!(
            ?err,
            "Redis cache ping failed; cache operations will continue with fallback behavior."
        ),
    }

    cache
}

pub(crate) struct PostgresBootstrap {
    db: Database,
}

impl PostgresBootstrap {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Bootstrap for PostgresBootstrap {
    async fn apply_migrations(&self) -> anyhow::Result<()> {
        let renamed = schema::ensure_sub_column_compat(&self.db)
            .await
            .context("legacy user_sub compatibility check failed")?;
        if !renamed.is_empty() {
            info!(?renamed, "Legacy user_sub columns renamed.");
        }

        MIGRATOR
            .run(self.db.pool())
            .await
            .context("schema migration failed")?;

        let seeded = settings::seed_default_settings(&self.db)
            .await
            .context("seeding default settings failed")?;
        if seeded > 0 {
            info!(seeded, "Default settings inserted.");
        }

        let missing = schema::missing_tables(&self.db).await?;
        if !missing.is_empty() {
            warn!(?missing, "Chat tables missing after migrations.");
        }

        Ok(())
    }

    async fn ensure_admin(&self, admin: &AdminCredentials) -> anyhow::Result<ProvisionOutcome> {
        admin_users::ensure_admin_user(&self.db, &admin.username, &admin.email, &admin.password)
            .await
    }
}
