use std::time::Duration;

use sqlx::{PgPool, migrate::Migrator};

use crate::cache::SettingsCache;

/// Compile-time discovered SQLx migrations for the `chat-service-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

const DEFAULT_SETTINGS_TTL: Duration = Duration::from_secs(300);

/// Shared database handle passed across crates.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: SettingsCache,
    settings_ttl: Duration,
}

impl Database {
    /// Create a database handle from an existing pool, with caching disabled.
    pub fn new(pool: PgPool) -> Self {
        Self::with_cache(pool, SettingsCache::disabled("chat-service"))
    }

    pub fn with_cache(pool: PgPool, cache: SettingsCache) -> Self {
        Self {
            pool,
            cache,
            settings_ttl: DEFAULT_SETTINGS_TTL,
        }
    }

    /// Override how long setting values stay cached.
    pub fn with_settings_ttl(mut self, ttl: Duration) -> Self {
        self.settings_ttl = ttl;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    pub fn settings_ttl(&self) -> Duration {
        self.settings_ttl
    }
}
