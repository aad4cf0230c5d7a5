mod disabled_store;
mod redis_store;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use disabled_store::DisabledStore;
use redis_store::RedisStore;

#[derive(Clone, Debug)]
enum Backend {
    Disabled(DisabledStore),
    Redis(RedisStore),
}

/// What the cache knows about one setting name.
///
/// `Missing` is cached too, so an unset setting read on every request does not
/// hit Postgres each time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum CachedSetting {
    Present(String),
    Missing,
}

impl CachedSetting {
    pub fn from_value(value: Option<&str>) -> Self {
        value.map_or(Self::Missing, |value| Self::Present(value.to_owned()))
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing => None,
        }
    }
}

/// Read-through cache for the `settings` table, keyed `<prefix>:settings:<name>`.
///
/// Every method swallows backend errors after logging them: a broken cache only
/// sends reads back to Postgres.
#[derive(Clone, Debug)]
pub struct SettingsCache {
    key_prefix: String,
    backend: Backend,
}

impl SettingsCache {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: Backend::Disabled(DisabledStore),
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: Backend::Redis(RedisStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, Backend::Redis(_))
    }

    pub fn setting_key(&self, name: &str) -> String {
        format!("{}:settings:{name}", self.key_prefix)
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Disabled(_) => Ok(()),
            Backend::Redis(store) => store.ping().await,
        }
    }

    /// `None` means "not cached"; the caller has to ask the database.
    pub async fn cached_setting(&self, name: &str) -> Option<CachedSetting> {
        let key = self.setting_key(name);
        let bytes = match &self.backend {
            Backend::Disabled(store) => store.get(&key).await,
            Backend::Redis(store) => store.get(&key).await,
        };

        let bytes = match bytes {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(?e, cache_key = %key, "setting cache read failed; falling back to database");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!(?e, cache_key = %key, "unreadable cached setting; ignoring it");
                None
            }
        }
    }

    pub async fn remember_setting(&self, name: &str, value: Option<&str>, ttl: Duration) {
        let key = self.setting_key(name);
        let payload = match serde_json::to_vec(&CachedSetting::from_value(value)) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(?e, cache_key = %key, "failed to encode setting for the cache");
                return;
            }
        };
        let ttl_seconds = ttl.as_secs().max(1);

        let stored = match &self.backend {
            Backend::Disabled(store) => store.put(&key, payload, ttl_seconds).await,
            Backend::Redis(store) => store.put(&key, payload, ttl_seconds).await,
        };
        if let Err(e) = stored {
            warn!(?e, cache_key = %key, "setting cache write failed");
        }
    }

    /// Drop the cached entries of `names` in one round trip.
    pub async fn forget_settings<S>(&self, names: &[S])
    where
        S: AsRef<str>,
    {
        if names.is_empty() {
            return;
        }

        let keys: Vec<String> = names
            .iter()
            .map(|name| self.setting_key(name.as_ref()))
            .collect();

        let removed = match &self.backend {
            Backend::Disabled(store) => store.remove(&keys).await,
            Backend::Redis(store) => store.remove(&keys).await,
        };
        if let Err(e) = removed {
            warn!(?e, cache_keys = ?keys, "failed to evict cached settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CachedSetting, SettingsCache};

    #[test]
    fn keys_live_under_the_settings_namespace() {
        let cache = SettingsCache::disabled("chat-service");
        assert_eq!(
            cache.setting_key("open_registration"),
            "chat-service:settings:open_registration"
        );
        assert!(!cache.is_redis_enabled());
    }

    #[test]
    fn empty_value_and_missing_row_are_cached_differently() {
        let empty = serde_json::to_string(&CachedSetting::from_value(Some(""))).unwrap();
        let missing = serde_json::to_string(&CachedSetting::from_value(None)).unwrap();
        assert_eq!(empty, r#"{"state":"present","value":""}"#);
        assert_eq!(missing, r#"{"state":"missing"}"#);

        let decoded: CachedSetting = serde_json::from_str(&missing).unwrap();
        assert_eq!(decoded.into_value(), None);
    }

    #[tokio::test]
    async fn disabled_cache_never_answers() {
        let cache = SettingsCache::disabled("test");
        cache
            .remember_setting("open_web_search", Some("False"), Duration::from_secs(5))
            .await;
        assert_eq!(cache.cached_setting("open_web_search").await, None);

        cache.forget_settings(&["open_web_search", "open_registration"]).await;
        cache.forget_settings::<&str>(&[]).await;
        assert!(cache.ping().await.is_ok());
    }
}
