mod launcher;
mod postgres;
mod sequencer;

use tracing::{Level, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use chat_service_core::StartupConfig;

use crate::launcher::ServerCommand;
use crate::postgres::PostgresBootstrap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(filter_fn(|metadata| keep_event(metadata.level(), metadata.target())));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let config = StartupConfig::from_env();
    info!(
        workers = config.server.workers,
        timeout_seconds = config.server.timeout_seconds,
        bind = %config.server.bind,
        "Chat service starting."
    );

    let cache = postgres::build_cache(&config.cache).await;
    match postgres::connect_lazy(&config.database, cache) {
        Ok(db) => {
            let db = db.with_settings_ttl(config.cache.settings_ttl);
            let report =
                sequencer::run_bootstrap(&PostgresBootstrap::new(db.clone()), &config).await;
            info!(
                migrations = ?report.migrations,
                admin = ?report.admin,
                "Bootstrap finished."
            );
            db.pool().close().await;
        }
        Err(err) => {
            warn!(?err, "Database unavailable; skipping migrations and admin provisioning.");
        }
    }

    Err(ServerCommand::from_config(&config.server).exec())
}

/// INFO and above, minus Postgres notices below WARN (`CREATE ... IF NOT EXISTS`
/// emits one per object on every restart).
fn keep_event(level: &Level, target: &str) -> bool {
    if *level > Level::INFO {
        return false;
    }

    !(target.starts_with("sqlx::postgres::notice") && *level > Level::WARN)
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::keep_event;

    #[test]
    fn postgres_notices_need_warn() {
        assert!(!keep_event(&Level::INFO, "sqlx::postgres::notice"));
        assert!(keep_event(&Level::WARN, "sqlx::postgres::notice"));
        assert!(keep_event(&Level::INFO, "sqlx::query"));
        assert!(keep_event(&Level::INFO, "chat_service_entrypoint::sequencer"));
        assert!(!keep_event(&Level::DEBUG, "chat_service_entrypoint::sequencer"));
    }
}
