use tracing::{info, warn};

use chat_service_core::{AdminCredentials, AdminProvisioning, StartupConfig};
use chat_service_database::model::admin_user::ProvisionOutcome;

/// The database work that precedes the server handoff.
pub(crate) trait Bootstrap {
    async fn apply_migrations(&self) -> anyhow::Result<()>;

    async fn ensure_admin(&self, admin: &AdminCredentials) -> anyhow::Result<ProvisionOutcome>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BootstrapReport {
    pub(crate) migrations: StepStatus,
    pub(crate) admin: StepStatus,
}

/// Run steps 1 and 2. Neither can fail the startup: errors are logged and the
/// caller always proceeds to the server handoff.
pub(crate) async fn run_bootstrap<B: Bootstrap>(
    bootstrap: &B,
    config: &StartupConfig,
) -> BootstrapReport {
    let migrations = if config.auto_run_migrations {
        match bootstrap.apply_migrations().await {
            Ok(()) => {
                info!("Database migrations applied.");
                StepStatus::Completed
            }
            Err(err) => {
                warn!(?err, "Database migrations failed; continuing startup.");
                StepStatus::Failed
            }
        }
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
        StepStatus::Skipped
    };

    let admin = match &config.admin {
        AdminProvisioning::Configured(admin) => provision_admin(bootstrap, admin).await,
        AdminProvisioning::Skipped { missing } => {
            info!(?missing, "Admin provisioning skipped.");
            StepStatus::Skipped
        }
    };

    BootstrapReport { migrations, admin }
}

async fn provision_admin<B: Bootstrap>(bootstrap: &B, admin: &AdminCredentials) -> StepStatus {
    if admin.password_defaulted {
        warn!(
            username = %admin.username,
            "DJANGO_SUPERUSER_PASSWORD is unset; a new admin account gets the default password."
        );
    }

    match bootstrap.ensure_admin(admin).await {
        Ok(ProvisionOutcome::Created) => {
            info!(username = %admin.username, "Admin account created.");
            StepStatus::Completed
        }
        Ok(ProvisionOutcome::AlreadyExists) => {
            info!(username = %admin.username, "Admin account already exists.");
            StepStatus::Completed
        }
        Err(err) => {
            warn!(?err, username = %admin.username, "Admin provisioning failed; continuing startup.");
            StepStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeBootstrap {
        fail_migrations: bool,
        fail_admin: bool,
        admins: Mutex<HashSet<String>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl Bootstrap for FakeBootstrap {
        async fn apply_migrations(&self) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("migrate");
            if self.fail_migrations {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        async fn ensure_admin(
            &self,
            admin: &AdminCredentials,
        ) -> anyhow::Result<ProvisionOutcome> {
            self.calls.lock().unwrap().push("admin");
            if self.fail_admin {
                anyhow::bail!("relation \"admin_users\" does not exist");
            }
            let created = self.admins.lock().unwrap().insert(admin.username.clone());
            Ok(if created {
                ProvisionOutcome::Created
            } else {
                ProvisionOutcome::AlreadyExists
            })
        }
    }

    fn config(pairs: &[(&str, &str)]) -> StartupConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        StartupConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_owned()))
    }

    const ADMIN_ENV: [(&str, &str); 2] = [
        ("DJANGO_SUPERUSER_USERNAME", "root"),
        ("DJANGO_SUPERUSER_EMAIL", "root@example.com"),
    ];

    #[tokio::test]
    async fn migration_failure_does_not_stop_admin_step() {
        let bootstrap = FakeBootstrap {
            fail_migrations: true,
            ..Default::default()
        };

        let report = run_bootstrap(&bootstrap, &config(&ADMIN_ENV)).await;

        assert_eq!(report.migrations, StepStatus::Failed);
        assert_eq!(report.admin, StepStatus::Completed);
        assert_eq!(*bootstrap.calls.lock().unwrap(), vec!["migrate", "admin"]);
    }

    #[tokio::test]
    async fn unreachable_database_fails_both_steps_without_error() {
        let bootstrap = FakeBootstrap {
            fail_migrations: true,
            fail_admin: true,
            ..Default::default()
        };

        let report = run_bootstrap(&bootstrap, &config(&ADMIN_ENV)).await;

        assert_eq!(
            report,
            BootstrapReport {
                migrations: StepStatus::Failed,
                admin: StepStatus::Failed,
            }
        );
    }

    #[tokio::test]
    async fn partial_admin_env_skips_provisioning() {
        for pairs in [
            &[("DJANGO_SUPERUSER_USERNAME", "root")][..],
            &[("DJANGO_SUPERUSER_EMAIL", "root@example.com")][..],
        ] {
            let bootstrap = FakeBootstrap::default();
            let report = run_bootstrap(&bootstrap, &config(pairs)).await;

            assert_eq!(report.admin, StepStatus::Skipped);
            assert!(bootstrap.admins.lock().unwrap().is_empty());
            assert_eq!(*bootstrap.calls.lock().unwrap(), vec!["migrate"]);
        }
    }

    #[tokio::test]
    async fn repeated_starts_create_one_admin() {
        let bootstrap = FakeBootstrap::default();
        let config = config(&ADMIN_ENV);

        run_bootstrap(&bootstrap, &config).await;
        let second = run_bootstrap(&bootstrap, &config).await;

        assert_eq!(second.admin, StepStatus::Completed);
        assert_eq!(bootstrap.admins.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn migrations_can_be_disabled() {
        let bootstrap = FakeBootstrap::default();
        let report = run_bootstrap(&bootstrap, &config(&[("AUTO_RUN_MIGRATIONS", "false")])).await;

        assert_eq!(report.migrations, StepStatus::Skipped);
        assert!(bootstrap.calls.lock().unwrap().is_empty());
    }
}
