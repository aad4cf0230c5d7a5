use tracing::debug;

use crate::{
    database::Database,
    impls::{now_i64, to_u64},
    model::admin_user::{AdminUser, ProvisionOutcome},
};

/// Advisory lock key serializing admin provisioning across concurrent starts.
const ADMIN_PROVISION_LOCK_KEY: i64 = 0x6164_6d69_6e00;

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: i64,
    username: String,
    email: String,
    created_at: i64,
}

/// Create the admin account unless one with `username` already exists.
///
/// The existing account is left untouched, including its password.
pub async fn ensure_admin_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<ProvisionOutcome> {
    let now = now_i64()?;
    let mut tx = db.pool().begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ADMIN_PROVISION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM admin_users WHERE username = $1")
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

    if let Some(id) = existing {
        debug!(admin_id = id, "admin account already present");
        tx.commit().await?;
        return Ok(ProvisionOutcome::AlreadyExists);
    }

    let inserted = sqlx::query(
        "INSERT INTO admin_users (username, email, password_hash, created_at)
         VALUES ($1, $2, crypt($3, gen_salt('bf')), $4)
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(username)
    .bind(email)
    .bind(password)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    Ok(if inserted > 0 {
        ProvisionOutcome::Created
    } else {
        ProvisionOutcome::AlreadyExists
    })
}

pub async fn find_admin_user(db: &Database, username: &str) -> anyhow::Result<Option<AdminUser>> {
    let row: Option<AdminUserRow> = sqlx::query_as(
        "SELECT id, username, email, created_at
         FROM admin_users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await?;

    row.map(|row| {
        Ok(AdminUser {
            id: to_u64(row.id, "id")?,
            username: row.username,
            email: row.email,
            created_at: to_u64(row.created_at, "created_at")?,
        })
    })
    .transpose()
}

/// False for unknown usernames as well as wrong passwords.
pub async fn verify_admin_password(
    db: &Database,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let matches: Option<bool> = sqlx::query_scalar(
        "SELECT password_hash = crypt($2, password_hash)
         FROM admin_users
         WHERE username = $1",
    )
    .bind(username)
    .bind(password)
    .fetch_optional(db.pool())
    .await?;

    Ok(matches.unwrap_or(false))
}
