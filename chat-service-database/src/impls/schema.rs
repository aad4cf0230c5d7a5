use tracing::info;

use crate::database::Database;

/// Tables the chat service expects after migrations.
pub const CHAT_TABLES: [&str; 6] = [
    "conversations",
    "messages",
    "prompts",
    "embedding_documents",
    "settings",
    "token_usage",
];

/// Tables whose user key used to be called `user_sub`.
const SUB_SCOPED_TABLES: [&str; 5] = [
    "conversations",
    "messages",
    "prompts",
    "embedding_documents",
    "token_usage",
];

/// Rename a leftover `user_sub` column to `sub` on each per-user table.
///
/// Safe to run on every start: tables that are missing, already migrated, or carry both
/// columns are left alone. Returns the tables that were renamed.
pub async fn ensure_sub_column_compat(db: &Database) -> anyhow::Result<Vec<&'static str>> {
    let mut renamed = Vec::new();

    for table in SUB_SCOPED_TABLES {
        let columns: Vec<String> = sqlx::query_scalar(
            "SELECT column_name::TEXT
             FROM information_schema.columns
             WHERE table_schema = current_schema()
               AND table_name = $1
               AND column_name IN ('user_sub', 'sub')",
        )
        .bind(table)
        .fetch_all(db.pool())
        .await?;

        if !needs_sub_rename(&columns) {
            continue;
        }

        // Table names come from the fixed list above.
        sqlx::query(&format!("ALTER TABLE {table} RENAME COLUMN user_sub TO sub"))
            .execute(db.pool())
            .await?;
        info!(table, "renamed legacy user_sub column to sub");
        renamed.push(table);
    }

    Ok(renamed)
}

/// Chat tables not present in the current schema.
pub async fn missing_tables(db: &Database) -> anyhow::Result<Vec<&'static str>> {
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT
         FROM information_schema.tables
         WHERE table_schema = current_schema()
           AND table_name::TEXT = ANY($1)",
    )
    .bind(CHAT_TABLES.to_vec())
    .fetch_all(db.pool())
    .await?;

    Ok(CHAT_TABLES
        .into_iter()
        .filter(|table| !present.iter().any(|name| name == table))
        .collect())
}

fn needs_sub_rename(columns: &[String]) -> bool {
    let has = |wanted: &str| columns.iter().any(|column| column == wanted);
    has("user_sub") && !has("sub")
}
