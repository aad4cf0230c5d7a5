use crate::{
    database::Database,
    impls::{now_i64, to_i64, to_u64},
    model::token_usage::TokenUsage,
};

#[derive(sqlx::FromRow)]
struct TokenUsageRow {
    sub: String,
    tokens: i64,
    created_at: i64,
    updated_at: i64,
}

/// Add `tokens` to the running total of `sub`, creating the counter on first use.
pub async fn add_token_usage(db: &Database, sub: &str, tokens: u64) -> anyhow::Result<TokenUsage> {
    let tokens_i64 = to_i64(tokens, "tokens")?;
    let now = now_i64()?;

    let row: TokenUsageRow = sqlx::query_as(
        "INSERT INTO token_usage (sub, tokens, created_at, updated_at)
         VALUES ($1, $2, $3, $3)
         ON CONFLICT (sub) DO UPDATE
            SET tokens = token_usage.tokens + EXCLUDED.tokens,
                updated_at = EXCLUDED.updated_at
         RETURNING sub, tokens, created_at, updated_at",
    )
    .bind(sub)
    .bind(tokens_i64)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    to_token_usage(row)
}

pub async fn get_token_usage(db: &Database, sub: &str) -> anyhow::Result<Option<TokenUsage>> {
    let row: Option<TokenUsageRow> = sqlx::query_as(
        "SELECT sub, tokens, created_at, updated_at
         FROM token_usage
         WHERE sub = $1",
    )
    .bind(sub)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_token_usage).transpose()
}

fn to_token_usage(row: TokenUsageRow) -> anyhow::Result<TokenUsage> {
    Ok(TokenUsage {
        sub: row.sub,
        tokens: to_u64(row.tokens, "tokens")?,
        created_at: to_u64(row.created_at, "created_at")?,
        updated_at: to_u64(row.updated_at, "updated_at")?,
    })
}
