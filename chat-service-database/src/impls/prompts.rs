use crate::{
    database::Database,
    impls::{clamp_limit, now_i64, to_i64, to_u64},
    model::prompt::Prompt,
};

#[derive(sqlx::FromRow)]
struct PromptRow {
    id: i64,
    sub: String,
    title: String,
    content: String,
    created_at: i64,
    updated_at: i64,
}

pub async fn create_prompt(
    db: &Database,
    sub: &str,
    title: &str,
    content: &str,
) -> anyhow::Result<Prompt> {
    let now = now_i64()?;

    let row: PromptRow = sqlx::query_as(
        "INSERT INTO prompts (sub, title, content, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING id, sub, title, content, created_at, updated_at",
    )
    .bind(sub)
    .bind(title)
    .bind(content)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    to_prompt(row)
}

pub async fn list_prompts(db: &Database, sub: &str, limit: u32) -> anyhow::Result<Vec<Prompt>> {
    let rows: Vec<PromptRow> = sqlx::query_as(
        "SELECT id, sub, title, content, created_at, updated_at
         FROM prompts
         WHERE sub = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2",
    )
    .bind(sub)
    .bind(clamp_limit(limit))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_prompt).collect()
}

pub async fn update_prompt(
    db: &Database,
    sub: &str,
    prompt_id: u64,
    title: &str,
    content: &str,
) -> anyhow::Result<bool> {
    let prompt_id_i64 = to_i64(prompt_id, "prompt_id")?;
    let now = now_i64()?;

    let updated = sqlx::query(
        "UPDATE prompts
         SET title = $1, content = $2, updated_at = $3
         WHERE sub = $4 AND id = $5",
    )
    .bind(title)
    .bind(content)
    .bind(now)
    .bind(sub)
    .bind(prompt_id_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

pub async fn delete_prompt(db: &Database, sub: &str, prompt_id: u64) -> anyhow::Result<bool> {
    let prompt_id_i64 = to_i64(prompt_id, "prompt_id")?;

    let deleted = sqlx::query("DELETE FROM prompts WHERE sub = $1 AND id = $2")
        .bind(sub)
        .bind(prompt_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn to_prompt(row: PromptRow) -> anyhow::Result<Prompt> {
    Ok(Prompt {
        id: to_u64(row.id, "id")?,
        sub: row.sub,
        title: row.title,
        content: row.content,
        created_at: to_u64(row.created_at, "created_at")?,
        updated_at: to_u64(row.updated_at, "updated_at")?,
    })
}
