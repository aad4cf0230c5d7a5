use crate::{
    database::Database,
    impls::{clamp_limit, now_i64, to_i64, to_u64},
    model::{
        conversation::{Conversation, ConversationSummary, NewConversation},
        page::Page,
    },
};

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: i64,
    sub: String,
    org_id: Option<String>,
    topic: String,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct ConversationSummaryRow {
    #[sqlx(flatten)]
    conversation: ConversationRow,
    message_count: i64,
}

pub async fn create_conversation(
    db: &Database,
    new_conversation: NewConversation<'_>,
) -> anyhow::Result<Conversation> {
    let now = now_i64()?;

    let row: ConversationRow = sqlx::query_as(
        "INSERT INTO conversations (sub, org_id, topic, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING id, sub, org_id, topic, created_at, updated_at",
    )
    .bind(new_conversation.sub)
    .bind(new_conversation.org_id)
    .bind(new_conversation.topic)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    to_conversation(row)
}

pub async fn get_conversation(
    db: &Database,
    sub: &str,
    conversation_id: u64,
) -> anyhow::Result<Option<Conversation>> {
    let conversation_id_i64 = to_i64(conversation_id, "conversation_id")?;

    let row: Option<ConversationRow> = sqlx::query_as(
        "SELECT id, sub, org_id, topic, created_at, updated_at
         FROM conversations
         WHERE sub = $1 AND id = $2",
    )
    .bind(sub)
    .bind(conversation_id_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_conversation).transpose()
}

/// Newest first, one page at a time. `org_id` narrows the listing to one organization.
pub async fn list_conversations(
    db: &Database,
    sub: &str,
    org_id: Option<&str>,
    offset: u32,
    limit: u32,
) -> anyhow::Result<Page<ConversationSummary>> {
    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM conversations
         WHERE sub = $1 AND ($2::VARCHAR IS NULL OR org_id = $2)",
    )
    .bind(sub)
    .bind(org_id)
    .fetch_one(db.pool())
    .await?;

    let rows: Vec<ConversationSummaryRow> = sqlx::query_as(
        "SELECT c.id, c.sub, c.org_id, c.topic, c.created_at, c.updated_at,
                COUNT(m.id) AS message_count
         FROM conversations c
         LEFT JOIN messages m ON m.conversation_id = c.id
         WHERE c.sub = $1 AND ($2::VARCHAR IS NULL OR c.org_id = $2)
         GROUP BY c.id
         ORDER BY c.created_at DESC, c.id DESC
         LIMIT $3 OFFSET $4",
    )
    .bind(sub)
    .bind(org_id)
    .bind(clamp_limit(limit))
    .bind(i64::from(offset))
    .fetch_all(db.pool())
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            Ok(ConversationSummary {
                conversation: to_conversation(row.conversation)?,
                message_count: to_u64(row.message_count, "message_count")?,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Page {
        items,
        total_count: to_u64(total_count, "total_count")?,
    })
}

pub async fn rename_conversation(
    db: &Database,
    sub: &str,
    conversation_id: u64,
    topic: &str,
) -> anyhow::Result<bool> {
    let conversation_id_i64 = to_i64(conversation_id, "conversation_id")?;
    let now = now_i64()?;

    let updated = sqlx::query(
        "UPDATE conversations
         SET topic = $1, updated_at = $2
         WHERE sub = $3 AND id = $4",
    )
    .bind(topic)
    .bind(now)
    .bind(sub)
    .bind(conversation_id_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

/// Messages of the conversation go with it. With `org_id`, only a conversation
/// of that organization is deleted.
pub async fn delete_conversation(
    db: &Database,
    sub: &str,
    org_id: Option<&str>,
    conversation_id: u64,
) -> anyhow::Result<bool> {
    let conversation_id_i64 = to_i64(conversation_id, "conversation_id")?;

    let deleted = sqlx::query(
        "DELETE FROM conversations
         WHERE sub = $1 AND id = $2 AND ($3::VARCHAR IS NULL OR org_id = $3)",
    )
    .bind(sub)
    .bind(conversation_id_i64)
    .bind(org_id)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

pub async fn delete_all_conversations(db: &Database, sub: &str) -> anyhow::Result<u64> {
    let deleted = sqlx::query("DELETE FROM conversations WHERE sub = $1")
        .bind(sub)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

fn to_conversation(row: ConversationRow) -> anyhow::Result<Conversation> {
    Ok(Conversation {
        id: to_u64(row.id, "id")?,
        sub: row.sub,
        org_id: row.org_id,
        topic: row.topic,
        created_at: to_u64(row.created_at, "created_at")?,
        updated_at: to_u64(row.updated_at, "updated_at")?,
    })
}
