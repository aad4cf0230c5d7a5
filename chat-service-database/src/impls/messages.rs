use anyhow::Context as _;
use serde_json::Value;
use sqlx::types::Json;

use crate::{
    database::Database,
    impls::{clamp_limit, now_i64, to_i64, to_u64},
    model::{
        message::{Message, NewMessage},
        page::Page,
    },
};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sub: String,
    conversation_id: i64,
    message: String,
    is_bot: bool,
    message_type: i32,
    embedding_message_doc_id: Option<i64>,
    messages: Json<Value>,
    tokens: i32,
    created_at: i64,
}

/// Append a message to a conversation owned by `new_message.sub`.
///
/// Returns `None` when the conversation, or the linked embedding document, does not
/// exist or belongs to another `sub`.
pub async fn create_message(
    db: &Database,
    new_message: NewMessage<'_>,
) -> anyhow::Result<Option<Message>> {
    let conversation_id_i64 = to_i64(new_message.conversation_id, "conversation_id")?;
    let embedding_doc_id_i64 = new_message
        .embedding_message_doc_id
        .map(|id| to_i64(id, "embedding_message_doc_id"))
        .transpose()?;
    let tokens_i32 = i32::try_from(new_message.tokens).context("tokens out of i32 range")?;
    let now = now_i64()?;

    let mut tx = db.pool().begin().await?;

    let touched = sqlx::query(
        "UPDATE conversations
         SET updated_at = $1
         WHERE sub = $2 AND id = $3",
    )
    .bind(now)
    .bind(new_message.sub)
    .bind(conversation_id_i64)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if touched == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    if let Some(embedding_doc_id) = embedding_doc_id_i64 {
        let owned: Option<i32> = sqlx::query_scalar(
            "SELECT 1
             FROM embedding_documents
             WHERE sub = $1 AND id = $2",
        )
        .bind(new_message.sub)
        .bind(embedding_doc_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }
    }

    let row: MessageRow = sqlx::query_as(
        "INSERT INTO messages (
            sub,
            conversation_id,
            message,
            is_bot,
            message_type,
            embedding_message_doc_id,
            messages,
            tokens,
            created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id, sub, conversation_id, message, is_bot, message_type, embedding_message_doc_id, messages, tokens, created_at",
    )
    .bind(new_message.sub)
    .bind(conversation_id_i64)
    .bind(new_message.message)
    .bind(new_message.is_bot)
    .bind(new_message.message_type)
    .bind(embedding_doc_id_i64)
    .bind(Json(new_message.messages))
    .bind(tokens_i32)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    to_message(row).map(Some)
}

/// Oldest first, one page at a time.
///
/// Returns `None` when the conversation is not visible to `sub` (or, with `org_id`,
/// not part of that organization).
pub async fn list_messages(
    db: &Database,
    sub: &str,
    org_id: Option<&str>,
    conversation_id: u64,
    offset: u32,
    limit: u32,
) -> anyhow::Result<Option<Page<Message>>> {
    let conversation_id_i64 = to_i64(conversation_id, "conversation_id")?;

    let visible: Option<i32> = sqlx::query_scalar(
        "SELECT 1
         FROM conversations
         WHERE sub = $1 AND id = $2 AND ($3::VARCHAR IS NULL OR org_id = $3)",
    )
    .bind(sub)
    .bind(conversation_id_i64)
    .bind(org_id)
    .fetch_optional(db.pool())
    .await?;

    if visible.is_none() {
        return Ok(None);
    }

    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM messages
         WHERE sub = $1 AND conversation_id = $2",
    )
    .bind(sub)
    .bind(conversation_id_i64)
    .fetch_one(db.pool())
    .await?;

    let rows: Vec<MessageRow> = sqlx::query_as(
        "SELECT id, sub, conversation_id, message, is_bot, message_type, embedding_message_doc_id, messages, tokens, created_at
         FROM messages
         WHERE sub = $1 AND conversation_id = $2
         ORDER BY created_at ASC, id ASC
         LIMIT $3 OFFSET $4",
    )
    .bind(sub)
    .bind(conversation_id_i64)
    .bind(clamp_limit(limit))
    .bind(i64::from(offset))
    .fetch_all(db.pool())
    .await?;

    Ok(Some(Page {
        items: rows.into_iter().map(to_message).collect::<anyhow::Result<_>>()?,
        total_count: to_u64(total_count, "total_count")?,
    }))
}

/// Newest first, across all conversations of `sub`.
pub async fn list_recent_messages(
    db: &Database,
    sub: &str,
    limit: u32,
) -> anyhow::Result<Vec<Message>> {
    let rows: Vec<MessageRow> = sqlx::query_as(
        "SELECT id, sub, conversation_id, message, is_bot, message_type, embedding_message_doc_id, messages, tokens, created_at
         FROM messages
         WHERE sub = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2",
    )
    .bind(sub)
    .bind(clamp_limit(limit))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_message).collect()
}

fn to_message(row: MessageRow) -> anyhow::Result<Message> {
    Ok(Message {
        id: to_u64(row.id, "id")?,
        sub: row.sub,
        conversation_id: to_u64(row.conversation_id, "conversation_id")?,
        message: row.message,
        is_bot: row.is_bot,
        message_type: row.message_type,
        embedding_message_doc_id: row
            .embedding_message_doc_id
            .map(|id| to_u64(id, "embedding_message_doc_id"))
            .transpose()?,
        messages: row.messages.0,
        tokens: u32::try_from(row.tokens).context("tokens row out of u32 range")?,
        created_at: to_u64(row.created_at, "created_at")?,
    })
}
