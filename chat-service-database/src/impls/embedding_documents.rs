use crate::{
    database::Database,
    impls::{clamp_limit, now_i64, to_i64, to_u64},
    model::embedding_document::{
        EmbeddingDocument, EmbeddingDocumentSummary, NewEmbeddingDocument,
    },
};

#[derive(sqlx::FromRow)]
struct EmbeddingDocumentRow {
    id: i64,
    sub: String,
    org_id: Option<String>,
    title: String,
    faiss_store: Vec<u8>,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct EmbeddingDocumentSummaryRow {
    id: i64,
    sub: String,
    org_id: Option<String>,
    title: String,
    created_at: i64,
}

pub async fn create_embedding_document(
    db: &Database,
    new_document: NewEmbeddingDocument<'_>,
) -> anyhow::Result<EmbeddingDocumentSummary> {
    let now = now_i64()?;

    let row: EmbeddingDocumentSummaryRow = sqlx::query_as(
        "INSERT INTO embedding_documents (sub, org_id, title, faiss_store, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, sub, org_id, title, created_at",
    )
    .bind(new_document.sub)
    .bind(new_document.org_id)
    .bind(new_document.title)
    .bind(new_document.faiss_store)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    to_summary(row)
}

pub async fn get_embedding_document(
    db: &Database,
    sub: &str,
    document_id: u64,
) -> anyhow::Result<Option<EmbeddingDocument>> {
    let document_id_i64 = to_i64(document_id, "document_id")?;

    let row: Option<EmbeddingDocumentRow> = sqlx::query_as(
        "SELECT id, sub, org_id, title, faiss_store, created_at
         FROM embedding_documents
         WHERE sub = $1 AND id = $2",
    )
    .bind(sub)
    .bind(document_id_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(|row| {
        Ok(EmbeddingDocument {
            id: to_u64(row.id, "id")?,
            sub: row.sub,
            org_id: row.org_id,
            title: row.title,
            faiss_store: row.faiss_store,
            created_at: to_u64(row.created_at, "created_at")?,
        })
    })
    .transpose()
}

/// Newest first. With `org_id`, only documents of that organization are listed.
pub async fn list_embedding_documents(
    db: &Database,
    sub: &str,
    org_id: Option<&str>,
    limit: u32,
) -> anyhow::Result<Vec<EmbeddingDocumentSummary>> {
    let rows: Vec<EmbeddingDocumentSummaryRow> = sqlx::query_as(
        "SELECT id, sub, org_id, title, created_at
         FROM embedding_documents
         WHERE sub = $1 AND ($2::VARCHAR IS NULL OR org_id = $2)
         ORDER BY created_at DESC, id DESC
         LIMIT $3",
    )
    .bind(sub)
    .bind(org_id)
    .bind(clamp_limit(limit))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_summary).collect()
}

/// Messages pointing at the document keep their row; the reference is cleared.
pub async fn delete_embedding_document(
    db: &Database,
    sub: &str,
    document_id: u64,
) -> anyhow::Result<bool> {
    let document_id_i64 = to_i64(document_id, "document_id")?;

    let deleted = sqlx::query("DELETE FROM embedding_documents WHERE sub = $1 AND id = $2")
        .bind(sub)
        .bind(document_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn to_summary(row: EmbeddingDocumentSummaryRow) -> anyhow::Result<EmbeddingDocumentSummary> {
    Ok(EmbeddingDocumentSummary {
        id: to_u64(row.id, "id")?,
        sub: row.sub,
        org_id: row.org_id,
        title: row.title,
        created_at: to_u64(row.created_at, "created_at")?,
    })
}
