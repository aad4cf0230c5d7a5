#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingDocument {
    pub id: u64,
    pub sub: String,
    pub org_id: Option<String>,
    pub title: String,
    /// Serialized FAISS index.
    pub faiss_store: Vec<u8>,
    pub created_at: u64,
}

/// Listing row without the index payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingDocumentSummary {
    pub id: u64,
    pub sub: String,
    pub org_id: Option<String>,
    pub title: String,
    pub created_at: u64,
}

pub struct NewEmbeddingDocument<'a> {
    pub sub: &'a str,
    pub org_id: Option<&'a str>,
    pub title: &'a str,
    pub faiss_store: &'a [u8],
}
