#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub id: u64,
    pub sub: String,
    pub title: String,
    pub content: String,
    pub created_at: u64,
    pub updated_at: u64,
}
