#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenUsage {
    pub sub: String,
    pub tokens: u64,
    pub created_at: u64,
    pub updated_at: u64,
}
