#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub created_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
}
