#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: u64,
    pub sub: String,
    pub org_id: Option<String>,
    pub topic: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A conversation as listed, with how many messages it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub message_count: u64,
}

pub struct NewConversation<'a> {
    pub sub: &'a str,
    pub org_id: Option<&'a str>,
    pub topic: &'a str,
}
