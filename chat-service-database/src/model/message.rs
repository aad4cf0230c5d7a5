use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: u64,
    pub sub: String,
    pub conversation_id: u64,
    pub message: String,
    pub is_bot: bool,
    pub message_type: i32,
    pub embedding_message_doc_id: Option<u64>,
    /// Prompt history sent alongside this message.
    pub messages: Value,
    pub tokens: u32,
    pub created_at: u64,
}

pub struct NewMessage<'a> {
    pub sub: &'a str,
    pub conversation_id: u64,
    pub message: &'a str,
    pub is_bot: bool,
    pub message_type: i32,
    pub embedding_message_doc_id: Option<u64>,
    pub messages: &'a Value,
    pub tokens: u32,
}
