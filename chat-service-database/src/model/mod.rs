pub mod admin_user;
pub mod conversation;
pub mod embedding_document;
pub mod message;
pub mod page;
pub mod prompt;
pub mod setting;
pub mod token_usage;
