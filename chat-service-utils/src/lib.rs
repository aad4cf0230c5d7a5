/// Environment variable parsing helpers.
pub mod env;
/// Shared time helpers.
pub mod time;
