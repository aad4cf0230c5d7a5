use anyhow::Context as _;
use chat_service_utils::time::now_unix_secs;

pub mod admin_users;
pub mod conversations;
pub mod embedding_documents;
pub mod messages;
pub mod prompts;
pub mod schema;
pub mod settings;
pub mod token_usage;

/// Upper bound for any list query.
pub const MAX_LIST_LIMIT: u32 = 200;

pub(crate) fn clamp_limit(limit: u32) -> i64 {
    i64::from(limit.clamp(1, MAX_LIST_LIMIT))
}

pub(crate) fn now_i64() -> anyhow::Result<i64> {
    i64::try_from(now_unix_secs()).context("now out of i64 range")
}

pub(crate) fn to_i64(value: u64, field: &'static str) -> anyhow::Result<i64> {
    i64::try_from(value).with_context(|| format!("{field} out of i64 range"))
}

pub(crate) fn to_u64(value: i64, field: &'static str) -> anyhow::Result<u64> {
    u64::try_from(value).with_context(|| format!("{field} row out of u64 range"))
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit, to_i64, to_u64};

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(50), 50);
        assert_eq!(clamp_limit(10_000), 200);
    }

    #[test]
    fn conversions_report_the_field() {
        let err = to_i64(u64::MAX, "conversation_id").unwrap_err();
        assert_eq!(err.to_string(), "conversation_id out of i64 range");

        let err = to_u64(-1, "created_at").unwrap_err();
        assert_eq!(err.to_string(), "created_at row out of u64 range");

        assert_eq!(to_u64(42, "id").unwrap(), 42);
    }
}
