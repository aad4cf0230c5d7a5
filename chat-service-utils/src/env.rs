use tracing::warn;

/// Read a variable and drop it when it is empty or whitespace-only.
pub fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Read a variable as a string, falling back to `default` when unset or empty.
pub fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).unwrap_or_else(|| default.to_owned())
}

/// Truthy values are `1`, `true`, `yes` and `on` (case-insensitive); anything else is false.
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => parse_bool(&value),
        None => default,
    }
}

/// Read a non-negative integer. Only unset or unparseable values fall back to `default`.
pub fn u64_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key) else {
        return default;
    };

    raw.parse::<u64>().unwrap_or_else(|_| {
        warn!(key, value = %raw, default, "ignoring invalid value; using default");
        default
    })
}

/// Read a strictly positive integer. Unparseable or zero values fall back to `default`.
pub fn positive_u64_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key) else {
        return default;
    };

    match raw.parse::<u64>() {
        Ok(value) if value > 0 => value,
        _ => {
            warn!(key, value = %raw, default, "ignoring invalid value; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{bool_or, non_empty, parse_bool, positive_u64_or, string_or, u64_or};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn blank_values_count_as_unset() {
        let lookup = lookup_from(&[("A", "  "), ("B", " x ")]);
        assert_eq!(non_empty(&lookup, "A"), None);
        assert_eq!(non_empty(&lookup, "B"), Some("x".to_owned()));
        assert_eq!(non_empty(&lookup, "C"), None);
        assert_eq!(string_or(&lookup, "A", "fallback"), "fallback");
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(parse_bool("1"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));

        let lookup = lookup_from(&[("FLAG", "off")]);
        assert!(!bool_or(&lookup, "FLAG", true));
        assert!(bool_or(&lookup, "MISSING", true));
    }

    #[test]
    fn positive_integers_fall_back_on_garbage() {
        let lookup = lookup_from(&[("GOOD", "7"), ("ZERO", "0"), ("BAD", "seven")]);
        assert_eq!(positive_u64_or(&lookup, "GOOD", 3), 7);
        assert_eq!(positive_u64_or(&lookup, "ZERO", 3), 3);
        assert_eq!(positive_u64_or(&lookup, "BAD", 3), 3);
        assert_eq!(positive_u64_or(&lookup, "MISSING", 3), 3);
    }

    #[test]
    fn zero_is_kept_when_allowed() {
        let lookup = lookup_from(&[("ZERO", "0"), ("BAD", "-1")]);
        assert_eq!(u64_or(&lookup, "ZERO", 180), 0);
        assert_eq!(u64_or(&lookup, "BAD", 180), 180);
        assert_eq!(u64_or(&lookup, "MISSING", 180), 180);
    }
}
