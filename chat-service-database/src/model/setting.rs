#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Setting {
    pub name: String,
    pub value: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Values written on first start. Existing rows are never overwritten.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("open_registration", "True"),
    ("open_web_search", "False"),
    ("open_api_key_setting", "False"),
    ("open_frugal_mode_control", "True"),
];
