pub mod cache;
pub mod database;
pub mod impls;
pub mod model;

pub use cache::{CachedSetting, SettingsCache};
pub use database::{Database, MIGRATOR};
