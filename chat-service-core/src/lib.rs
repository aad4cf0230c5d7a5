pub mod config;

pub use config::{
    AdminCredentials, AdminProvisioning, CacheConfig, DatabaseConfig, ServerConfig, StartupConfig,
};
