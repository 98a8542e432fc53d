mod settings;

pub use settings::{DatabaseConfig, JwtConfig, ServerConfig, Settings, StorageConfig};
