/// Application name
pub const APP_NAME: &str = "Shard";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host the server runtime binds to when none is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Port used when the environment provides none
pub const DEFAULT_PORT: u16 = 25565;
