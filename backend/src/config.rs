use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub run_migrations: bool,
    pub server_addr: String,
    pub session_ttl_hours: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `config.toml` (optional) with environment variables layered on top.
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("database_url", "sqlite://nosdois.db")?
            .set_default("run_migrations", true)?
            .set_default("server_addr", "127.0.0.1:3000")?
            .set_default("session_ttl_hours", 720)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            run_migrations: true,
            server_addr: "127.0.0.1:0".to_string(),
            session_ttl_hours: 1,
            admin_email: None,
            admin_password: None,
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
        }
    }
}
