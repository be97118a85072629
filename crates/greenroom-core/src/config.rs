use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub admin: AdminConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
    /// Seconds to wait for a pooled connection before giving up.
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used when building invite links, e.g.
    /// `https://booking.example.com`. Falls back to the bind address.
    pub public_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn bind_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the origin guests see in invite links and calendar UIDs.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.public_origin {
            origin.clone()
        } else {
            self.bind_origin()
        }
    }
}

/// Scheduling policy toggles.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Enables local-development conveniences: `demo-` tokens and the
    /// plain-text admin key fallback. Must stay off in production.
    pub dev_mode: bool,
    /// When true, a booking's submitted email must match the invite email.
    pub enforce_email_match: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Argon2 PHC hash of the admin API key.
    pub api_key_hash: Option<String>,
    /// Plain-text admin key accepted only when `schedule.dev_mode` is set.
    pub dev_api_key: Option<String>,
}

/// Outbound transactional email. Sending is disabled unless `from_email`
/// is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub endpoint: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    /// Internal address notified about every new booking.
    pub notify_address: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8720)?
            .set_default("database.max_connections", 4)?
            .set_default("database.acquire_timeout_seconds", 5)?
            .set_default("schedule.dev_mode", false)?
            .set_default("schedule.enforce_email_match", false)?
            .set_default("email.endpoint", "https://api.mailchannels.net/tx/v1/send")?
            .set_default("email.timeout_seconds", 10)?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "postgresql://localhost/greenroom_test".to_string(),
                max_connections: 4,
                acquire_timeout_seconds: 5,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8720,
                public_origin: None,
            },
            schedule: ScheduleConfig {
                dev_mode: false,
                enforce_email_match: false,
            },
            admin: AdminConfig {
                api_key_hash: None,
                dev_api_key: None,
            },
            email: EmailConfig {
                endpoint: "https://api.mailchannels.net/tx/v1/send".to_string(),
                from_email: None,
                from_name: None,
                notify_address: None,
                timeout_seconds: 10,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_origin_format() {
        let settings = test_settings();
        assert_eq!(settings.server.bind_origin(), "http://127.0.0.1:8720");
    }

    #[test]
    fn test_origin_prefers_public_origin() {
        let mut settings = test_settings();
        settings.server.public_origin = Some("https://booking.example.com".to_string());
        assert_eq!(settings.server.origin(), "https://booking.example.com");
    }

    #[test]
    fn test_origin_falls_back_to_bind_address() {
        let settings = test_settings();
        assert_eq!(settings.server.origin(), "http://127.0.0.1:8720");
    }

    #[test]
    fn test_settings_clone() {
        let settings = test_settings();
        let cloned = settings.clone();
        assert_eq!(cloned.database.url, settings.database.url);
        assert_eq!(cloned.server.port, settings.server.port);
        assert!(!cloned.schedule.dev_mode);
    }
}
