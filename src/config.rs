use anyhow::{Context, Result};

/// Google Cloud Translation v2 endpoint
pub const DEFAULT_TRANSLATE_API_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,

    // Server
    pub host: String,
    pub port: u16,

    // Document store
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Translation provider
    pub translate_api_key: String,
    pub translate_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            // Server
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Document store - unset means in-memory
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            // Translation provider
            translate_api_key: std::env::var("TRANSLATE_API_KEY")
                .context("TRANSLATE_API_KEY not set")?,
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "ENVIRONMENT",
        "HOST",
        "PORT",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "TRANSLATE_API_KEY",
        "TRANSLATE_API_URL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("TRANSLATE_API_KEY", "test-key");

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.environment, "development");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.translate_api_key, "test-key");
        assert_eq!(config.translate_api_url, DEFAULT_TRANSLATE_API_URL);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key() {
        clear_env();

        let result = Config::from_env();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TRANSLATE_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("TRANSLATE_API_KEY", "test-key");
        std::env::set_var("PORT", "9090");
        std::env::set_var("HOST", "127.0.0.1");
        std::env::set_var("DATABASE_URL", "postgres://u:p@localhost/words");
        std::env::set_var("TRANSLATE_API_URL", "http://localhost:1234/translate");

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@localhost/words")
        );
        assert_eq!(config.translate_api_url, "http://localhost:1234/translate");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port_falls_back() {
        clear_env();
        std::env::set_var("TRANSLATE_API_KEY", "test-key");
        std::env::set_var("PORT", "not-a-port");

        let config = Config::from_env().expect("Should load config");
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_blank_database_url_is_none() {
        clear_env();
        std::env::set_var("TRANSLATE_API_KEY", "test-key");
        std::env::set_var("DATABASE_URL", "   ");

        let config = Config::from_env().expect("Should load config");
        assert!(config.database_url.is_none());

        clear_env();
    }
}
