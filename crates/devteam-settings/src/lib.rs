//! Application settings
//!
//! Settings come from a TOML file plus environment overrides for
//! credentials, so passwords never have to live in the checked-in
//! configuration. Every section has workable defaults; a missing file
//! yields the default configuration.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use devteam_connection::PoolConfig;
use devteam_core::ConnectParams;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the database user
pub const ENV_DB_USER: &str = "DEVTEAM_DB_USER";
/// Environment variable overriding the database password
pub const ENV_DB_PASSWORD: &str = "DEVTEAM_DB_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub pool: PoolSettings,
}

impl AppSettings {
    /// Load settings from a TOML file and apply environment overrides.
    ///
    /// A missing file is not an error; it yields the defaults. A file that
    /// exists but cannot be read or parsed is.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse settings from {:?}", path))?
        } else {
            tracing::info!(path = %path.display(), "settings file not found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Pull credentials from the environment, if set.
    ///
    /// Environment values win over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(user) = std::env::var(ENV_DB_USER) {
            self.database.user = Some(user);
        }
        if let Ok(password) = std::env::var(ENV_DB_PASSWORD) {
            self.database.password = Some(password);
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    /// The socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address: {}:{}", self.bind, self.port))
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Driver ID (e.g., "postgres")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 = driver default)
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 0,
            database: "devteam".to_string(),
            user: None,
            password: None,
        }
    }
}

impl DatabaseSettings {
    /// Connection parameters for the configured driver
    pub fn connect_params(&self) -> ConnectParams {
        let mut params = ConnectParams::new(&self.driver, &self.host, &self.database)
            .with_port(self.port);
        if let Some(user) = &self.user {
            params = params.with_user(user);
        }
        if let Some(password) = &self.password {
            params = params.with_password(password);
        }
        params
    }
}

/// Connection pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Connections opened up front
    pub min_size: usize,
    /// Upper bound on live connections
    pub max_size: usize,
    /// Bounded acquire wait in milliseconds; absent means block until free
    pub acquire_timeout_ms: Option<u64>,
    /// Idle connections older than this are recycled, in milliseconds
    pub idle_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_size: 2,
            max_size: 10,
            acquire_timeout_ms: None,
            idle_timeout_ms: 600_000,
        }
    }
}

impl PoolSettings {
    /// Validate and convert into a pool configuration
    pub fn pool_config(&self) -> Result<PoolConfig> {
        if self.max_size == 0 {
            bail!("pool.max_size must be greater than 0");
        }
        if self.min_size > self.max_size {
            bail!(
                "pool.min_size ({}) cannot exceed pool.max_size ({})",
                self.min_size,
                self.max_size
            );
        }

        let mut config = PoolConfig::new(self.min_size, self.max_size)
            .with_idle_timeout_ms(self.idle_timeout_ms);
        if let Some(timeout) = self.acquire_timeout_ms {
            config = config.with_acquire_timeout_ms(timeout);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let settings = AppSettings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.driver, "postgres");
        assert_eq!(settings.pool.min_size, 2);
        assert!(settings.pool.acquire_timeout_ms.is_none());
        assert!(settings.server.addr().is_ok());
        assert!(settings.pool.pool_config().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: AppSettings = toml::from_str(
            r#"
            [server]
            port = 9000

            [database]
            host = "db.internal"
            user = "devteam"

            [pool]
            min_size = 1
            max_size = 3
            acquire_timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.database, "devteam");

        let config = settings.pool.pool_config().unwrap();
        assert_eq!(config.min_size(), 1);
        assert_eq!(config.max_size(), 3);
        assert_eq!(
            config.acquire_timeout(),
            Some(std::time::Duration::from_millis(5000))
        );
    }

    #[test]
    fn invalid_pool_sizes_are_rejected() {
        let zero_max = PoolSettings {
            max_size: 0,
            ..Default::default()
        };
        assert!(zero_max.pool_config().is_err());

        let inverted = PoolSettings {
            min_size: 5,
            max_size: 3,
            ..Default::default()
        };
        assert!(inverted.pool_config().is_err());
    }

    #[test]
    fn connect_params_carry_credentials() {
        let database = DatabaseSettings {
            user: Some("devteam".into()),
            password: Some("secret".into()),
            port: 5433,
            ..Default::default()
        };

        let params = database.connect_params();
        assert_eq!(params.driver, "postgres");
        assert_eq!(params.port, 5433);
        assert_eq!(params.user.as_deref(), Some("devteam"));
        assert_eq!(params.password.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = AppSettings::load(Path::new("/nonexistent/devteam.toml")).unwrap();
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server").unwrap();
        assert!(AppSettings::load(file.path()).is_err());
    }

    #[test]
    fn file_values_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 3030").unwrap();

        let settings = AppSettings::load(file.path()).unwrap();
        assert_eq!(settings.server.port, 3030);
    }
}
