use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://event.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("invalid listen address `{0}`, expected HOST:PORT")]
    InvalidAddress(String),
    #[error("invalid log format `{0}`, expected `pretty` or `json`")]
    InvalidLogFormat(String),
}

// Top-level settings container
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

// HTTP server and logging
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

// SQLite connection
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl Config {
    /// Reads settings from the process environment on top of built-in defaults.
    ///
    /// Recognized variables: `HOST`, `PORT`, `ENVIRONMENT`, `RUST_LOG`,
    /// `LOG_FORMAT`, `DATABASE_URL`, `DB_POOL_SIZE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("environment", "development")?
            .set_default("rust_log", "web_calendar=debug,tower_http=debug")?
            .set_default("log_format", "pretty")?
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("db_pool_size", 5_i64)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(Config {
            app: AppConfig {
                host: settings.get_string("host")?,
                port: settings.get::<u16>("port")?,
                environment: settings.get_string("environment")?,
                rust_log: settings.get_string("rust_log")?,
                log_format: settings.get_string("log_format")?.parse()?,
            },
            database: DatabaseConfig {
                url: settings.get_string("database_url")?,
                pool_size: settings.get::<u32>("db_pool_size")?,
            },
        })
    }

    /// Overrides host and port with a `HOST:PORT` command-line address.
    pub fn with_listen_address(mut self, address: &str) -> Result<Self, ConfigError> {
        let (host, port) = parse_listen_address(address)?;
        self.app.host = host;
        self.app.port = port;
        Ok(self)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_listen_address(address: &str) -> Result<(String, u16), ConfigError> {
    let invalid = || ConfigError::InvalidAddress(address.to_string());

    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;

    Ok((host.to_string(), port))
}
