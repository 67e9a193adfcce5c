use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseSettings,
    pub fixtures: FixtureSettings,
    pub logging: LoggingSettings,
}

/// Where the PostgreSQL database lives and how to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: String,
    /// Host name, optionally with a `:port` suffix.
    pub host: String,
    /// Name of the database on the server.
    pub name: String,
    /// A complete connection string. When set, the four fields above are ignored.
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseSettings {
    /// The connection string handed to the driver.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgresql://{}:{}@{}/{}",
                self.user, self.password, self.host, self.name
            ),
        }
    }

    /// Same as [`Self::connection_url`] with the password masked, safe to log.
    pub fn redacted_url(&self) -> String {
        match &self.url {
            Some(_) => "<DATABASE_URL>".to_string(),
            None => format!("postgresql://{}:***@{}/{}", self.user, self.host, self.name),
        }
    }
}

/// Seed data location for the `load` command.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `bookstore=debug,sqlx=warn`.
    /// `RUST_LOG` wins over this when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    Full,
    Compact,
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_some() {
            return Ok(());
        }
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.host must not be empty".to_string(),
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
