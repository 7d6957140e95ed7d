//! Process settings. Values come from an optional TOML file (`settings.toml`
//! by default, see `--config`) overridden by `LEDGER__SECTION__KEY`
//! environment variables.
use std::collections::HashMap;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use server::Mode;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Parser)]
#[command(name = "expense_ledger", about = "Personal expense ledger server")]
struct Args {
    /// Optional settings file path (TOML, extension may be omitted).
    #[arg(long, env = "LEDGER_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    pub mode: Mode,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            mode: Mode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
    Url(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Auth {
    /// token -> owner id
    pub tokens: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        Self::load(path, Environment::with_prefix("LEDGER").separator("__"))
    }

    fn load(path: &str, env: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.tokens.is_empty() {
            tracing::warn!("no auth tokens configured, every request will be rejected");
        }
        if self
            .auth
            .tokens
            .iter()
            .any(|(token, owner)| token.trim().is_empty() || owner.trim().is_empty())
        {
            return Err(SettingsError::Invalid(
                "auth tokens and owners must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Environment::with_prefix("LEDGER")
            .separator("__")
            .source(Some(source))
    }

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load("does/not/exist", env(&[])).unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.app.mode, Mode::Development);
        assert_eq!(settings.server.address(), "127.0.0.1:3000");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.database.url(), "sqlite::memory:");
        assert!(settings.auth.tokens.is_empty());
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::load(
            "does/not/exist",
            env(&[
                ("LEDGER__APP__MODE", "production"),
                ("LEDGER__SERVER__PORT", "8080"),
                ("LEDGER__DATABASE__SQLITE", "ledger.db"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.app.mode, Mode::Production);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.url(), "sqlite:ledger.db?mode=rwc");
    }

    #[test]
    fn empty_owner_is_rejected() {
        let err = Settings::load(
            "does/not/exist",
            env(&[("LEDGER__AUTH__TOKENS__secret", " ")]),
        )
        .unwrap_err();

        assert!(matches!(err, SettingsError::Invalid(_)));
    }
}
