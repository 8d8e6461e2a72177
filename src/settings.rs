//! Runtime configuration
//!
//! Settings are read from an optional `dashboard.toml` in the working directory and then
//! overridden by environment variables prefixed with `DASHBOARD_`, nested keys separated by
//! a double underscore:
//!
//! ```text
//! DASHBOARD_PORT=8050
//! DASHBOARD_DATABASE__KIND=postgres
//! DASHBOARD_DATABASE__HOST=db.factory.local
//! DASHBOARD_DATABASE__PASSWORD=secret
//! DASHBOARD_DATABASE__SSLMODE=require
//! DASHBOARD_DATABASE__TABLE=producao
//! ```
//!
//! A complete Postgres connection URL may be given in `database.url` instead of the
//! individual connection parameters. For SQLite set `database.kind = "sqlite"` and
//! `database.path`.
use crate::db::DEFAULT_TABLE_NAME;
use anyhow::Result;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "dashboard";
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    /// interface the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: DatabaseSettings,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Postgres,
    Sqlite,
}

/// Transport security towards Postgres, with the same meaning as libpq's `sslmode`
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub kind: DatabaseKind,
    /// full Postgres connection string, takes precedence over the individual parameters
    pub url: Option<String>,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub dbname: String,
    #[serde(default = "default_db_name")]
    pub user: String,
    pub password: Option<String>,
    #[serde(default)]
    pub sslmode: SslMode,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// SQLite database file
    pub path: Option<PathBuf>,
    /// relation holding the production records
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}
fn default_port() -> u16 {
    8050
}
fn default_db_host() -> String {
    "localhost".to_owned()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_name() -> String {
    "postgres".to_owned()
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_table() -> String {
    DEFAULT_TABLE_NAME.to_owned()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::default(),
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            dbname: default_db_name(),
            user: default_db_name(),
            password: None,
            sslmode: SslMode::default(),
            connect_timeout_secs: default_connect_timeout(),
            path: None,
            table: default_table(),
        }
    }
}

impl Settings {
    /// Read settings from `dashboard.toml` (if present) and the process environment
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(environment()),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// address for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
