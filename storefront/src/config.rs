// bazaar/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Unset means the in-memory store.
  pub database_url: Option<String>,
  pub run_migrations: bool,
  pub seed_db: bool,

  /// Admin routes answer 401 to everyone while this is unset.
  pub admin_api_key: Option<String>,

  pub mail_sender: String,

  /// Reject placements whose submitted totals disagree with the line sum.
  pub enforce_server_totals: bool,
  pub tracking_code_attempts: u32,

  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      run_migrations: true,
      seed_db: false,
      admin_api_key: None,
      mail_sender: "noreply@example.com".to_string(),
      enforce_server_totals: false,
      tracking_code_attempts: 16,
      log_format: LogFormat::Pretty,
    }
  }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) if !raw.trim().is_empty() => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
    _ => Ok(default),
  }
}

fn optional_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let defaults = Self::default();

    let config = Self {
      server_host: optional_var("SERVER_HOST").unwrap_or(defaults.server_host),
      server_port: parse_var("SERVER_PORT", defaults.server_port)?,
      database_url: optional_var("DATABASE_URL"),
      run_migrations: parse_var("RUN_MIGRATIONS", defaults.run_migrations)?,
      seed_db: parse_var("SEED_DB", defaults.seed_db)?,
      admin_api_key: optional_var("ADMIN_API_KEY"),
      mail_sender: optional_var("MAIL_SENDER").unwrap_or(defaults.mail_sender),
      enforce_server_totals: parse_var("ENFORCE_SERVER_TOTALS", defaults.enforce_server_totals)?,
      tracking_code_attempts: parse_var("TRACKING_CODE_ATTEMPTS", defaults.tracking_code_attempts)?,
      log_format: parse_var("LOG_FORMAT", defaults.log_format)?,
    };

    if config.tracking_code_attempts == 0 {
      return Err(AppError::Config("TRACKING_CODE_ATTEMPTS must be at least 1".to_string()));
    }

    tracing::info!(
      server_host = %config.server_host,
      server_port = config.server_port,
      persistent = config.database_url.is_some(),
      admin_enabled = config.admin_api_key.is_some(),
      enforce_server_totals = config.enforce_server_totals,
      "Application configuration loaded."
    );
    Ok(config)
  }
}
