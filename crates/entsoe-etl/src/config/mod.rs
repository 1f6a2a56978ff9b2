// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

pub mod validation;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use entsoe_client::{DEFAULT_API_URL, DEFAULT_CUTOFF_HOUR};

pub use validation::{ValidationIssue, ValidationResult};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "entsoe_etl.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub email: EmailSettings,
    pub run: RunConfig,
    pub logging: LoggingConfig,
    /// Environment values that could not be applied
    #[serde(skip)]
    env_errors: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub security_token: String,
    /// Request timeout; unset keeps the HTTP client's default
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            security_token: String::new(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "entsoe.db".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender address; the SMTP username is used when unset
    pub from_address: Option<String>,
    pub alert_recipient: String,
    /// STARTTLS on submission port
    pub use_tls: bool,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: None,
            alert_recipient: String::new(),
            use_tls: true,
        }
    }
}

impl EmailSettings {
    pub fn is_configured(&self) -> bool {
        !self.smtp_host.is_empty() && !self.alert_recipient.is_empty()
    }

    pub fn sender(&self) -> &str {
        self.from_address.as_deref().unwrap_or(&self.smtp_username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Marker whose existence means the historical backfill has completed
    pub state_file: String,
    /// First UTC day of the historical backfill
    pub backfill_start: NaiveDate,
    /// Local Europe/Berlin hour closing the daily window
    pub cutoff_hour: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            state_file: ".last_historical_run".to_owned(),
            backfill_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
        }
    }
}

impl RunConfig {
    pub fn backfill_start_utc(&self) -> DateTime<Utc> {
        self.backfill_start.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log output to this file instead of stdout
    pub file: Option<String>,
}

impl EtlConfig {
    /// Load the TOML file (if present) and apply environment overrides.
    ///
    /// Fails when validation reports errors; warnings are left to the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("SECURITY_TOKEN") {
            self.api.security_token = token;
        }
        if let Some(url) = lookup("ENTSOE_API_URL") {
            self.api.base_url = url;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(host) = lookup("SMTP_SERVER") {
            self.email.smtp_host = host;
        }
        if let Some(port) = lookup("SMTP_PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.email.smtp_port = port,
                Err(_) => self.env_errors.push(ValidationIssue {
                    field: "email.smtp_port".to_owned(),
                    message: format!("SMTP_PORT '{port}' is not a valid port"),
                }),
            }
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.email.smtp_username = user;
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.email.smtp_password = password;
        }
        if let Some(recipient) = lookup("ALERT_EMAIL") {
            self.email.alert_recipient = recipient;
        }
        if let Some(state_file) = lookup("STATE_FILE") {
            self.run.state_file = state_file;
        }
        if let Some(file) = lookup("LOG_FILE") {
            self.logging.file = Some(file);
        }
    }

    pub fn validate_detailed(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.errors.extend(self.env_errors.iter().cloned());

        if self.api.security_token.trim().is_empty() {
            result.add_error(
                "api.security_token",
                "ENTSO-E security token is required (set SECURITY_TOKEN)",
            );
        }
        if self.api.base_url.trim().is_empty() {
            result.add_error("api.base_url", "API base URL cannot be empty");
        }
        if self.api.timeout_secs == Some(0) {
            result.add_error("api.timeout_secs", "Timeout must be greater than 0");
        }

        if self.database.path.trim().is_empty() {
            result.add_error("database.path", "Database path cannot be empty");
        }

        if self.email.is_configured() {
            if self.email.smtp_port == 0 {
                result.add_error("email.smtp_port", "SMTP port must be greater than 0");
            }
            if !self.email.alert_recipient.contains('@') {
                result.add_error(
                    "email.alert_recipient",
                    format!("Invalid recipient address '{}'", self.email.alert_recipient),
                );
            }
            if !self.email.sender().contains('@') {
                result.add_warning(
                    "email.from_address",
                    "Sender is not an email address; alert delivery will likely fail",
                );
            }
        } else {
            result.add_warning(
                "email",
                "SMTP not configured; failure alerts will only be logged",
            );
        }

        if self.run.cutoff_hour > 23 {
            result.add_error(
                "run.cutoff_hour",
                format!("Cutoff hour {} is not a valid hour", self.run.cutoff_hour),
            );
        }
        if self.run.state_file.trim().is_empty() {
            result.add_error("run.state_file", "State file path cannot be empty");
        }

        result
    }

    pub fn validate(&self) -> Result<()> {
        let result = self.validate_detailed();
        if result.has_errors() {
            let messages: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration: {}", messages.join("; "));
        }
        Ok(())
    }
}
