//! Process configuration from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::pdf::{PdfSettings, DEFAULT_BROWSER_BIN};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PUBLIC_DIR: &str = "./public";
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_JOB_RETENTION_SECS: u64 = 3600;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub chrome_bin: PathBuf,
    pub pdf_render_timeout: Duration,
    pub market_data_path: Option<PathBuf>,
    pub job_retention: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            chrome_bin: PathBuf::from(DEFAULT_BROWSER_BIN),
            pdf_render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            market_data_path: None,
            job_retention: Duration::from_secs(DEFAULT_JOB_RETENTION_SECS),
            cors_allowed_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or(defaults.host);
        let port = match var("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => defaults.port,
        };
        let public_dir = var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.public_dir);
        let chrome_bin = var("CHROME_BIN")
            .map(PathBuf::from)
            .unwrap_or(defaults.chrome_bin);
        let pdf_render_timeout = match var("PDF_RENDER_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("PDF_RENDER_TIMEOUT_SECS", &raw)?),
            None => defaults.pdf_render_timeout,
        };
        let job_retention = match var("JOB_RETENTION_SECS") {
            Some(raw) => Duration::from_secs(parse_number("JOB_RETENTION_SECS", &raw)?),
            None => defaults.job_retention,
        };
        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(raw) => {
                let origins = split_origins(&raw);
                if origins.is_empty() {
                    return Err(ConfigError::Empty("CORS_ALLOWED_ORIGINS"));
                }
                origins
            }
            None => defaults.cors_allowed_origins,
        };

        Ok(Self {
            host,
            port,
            public_dir,
            chrome_bin,
            pdf_render_timeout,
            market_data_path: var("MARKET_DATA_PATH").map(PathBuf::from),
            job_retention,
            cors_allowed_origins,
        })
    }

    pub fn pdf_settings(&self) -> PdfSettings {
        PdfSettings {
            browser_bin: self.chrome_bin.clone(),
            timeout: self.pdf_render_timeout,
        }
    }

    /// Directory served at `/generated`.
    pub fn generated_dir(&self) -> PathBuf {
        self.public_dir.join("generated")
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_dir, PathBuf::from("./public"));
        assert_eq!(config.pdf_render_timeout, Duration::from_secs(30));
        assert!(config.market_data_path.is_none());
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("PUBLIC_DIR", "/srv/public"),
            ("CHROME_BIN", "/usr/bin/google-chrome"),
            ("PDF_RENDER_TIMEOUT_SECS", "5"),
            ("MARKET_DATA_PATH", "/srv/market.json"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.generated_dir(), PathBuf::from("/srv/public/generated"));
        assert_eq!(config.pdf_settings().browser_bin, PathBuf::from("/usr/bin/google-chrome"));
        assert_eq!(config.pdf_settings().timeout, Duration::from_secs(5));
        assert_eq!(config.market_data_path, Some(PathBuf::from("/srv/market.json")));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidNumber {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
        assert_eq!(
            config_from(&[("CORS_ALLOWED_ORIGINS", " , ")]).unwrap_err(),
            ConfigError::Empty("CORS_ALLOWED_ORIGINS")
        );
    }
}
