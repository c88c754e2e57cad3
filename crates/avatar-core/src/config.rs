//! Configuration module
//!
//! Server, storage and avatar processing settings, read from the environment
//! (with `.env` support through dotenvy).

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_CONVERSION_TIMEOUT_SECS, DEFAULT_MAX_UPLOAD_KB,
    DEFAULT_PLACEHOLDER_BASE_URL,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const LOCAL_STORAGE_PATH: &str = "./data/media";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/media";

/// Server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// "json" switches the log formatter to structured JSON lines.
    pub log_format: String,
}

/// Avatar storage and processing settings
#[derive(Clone, Debug)]
pub struct AvatarConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub max_upload_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub conversion_timeout_secs: u64,
    pub placeholder_base_url: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AvatarConfig>);

impl Config {
    fn as_avatar(&self) -> &AvatarConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AvatarConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_avatar().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_avatar().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_avatar().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_avatar().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_avatar().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_avatar().base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_avatar().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_avatar().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_avatar().local_storage_base_url
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.as_avatar().max_upload_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_avatar().allowed_content_types
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.as_avatar().conversion_timeout_secs)
    }

    pub fn placeholder_base_url(&self) -> &str {
        &self.as_avatar().placeholder_base_url
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                log_format: "pretty".to_string(),
            },
            storage_backend: StorageBackend::Local,
            local_storage_path: LOCAL_STORAGE_PATH.to_string(),
            local_storage_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_KB * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            conversion_timeout_secs: DEFAULT_CONVERSION_TIMEOUT_SECS,
            placeholder_base_url: DEFAULT_PLACEHOLDER_BASE_URL.to_string(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AvatarConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = AvatarConfig::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.base.environment);

        let server_port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            Err(_) => defaults.base.server_port,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.base.cors_origins);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.storage_backend,
        };

        let max_upload_bytes = match env::var("AVATAR_MAX_UPLOAD_KB") {
            Ok(v) => {
                v.parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("AVATAR_MAX_UPLOAD_KB must be a valid number"))?
                    * 1024
            }
            Err(_) => defaults.max_upload_bytes,
        };

        let conversion_timeout_secs = match env::var("AVATAR_CONVERSION_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("AVATAR_CONVERSION_TIMEOUT_SECS must be a valid number")
            })?,
            Err(_) => defaults.conversion_timeout_secs,
        };

        let config = AvatarConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                log_format: env::var("LOG_FORMAT").unwrap_or(defaults.base.log_format),
            },
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or(defaults.local_storage_path),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or(defaults.local_storage_base_url),
            max_upload_bytes,
            allowed_content_types: env::var("AVATAR_ALLOWED_CONTENT_TYPES")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_content_types),
            conversion_timeout_secs,
            placeholder_base_url: env::var("AVATAR_PLACEHOLDER_BASE_URL")
                .unwrap_or(defaults.placeholder_base_url),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("AVATAR_MAX_UPLOAD_KB must be greater than 0"));
        }
        if self.conversion_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "AVATAR_CONVERSION_TIMEOUT_SECS must be greater than 0"
            ));
        }
        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "AVATAR_ALLOWED_CONTENT_TYPES must list at least one type"
            ));
        }
        if let Some(bad) = self
            .allowed_content_types
            .iter()
            .find(|ct| !ct.starts_with("image/") || ct.as_str() == "image/svg+xml")
        {
            return Err(anyhow::anyhow!(
                "AVATAR_ALLOWED_CONTENT_TYPES contains a non-raster type: {}",
                bad
            ));
        }
        for (name, url) in [
            ("LOCAL_STORAGE_BASE_URL", &self.local_storage_base_url),
            ("AVATAR_PLACEHOLDER_BASE_URL", &self.placeholder_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL: {}", name, url));
            }
        }
        Ok(())
    }
}
