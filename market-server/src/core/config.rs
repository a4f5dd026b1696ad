//! Server configuration
//!
//! Every setting can be overridden through an environment variable:
//!
//! | variable | default | meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/market | work directory (database, uploads, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | SHIPPING_FEE | 5.00 | flat shipping fee added to every order |
//! | INTEGRITY_INTERVAL_SECS | 300 | period of the integrity check job |

use crate::auth::JwtConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding database, uploads and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Flat shipping fee added to every order total
    pub shipping_fee: f64,
    /// Period of the background integrity check
    pub integrity_interval_secs: u64,
    /// JWT validation config
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/market".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            shipping_fee: std::env::var("SHIPPING_FEE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5.0),
            integrity_interval_secs: std::env::var("INTEGRITY_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            jwt: JwtConfig::default(),
        }
    }

    /// Override the volatile parts; used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if missing.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Environment setup before anything else runs: dotenv, work directory,
/// logging.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    let log_dir = if config.is_production() {
        logs_dir.to_str()
    } else {
        None
    };
    crate::utils::logger::init_logger_with_file(None, log_dir);

    Ok(())
}
