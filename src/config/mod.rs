mod file_config;

pub use file_config::{DatabaseConfig, FileConfig, HttpServerConfig, LoggerConfig};

use crate::server::RequestsLoggingLevel;
use crate::song::DEFAULT_STORE_TIMEOUT;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_PORT: u16 = 8080;

/// Values taken from the command line or the environment.
/// Anything set here wins over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub db_timeout_sec: Option<u64>,
    pub port: Option<u16>,
    pub logging_level: Option<RequestsLoggingLevel>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// `None` logs to stdout.
    pub log_file: Option<PathBuf>,
    pub db_path: PathBuf,
    pub db_timeout: Duration,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from defaults, an optional TOML file config and
    /// CLI arguments, in increasing order of precedence.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let logger = file.logger.unwrap_or_default();
        let database = file.database.unwrap_or_default();
        let server = file.server.unwrap_or_default();

        let log_level = cli
            .log_level
            .clone()
            .or(logger.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        if let Err(err) = EnvFilter::try_new(&log_level) {
            bail!("Invalid log level {:?}: {}", log_level, err);
        }

        let log_file = cli
            .log_file
            .clone()
            .or_else(|| logger.log_file.map(PathBuf::from));

        let db_path = cli
            .db_path
            .clone()
            .or_else(|| database.path.map(PathBuf::from))
            .ok_or_else(|| {
                anyhow!("database path must be specified via --db-path or in config file")
            })?;

        let db_timeout = match cli.db_timeout_sec.or(database.timeout_sec) {
            Some(0) => bail!("database timeout must be greater than zero"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_STORE_TIMEOUT,
        };

        let port = cli.port.or(server.port).unwrap_or(DEFAULT_PORT);

        let logging_level = match cli.logging_level.clone() {
            Some(level) => level,
            None => match server.logging_level {
                Some(s) => parse_logging_level(&s)
                    .ok_or_else(|| anyhow!("Invalid request logging level: {:?}", s))?,
                None => RequestsLoggingLevel::default(),
            },
        };

        Ok(Self {
            log_level,
            log_file,
            db_path,
            db_timeout,
            port,
            logging_level,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
