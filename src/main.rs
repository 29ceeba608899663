use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_library_server::config::{AppConfig, CliConfig, FileConfig};
use song_library_server::{
    run_server, RequestsLoggingLevel, ServerConfig, SongUseCase, SqliteSongRepository,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(
    version = env!("SONG_LIBRARY_VERSION"),
    about = "HTTP service managing a library of songs"
)]
struct CliArgs {
    /// Path to a TOML config file. CLI arguments and environment variables override it.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite songs database file. Created if missing.
    #[clap(long, env = "SONGS_DB_PATH", value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Seconds a single database operation may take before it fails.
    #[clap(long, env = "SONGS_DB_TIMEOUT_SEC")]
    pub db_timeout_sec: Option<u64>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log filter, e.g. "info" or "song_library_server=debug".
    #[clap(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stdout.
    #[clap(long, env = "LOG_FILE", value_parser = parse_path)]
    pub log_file: Option<PathBuf>,

    /// The level of logging to perform on each request.
    #[clap(long)]
    pub logging_level: Option<RequestsLoggingLevel>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
            db_path: self.db_path.clone(),
            db_timeout_sec: self.db_timeout_sec,
            port: self.port,
            logging_level: self.logging_level.clone(),
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid log level {:?}", config.log_level))?;

    let (stdout_layer, file_layer) = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (Some(tracing_subscriber::fmt::layer()), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    init_logging(&config)?;

    info!("Opening SQLite songs database at {:?}...", config.db_path);
    let repository = Arc::new(SqliteSongRepository::new(&config.db_path)?);
    let song_use_case = SongUseCase::new(repository, config.db_timeout);

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
    };
    run_server(server_config, song_use_case, env!("GIT_HASH").to_string()).await
}
