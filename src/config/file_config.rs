use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub logger: Option<LoggerConfig>,
    pub database: Option<DatabaseConfig>,
    pub server: Option<HttpServerConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LoggerConfig {
    /// Any `EnvFilter` directive, e.g. "debug" or "song_library_server=trace".
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct HttpServerConfig {
    pub port: Option<u16>,
    pub logging_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[logger]
log_level = "debug"
log_file = "/tmp/songs.log"

[database]
path = "/var/lib/songs.db"
timeout_sec = 3

[server]
port = 9000
logging_level = "headers"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();

        let logger = config.logger.unwrap();
        assert_eq!(logger.log_level.as_deref(), Some("debug"));
        assert_eq!(logger.log_file.as_deref(), Some("/tmp/songs.log"));
        let database = config.database.unwrap();
        assert_eq!(database.path.as_deref(), Some("/var/lib/songs.db"));
        assert_eq!(database.timeout_sec, Some(3));
        let server = config.server.unwrap();
        assert_eq!(server.port, Some(9000));
        assert_eq!(server.logging_level.as_deref(), Some("headers"));
    }

    #[test]
    fn missing_sections_are_none() {
        let config: FileConfig = toml::from_str("[server]\nport = 1234\n").unwrap();
        assert!(config.logger.is_none());
        assert!(config.database.is_none());
        assert_eq!(config.server.unwrap().port, Some(1234));
    }

    #[test]
    fn rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[database\npath = ").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
