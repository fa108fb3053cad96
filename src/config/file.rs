//! TOML configuration file loading
//!
//! Supports `~/.config/toxiscope/config.toml` as a persistent config source.
//! Every field is optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ToxiscopeConfigFile {
    /// Override for the data directory
    pub data_dir: Option<String>,

    /// Override for the SQLite database path
    pub db_path: Option<String>,

    #[serde(default)]
    pub server: ServerFileConfig,

    #[serde(default)]
    pub upstream: UpstreamFileConfig,

    #[serde(default)]
    pub scorer: ScorerFileConfig,

    #[serde(default)]
    pub auth: AuthFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,

    /// Directory holding the built dashboard
    pub static_dir: Option<String>,
}

/// Upstream scraping API configuration
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamFileConfig {
    /// RapidAPI key
    pub api_key: Option<String>,
    pub instagram_endpoint: Option<String>,
    pub youtube_endpoint: Option<String>,
    pub facebook_endpoint: Option<String>,
}

/// Toxicity classifier configuration
#[derive(Debug, Default, Deserialize)]
pub struct ScorerFileConfig {
    /// Command line, e.g. `python3 ml/toxicity_model.py`
    pub command: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Token signing configuration
#[derive(Debug, Default, Deserialize)]
pub struct AuthFileConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_days: Option<i64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ToxiscopeConfigFile::default()` if there is no file.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed
pub fn load_config_file() -> Result<ToxiscopeConfigFile> {
    match config_file_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(ToxiscopeConfigFile::default()),
    }
}

/// Parse a config file at an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn load_from(path: &Path) -> Result<ToxiscopeConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/toxiscope/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("toxiscope").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_path = "/tmp/toxiscope.db"

[server]
port = 9000

[scorer]
command = "python3 model.py"
"#
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/tmp/toxiscope.db"));
        assert_eq!(config.server.port, Some(9000));
        assert_eq!(config.scorer.command.as_deref(), Some("python3 model.py"));
        assert!(config.upstream.api_key.is_none());
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            load_from(file.path()).unwrap_err(),
            crate::Error::Toml(_)
        ));
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("toxiscope/config.toml"));
        }
    }
}
