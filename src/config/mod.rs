//! Configuration management for Toxiscope
//!
//! Values are layered: built-in defaults, then the TOML file, then
//! environment variables. CLI flags are applied on top by the binary.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::platform::UpstreamConfig;
use crate::scoring::ProcessScorer;
use crate::{Error, Result};

use file::ToxiscopeConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default session token lifetime
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Longest accepted session token lifetime
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Toxiscope configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database, cache, etc)
    pub data_dir: PathBuf,

    /// SQLite database file
    pub db_path: PathBuf,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Upstream scraping APIs
    pub upstream: UpstreamConfig,

    /// Toxicity classifier process
    pub scorer: ScorerConfig,

    /// Session token signing
    pub auth: AuthConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (dashboard)
    pub static_dir: Option<PathBuf>,
}

/// Toxicity classifier configuration
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Program followed by its arguments, whitespace-separated
    pub command: String,

    /// Upper bound on one scoring run; unbounded when `None`
    pub timeout: Option<Duration>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            command: format!(
                "{} {}",
                crate::scoring::DEFAULT_PROGRAM,
                crate::scoring::DEFAULT_SCRIPT
            ),
            timeout: None,
        }
    }
}

impl ScorerConfig {
    /// Build the process scorer this configuration describes
    ///
    /// # Errors
    ///
    /// Returns `Config` error if the command is blank
    pub fn build(&self) -> Result<ProcessScorer> {
        ProcessScorer::from_command_line(&self.command)
            .map(|s| s.with_timeout(self.timeout))
            .ok_or_else(|| Error::Config("scorer command is empty".to_string()))
    }
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens (from `JWT_SECRET`)
    pub jwt_secret: Option<SecretString>,

    /// Token lifetime in days
    pub token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
        }
    }
}

impl Config {
    /// Load configuration from the config file and process environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file is unreadable or a value is malformed
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file()?;
        let config = Self::from_sources(fc, |key| std::env::var(key).ok())?;

        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// Environment values win over file values. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `Config` error if a numeric value cannot be parsed
    pub fn from_sources<F>(fc: ToxiscopeConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_dir = var("TOXISCOPE_DATA_DIR")
            .or(fc.data_dir)
            .map_or_else(default_data_dir, PathBuf::from);

        let db_path = var("TOXISCOPE_DB_PATH")
            .or(fc.db_path)
            .map_or_else(|| data_dir.join("toxiscope.db"), PathBuf::from);

        let port = match var("TOXISCOPE_PORT").or_else(|| var("PORT")) {
            Some(raw) => parse_value("port", &raw)?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let api_server = ApiServerConfig {
            port,
            static_dir: var("TOXISCOPE_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        let defaults = UpstreamConfig::default();
        let upstream = UpstreamConfig {
            api_key: var("RAPIDAPI_KEY")
                .or(fc.upstream.api_key)
                .map(SecretString::from),
            instagram_endpoint: var("TOXISCOPE_INSTAGRAM_ENDPOINT")
                .or(fc.upstream.instagram_endpoint)
                .unwrap_or(defaults.instagram_endpoint),
            youtube_endpoint: var("TOXISCOPE_YOUTUBE_ENDPOINT")
                .or(fc.upstream.youtube_endpoint)
                .unwrap_or(defaults.youtube_endpoint),
            facebook_endpoint: var("TOXISCOPE_FACEBOOK_ENDPOINT")
                .or(fc.upstream.facebook_endpoint)
                .unwrap_or(defaults.facebook_endpoint),
        };

        let timeout_secs = match var("TOXISCOPE_SCORER_TIMEOUT_SECS") {
            Some(raw) => Some(parse_value::<u64>("scorer timeout", &raw)?),
            None => fc.scorer.timeout_secs,
        };
        let scorer = ScorerConfig {
            command: var("TOXISCOPE_SCORER")
                .or(fc.scorer.command)
                .unwrap_or_else(|| ScorerConfig::default().command),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        };

        let token_ttl_days = match var("TOXISCOPE_TOKEN_TTL_DAYS") {
            Some(raw) => parse_value("token lifetime", &raw)?,
            None => fc.auth.token_ttl_days.unwrap_or(DEFAULT_TOKEN_TTL_DAYS),
        };
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            return Err(Error::Config(format!(
                "token lifetime must be between 1 and {MAX_TOKEN_TTL_DAYS} days, got {token_ttl_days}"
            )));
        }
        let auth = AuthConfig {
            jwt_secret: var("JWT_SECRET")
                .or(fc.auth.jwt_secret)
                .map(SecretString::from),
            token_ttl_days,
        };

        Ok(Self {
            data_dir,
            db_path,
            api_server,
            upstream,
            scorer,
            auth,
        })
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("toxiscope"))
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid {name}: {raw}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn resolve(pairs: &[(&str, &str)], fc: ToxiscopeConfigFile) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_sources(fc, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[], ToxiscopeConfigFile::default()).unwrap();
        assert_eq!(config.api_server.port, DEFAULT_PORT);
        assert!(config.api_server.static_dir.is_none());
        assert!(config.upstream.api_key.is_none());
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(config.auth.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);
        assert_eq!(config.scorer.command, "python3 ml/toxicity_model.py");
        assert!(config.scorer.timeout.is_none());
        assert!(config.db_path.ends_with("toxiscope.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut fc = ToxiscopeConfigFile::default();
        fc.server.port = Some(9000);
        fc.upstream.api_key = Some("from-file".to_string());

        let config = resolve(
            &[("TOXISCOPE_PORT", "8080"), ("RAPIDAPI_KEY", "from-env")],
            fc,
        )
        .unwrap();
        assert_eq!(config.api_server.port, 8080);
        assert_eq!(
            config.upstream.api_key.as_ref().unwrap().expose_secret(),
            "from-env"
        );
    }

    #[test]
    fn test_file_values_apply() {
        let mut fc = ToxiscopeConfigFile::default();
        fc.server.port = Some(9000);
        fc.scorer.timeout_secs = Some(30);
        fc.auth.jwt_secret = Some("s3cret".to_string());

        let config = resolve(&[], fc).unwrap();
        assert_eq!(config.api_server.port, 9000);
        assert_eq!(config.scorer.timeout, Some(Duration::from_secs(30)));
        assert!(config.auth.jwt_secret.is_some());
    }

    #[test]
    fn test_port_fallback_and_blank_values() {
        let config = resolve(&[("PORT", "5000"), ("JWT_SECRET", "  ")], ToxiscopeConfigFile::default())
            .unwrap();
        assert_eq!(config.api_server.port, 5000);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_db_path_follows_data_dir() {
        let config = resolve(&[("TOXISCOPE_DATA_DIR", "/srv/toxiscope")], ToxiscopeConfigFile::default())
            .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/srv/toxiscope/toxiscope.db"));
    }

    #[test]
    fn test_invalid_port() {
        let err = resolve(&[("TOXISCOPE_PORT", "not-a-port")], ToxiscopeConfigFile::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_token_ttl_out_of_range() {
        for raw in ["9223372036854775807", "0", "-3"] {
            let err = resolve(&[("TOXISCOPE_TOKEN_TTL_DAYS", raw)], ToxiscopeConfigFile::default())
                .unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{raw}");
        }

        let mut fc = ToxiscopeConfigFile::default();
        fc.auth.token_ttl_days = Some(i64::MAX);
        assert!(matches!(resolve(&[], fc).unwrap_err(), Error::Config(_)));

        let config = resolve(&[("TOXISCOPE_TOKEN_TTL_DAYS", "30")], ToxiscopeConfigFile::default())
            .unwrap();
        assert_eq!(config.auth.token_ttl_days, 30);
    }

    #[test]
    fn test_scorer_build() {
        let scorer = ScorerConfig {
            command: "node score.js --fast".to_string(),
            timeout: Some(Duration::from_secs(5)),
        }
        .build()
        .unwrap();
        assert_eq!(scorer.program(), "node");

        let blank = ScorerConfig {
            command: "  ".to_string(),
            timeout: None,
        };
        assert!(blank.build().is_err());
    }
}
