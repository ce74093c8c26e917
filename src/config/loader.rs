//! Configuration loading from disk and the process environment.

use std::path::Path;
use std::fs;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "CHAT_PROXY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidEnv { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// True when the only reason to refuse startup is a missing credential.
    pub fn is_missing_credential(&self) -> bool {
        match self {
            ConfigError::Validation(errors) => errors.iter().any(ValidationError::is_fatal_credential),
            _ => false,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidEnv { name, value } => {
                write!(f, "Invalid value for {}: {:?}", name, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file into a configuration without validating it.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so the overlay can be exercised without
/// touching the real process environment.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY") {
        config.upstream.api_key = Some(key);
    }

    if let Some(url) = lookup("GEMINI_API_URL") {
        config.upstream.url = url;
    }

    if let Some(port) = lookup("PORT") {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port.clone() })?;
    }

    if let Some(origins) = lookup("ALLOWED_ORIGINS") {
        config.security.allowed_origins = parse_origin_list(&origins);
    }

    if let Some(path) = lookup("ERROR_LOG_PATH") {
        config.observability.error_log_path = if path.is_empty() { None } else { Some(path) };
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}

/// Split a comma-separated origin list. Entries keep their exact spelling;
/// only surrounding whitespace and empty entries are dropped.
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the startup configuration: defaults, then the optional TOML file,
/// then environment overrides. Validated before it is returned.
pub fn load_startup_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let env_path = std::env::var(CONFIG_PATH_ENV).ok();
    let file = path.map(Path::to_path_buf).or_else(|| env_path.map(Into::into));

    let mut config = match file {
        Some(p) => read_config_file(&p)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
