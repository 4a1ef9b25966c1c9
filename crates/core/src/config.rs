use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locale::Locale;

pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";
pub const DEFAULT_AGENT_ID: &str = "ag:fff2a3f7:20251012:untitled-agent:4a81e5a0";
pub const DEFAULT_AGENT_BASE_URL: &str = "https://api.mistral.ai";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub agent_id: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub locale: Locale,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub agent_base_url: Option<String>,
    pub agent_id: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub locale: Option<Locale>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig {
                api_key: None,
                base_url: DEFAULT_AGENT_BASE_URL.to_string(),
                agent_id: DEFAULT_AGENT_ID.to_string(),
                timeout_secs: 60,
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            relay: RelayConfig { locale: Locale::En },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AgentConfig {
    /// Returns the credential only when it holds a non-blank value.
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.expose_secret().trim().is_empty())
    }

    pub fn conversations_url(&self) -> String {
        format!("{}/v1/conversations", self.base_url.trim_end_matches('/'))
    }
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("carebridge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(agent) = patch.agent {
            if let Some(api_key) = agent.api_key {
                self.agent.api_key = Some(api_key.into());
            }
            if let Some(base_url) = agent.base_url {
                self.agent.base_url = base_url;
            }
            if let Some(agent_id) = agent.agent_id {
                self.agent.agent_id = agent_id;
            }
            if let Some(timeout_secs) = agent.timeout_secs {
                self.agent.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(locale) = patch.relay.and_then(|relay| relay.locale) {
            self.relay.locale = locale;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env(API_KEY_ENV) {
            self.agent.api_key = Some(value.into());
        }
        if let Some(value) = read_env("CAREBRIDGE_AGENT_BASE_URL") {
            self.agent.base_url = value;
        }
        if let Some(value) = read_env("CAREBRIDGE_AGENT_ID") {
            self.agent.agent_id = value;
        }
        if let Some(value) = read_env("CAREBRIDGE_AGENT_TIMEOUT_SECS") {
            self.agent.timeout_secs = parse_u64("CAREBRIDGE_AGENT_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CAREBRIDGE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CAREBRIDGE_SERVER_PORT") {
            self.server.port = parse_u16("CAREBRIDGE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CAREBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("CAREBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("CAREBRIDGE_LOCALE") {
            self.relay.locale = value.parse()?;
        }

        let log_level =
            read_env("CAREBRIDGE_LOGGING_LEVEL").or_else(|| read_env("CAREBRIDGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CAREBRIDGE_LOGGING_FORMAT").or_else(|| read_env("CAREBRIDGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_key) = overrides.api_key {
            self.agent.api_key = Some(api_key.into());
        }
        if let Some(base_url) = overrides.agent_base_url {
            self.agent.base_url = base_url;
        }
        if let Some(agent_id) = overrides.agent_id {
            self.agent.agent_id = agent_id;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(locale) = overrides.locale {
            self.relay.locale = locale;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_agent(&self.agent)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("carebridge.toml"), PathBuf::from("config/carebridge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    let base_url = agent.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "agent.base_url must start with http:// or https://".to_string(),
        ));
    }

    if agent.agent_id.trim().is_empty() {
        return Err(ConfigError::Validation("agent.agent_id must not be empty".to_string()));
    }

    if agent.timeout_secs == 0 || agent.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "agent.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    agent: Option<AgentPatch>,
    server: Option<ServerPatch>,
    relay: Option<RelayPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    agent_id: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RelayPatch {
    locale: Option<Locale>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
