use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub agents: AgentsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Where the router sends collaborator calls and how long each call may take.
#[derive(Clone, Debug)]
pub struct AgentsConfig {
    pub mode: AgentMode,
    pub data_base_url: String,
    pub support_base_url: String,
    pub lookup_timeout_secs: u64,
    pub fanout_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    InProcess,
    Http,
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
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub agent_mode: Option<AgentMode>,
    pub data_base_url: Option<String>,
    pub support_base_url: Option<String>,
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
            database: DatabaseConfig {
                url: "sqlite://helpdesk.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 9101 },
            agents: AgentsConfig {
                mode: AgentMode::InProcess,
                data_base_url: "http://127.0.0.1:9101".to_string(),
                support_base_url: "http://127.0.0.1:9101".to_string(),
                lookup_timeout_secs: 15,
                fanout_timeout_secs: 25,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AgentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProcess => "in_process",
            Self::Http => "http",
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "in_process" => Ok(Self::InProcess),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Validation(format!(
                "unsupported agents.mode `{other}` (expected in_process|http)"
            ))),
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("helpdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(agents) = patch.agents {
            if let Some(mode) = agents.mode {
                self.agents.mode = mode;
            }
            if let Some(data_base_url) = agents.data_base_url {
                self.agents.data_base_url = data_base_url;
            }
            if let Some(support_base_url) = agents.support_base_url {
                self.agents.support_base_url = support_base_url;
            }
            if let Some(lookup_timeout_secs) = agents.lookup_timeout_secs {
                self.agents.lookup_timeout_secs = lookup_timeout_secs;
            }
            if let Some(fanout_timeout_secs) = agents.fanout_timeout_secs {
                self.agents.fanout_timeout_secs = fanout_timeout_secs;
            }
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
        if let Some(value) = read_env("HELPDESK_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("HELPDESK_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("HELPDESK_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("HELPDESK_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("HELPDESK_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("HELPDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HELPDESK_SERVER_PORT") {
            self.server.port = parse_u16("HELPDESK_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("HELPDESK_AGENTS_MODE") {
            self.agents.mode = value.parse()?;
        }
        if let Some(value) = read_env("HELPDESK_AGENTS_DATA_BASE_URL") {
            self.agents.data_base_url = value;
        }
        if let Some(value) = read_env("HELPDESK_AGENTS_SUPPORT_BASE_URL") {
            self.agents.support_base_url = value;
        }
        if let Some(value) = read_env("HELPDESK_AGENTS_LOOKUP_TIMEOUT_SECS") {
            self.agents.lookup_timeout_secs =
                parse_u64("HELPDESK_AGENTS_LOOKUP_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("HELPDESK_AGENTS_FANOUT_TIMEOUT_SECS") {
            self.agents.fanout_timeout_secs =
                parse_u64("HELPDESK_AGENTS_FANOUT_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("HELPDESK_LOGGING_LEVEL").or_else(|| read_env("HELPDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HELPDESK_LOGGING_FORMAT").or_else(|| read_env("HELPDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(mode) = overrides.agent_mode {
            self.agents.mode = mode;
        }
        if let Some(data_base_url) = overrides.data_base_url {
            self.agents.data_base_url = data_base_url;
        }
        if let Some(support_base_url) = overrides.support_base_url {
            self.agents.support_base_url = support_base_url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_agents(&self.agents)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("helpdesk.toml"), PathBuf::from("config/helpdesk.toml")]
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

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_agents(agents: &AgentsConfig) -> Result<(), ConfigError> {
    for (key, url) in [
        ("agents.data_base_url", &agents.data_base_url),
        ("agents.support_base_url", &agents.support_base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https:// (got `{url}`)"
            )));
        }
    }

    for (key, timeout_secs) in [
        ("agents.lookup_timeout_secs", agents.lookup_timeout_secs),
        ("agents.fanout_timeout_secs", agents.fanout_timeout_secs),
    ] {
        if timeout_secs == 0 || timeout_secs > 300 {
            return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
        }
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

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
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
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    agents: Option<AgentsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentsPatch {
    mode: Option<AgentMode>,
    data_base_url: Option<String>,
    support_base_url: Option<String>,
    lookup_timeout_secs: Option<u64>,
    fanout_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
