//! Settings management
//!
//! Settings are layered: built-in defaults, then the JSON config file, then
//! `DEPLOYER_*` environment variables, then `--key=value` command line flags.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DeployerError;
use crate::filesys::file::File;
use crate::logs::{LogFormat, LogLevel};

pub const ENV_PREFIX: &str = "DEPLOYER_";

pub const CONFIG_FILE_NAME: &str = "deployer.json";

/// Directories searched for the config file when none is given explicitly
pub const CONFIG_SEARCH_DIRS: [&str; 3] = [".", "./config", "/etc/nomad-deployer"];

/// Keys that can be overridden from the environment or the command line
pub const OVERRIDABLE_KEYS: [&str; 9] = [
    "verbose",
    "log.level",
    "log.format",
    "server.address",
    "server.request_timeout_secs",
    "server.shutdown_timeout_secs",
    "server.log_requests",
    "nomad.url",
    "nomad.timeout_secs",
];

/// Deployer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Shortcut for `log.level = debug`
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub nomad: NomadSettings,

    /// Image repository to the names of the jobs running it
    #[serde(default)]
    pub jobs: HashMap<String, Vec<String>>,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,
}

/// Inbound HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_address")]
    pub address: String,

    /// Upper bound for handling a single request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for draining in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub log_requests: bool,
}

fn default_server_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_server_address(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            log_requests: true,
        }
    }
}

/// Nomad API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomadSettings {
    /// Base URL of the Nomad HTTP API
    #[serde(default = "default_nomad_url")]
    pub url: String,

    /// Deadline for each call to Nomad
    #[serde(default = "default_nomad_timeout")]
    pub timeout_secs: u64,
}

fn default_nomad_url() -> String {
    "http://127.0.0.1:4646".to_string()
}

fn default_nomad_timeout() -> u64 {
    5
}

impl Default for NomadSettings {
    fn default() -> Self {
        Self {
            url: default_nomad_url(),
            timeout_secs: default_nomad_timeout(),
        }
    }
}

impl Settings {
    /// Override a single setting by its dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DeployerError> {
        match key {
            "verbose" => self.verbose = parse_value(key, value)?,
            "log.level" => self.log.level = parse_value(key, value)?,
            "log.format" => self.log.format = parse_value(key, value)?,
            "server.address" => self.server.address = value.to_string(),
            "server.request_timeout_secs" => {
                self.server.request_timeout_secs = parse_value(key, value)?
            }
            "server.shutdown_timeout_secs" => {
                self.server.shutdown_timeout_secs = parse_value(key, value)?
            }
            "server.log_requests" => self.server.log_requests = parse_value(key, value)?,
            "nomad.url" => self.nomad.url = value.to_string(),
            "nomad.timeout_secs" => self.nomad.timeout_secs = parse_value(key, value)?,
            _ => {
                return Err(DeployerError::ConfigError(format!(
                    "unknown setting '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Apply `DEPLOYER_*` variables, e.g. `DEPLOYER_NOMAD_URL` for `nomad.url`
    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<(), DeployerError> {
        for key in OVERRIDABLE_KEYS {
            if let Some(value) = env.get(&env_var_name(key)) {
                self.set(key, value)?;
            }
        }
        Ok(())
    }

    /// Apply command line flags keyed by their dotted setting name
    pub fn apply_flags(&mut self, flags: &HashMap<String, String>) -> Result<(), DeployerError> {
        for key in OVERRIDABLE_KEYS {
            if let Some(value) = flags.get(key) {
                self.set(key, value)?;
            }
        }
        Ok(())
    }

    /// Effective log level
    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log.level
        }
    }
}

/// Environment variable consulted for a dotted setting key
pub fn env_var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.replace('.', "_").to_uppercase())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, DeployerError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| {
        DeployerError::ConfigError(format!("invalid value '{}' for '{}': {}", value, key, e))
    })
}

/// Where the file layer of the settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(PathBuf),
    Defaults,
}

/// Read the settings file.
///
/// An explicitly requested file must exist and parse. Otherwise
/// `deployer.json` is looked up in `search_dirs`; finding none is not an
/// error, but a file that is found and does not parse is.
pub async fn load_settings_file(
    explicit: Option<&Path>,
    search_dirs: &[PathBuf],
) -> Result<(Settings, SettingsSource), DeployerError> {
    if let Some(path) = explicit {
        let settings = read_settings(&File::new(path)).await?;
        return Ok((settings, SettingsSource::File(path.to_path_buf())));
    }

    for dir in search_dirs {
        let file = File::new(dir.join(CONFIG_FILE_NAME));
        if file.exists().await {
            let settings = read_settings(&file).await?;
            return Ok((settings, SettingsSource::File(file.path().to_path_buf())));
        }
    }

    Ok((Settings::default(), SettingsSource::Defaults))
}

async fn read_settings(file: &File) -> Result<Settings, DeployerError> {
    file.read_json::<Settings>().await.map_err(|e| {
        DeployerError::ConfigError(format!(
            "unable to read config file {}: {}",
            file.path().display(),
            e
        ))
    })
}

/// Default config file search path
pub fn default_search_dirs() -> Vec<PathBuf> {
    CONFIG_SEARCH_DIRS.iter().map(PathBuf::from).collect()
}

/// Assemble settings from every layer.
///
/// The config file is taken from `config_path`, else from
/// `DEPLOYER_CONFIG`, else searched for in `search_dirs`.
pub async fn resolve_settings(
    config_path: Option<&Path>,
    env: &HashMap<String, String>,
    flags: &HashMap<String, String>,
    search_dirs: &[PathBuf],
) -> Result<(Settings, SettingsSource), DeployerError> {
    let env_config = env.get(&env_var_name("config")).map(PathBuf::from);
    let config_path = config_path.or(env_config.as_deref());

    let (mut settings, source) = load_settings_file(config_path, search_dirs).await?;
    settings.apply_env(env)?;
    settings.apply_flags(flags)?;

    Ok((settings, source))
}
