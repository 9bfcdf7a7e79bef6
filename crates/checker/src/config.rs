use std::time::Duration;
use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backoff::Backoff;
use crate::region::RegionRouter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("failed to write config: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("no config path available: neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigPathUnavailable,
}

/// Immutable per-process configuration, built once at start-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Expected as `Authorization: Basic <secret>`; empty disables the check
    pub secret: String,
    pub server: Server,
    pub region: Region,
    pub analytics: Analytics,
    pub status_store: StatusStoreConfig,
    pub backoff: BackoffConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Region this instance executes in
    pub name: String,
    /// Forwarding is only evaluated behind the `fly` routing proxy
    pub cloud_provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analytics {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusStoreConfig {
    pub endpoint: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub multiplier: f64,
    pub randomization: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
}

impl Default for Server {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self { name: "local".into(), cloud_provider: String::new() }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { initial_interval_ms: 500, max_interval_ms: 10_000, multiplier: 2.0, randomization: 0.5 }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { user_agent: concat!("checker/", env!("CARGO_PKG_VERSION")).into() }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            server: Server::default(),
            region: Region::default(),
            analytics: Analytics::default(),
            status_store: StatusStoreConfig::default(),
            backoff: BackoffConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl From<&BackoffConfig> for Backoff {
    fn from(config: &BackoffConfig) -> Self {
        Backoff::new(
            Duration::from_millis(config.initial_interval_ms),
            Duration::from_millis(config.max_interval_ms),
        )
        .with_multiplier(config.multiplier)
        .with_randomization(config.randomization)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/checker/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("checker/config.toml"))
}

fn redact(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { "********" }
}

impl fmt::Display for CheckerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let unset = String::from("(unset)");

        writeln!(f, "Current Checker Configuration:")?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Region")?;
        write_1(f, "Name", &self.region.name)?;
        write_1(f, "Cloud Provider", &self.region.cloud_provider)?;
        write_1(f, "Forwarding", &self.forwarding_enabled())?;
        write_title_1(f, "Auth")?;
        write_1(f, "Secret", &redact(&self.secret))?;
        write_title_1(f, "Analytics")?;
        write_1(f, "Endpoint", self.analytics.endpoint.as_ref().unwrap_or(&unset))?;
        write_1(f, "Token", &redact(self.analytics.token.as_deref().unwrap_or_default()))?;
        write_title_1(f, "Status Store")?;
        write_1(f, "Endpoint", self.status_store.endpoint.as_ref().unwrap_or(&unset))?;
        write_1(f, "Secret", &redact(self.status_store.secret.as_deref().unwrap_or_default()))?;
        write_title_1(f, "Backoff")?;
        write_1(f, "Initial Interval (ms)", &self.backoff.initial_interval_ms)?;
        write_1(f, "Max Interval (ms)", &self.backoff.max_interval_ms)?;
        write_1(f, "Multiplier", &self.backoff.multiplier)?;
        write_1(f, "Randomization", &self.backoff.randomization)?;

        Ok(())
    }
}

impl CheckerConfig {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/checker/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// let cfg = checker::CheckerConfig::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), checker::config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }

    pub fn forwarding_enabled(&self) -> bool {
        self.region.cloud_provider.eq_ignore_ascii_case("fly")
    }

    pub fn router(&self) -> RegionRouter {
        if self.forwarding_enabled() {
            RegionRouter::new(self.region.name.clone())
        } else {
            RegionRouter::disabled(self.region.name.clone())
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::from(&self.backoff)
    }
}
