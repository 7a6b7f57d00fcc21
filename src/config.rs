//! Configuration file loading.
//!
//! The configuration is a single `[Configuration]` section, written either as
//! TOML or as a plain INI file:
//!
//! ```toml
//! [Configuration]
//! PlantUMLPath = "tools/plantuml.jar"
//! PackagePath = "https://www.nuget.org/packages/Newtonsoft.Json"
//! MaxDepth = 2
//! ```
//!
//! ```ini
//! [Configuration]
//! plantumlpath = tools/plantuml.jar
//! packagepath = https://www.nuget.org/packages/Newtonsoft.Json
//! maxdepth = 2
//! ```
//!
//! Key names are case-insensitive. `PackagePath` and `MaxDepth` are required;
//! everything else has a default.

use crate::graph::MergePolicy;
use ini::{Ini, ParseOption};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SECTION: &str = "Configuration";
pub const DEFAULT_RENDERER: &str = "plantuml";
pub const DEFAULT_OUTPUT: &str = "dependencies.puml";
pub const DEFAULT_JAVA: &str = "java";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the renderer jar handed to the Java launcher.
    pub renderer_path: String,
    /// Package page URL of the root package.
    pub package_url: String,
    /// Maximum number of link hops from the root page, counting the root as 1.
    pub max_depth: u32,
    pub output: PathBuf,
    pub java: String,
    pub merge_policy: MergePolicy,
    pub timeout: Duration,
}

/// On-disk syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Ini,
    /// Try TOML first, then INI.
    Auto,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("ini" | "cfg" | "conf") => ConfigFormat::Ini,
            _ => ConfigFormat::Auto,
        }
    }
}

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file does not exist
    NotFound(PathBuf),
    /// The file exists but could not be read
    Read(PathBuf, std::io::Error),
    /// The file is not valid TOML
    Parse(toml::de::Error),
    /// The file is not valid INI
    ParseIni(ini::ParseError),
    /// No `[Configuration]` section
    MissingSection,
    /// A required key is absent
    MissingKey(&'static str),
    /// A key is present but its value is unusable
    InvalidValue { key: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::Read(path, _) => write!(f, "Failed to read {}", path.display()),
            ConfigError::Parse(_) => write!(f, "Failed to parse configuration as TOML"),
            ConfigError::ParseIni(_) => write!(f, "Failed to parse configuration as INI"),
            ConfigError::MissingSection => {
                write!(f, "Configuration is missing the [{}] section", SECTION)
            }
            ConfigError::MissingKey(key) => {
                write!(f, "Configuration is missing required key '{}'", key)
            }
            ConfigError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::ParseIni(e) => Some(e),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ini::ParseError> for ConfigError {
    fn from(e: ini::ParseError) -> Self {
        ConfigError::ParseIni(e)
    }
}

/// Read and validate the configuration file at `path`.
///
/// `.toml` files are parsed as TOML, `.ini`/`.cfg`/`.conf` as INI, anything
/// else as TOML with an INI fallback.
pub fn load_configuration(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    Config::parse(&content, ConfigFormat::from_path(path))
}

/// The `[Configuration]` section with lowercased keys.
type Section = BTreeMap<String, toml::Value>;

impl Config {
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => Self::from_toml_str(content),
            ConfigFormat::Ini => Self::from_ini_str(content),
            ConfigFormat::Auto => match toml_section(content) {
                Ok(section) => Self::from_section(section),
                Err(toml_err) => {
                    log::debug!("Not TOML ({}), trying INI", toml_err);
                    Self::from_ini_str(content)
                }
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_section(toml_section(content)?)
    }

    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        // Values are taken literally: no quote stripping, no backslash escapes
        // (Windows paths stay intact).
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)?;
        let properties = ini
            .iter()
            .find(|(name, _)| name.is_some_and(|n| n.eq_ignore_ascii_case(SECTION)))
            .map(|(_, props)| props)
            .ok_or(ConfigError::MissingSection)?;

        let section = properties
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), toml::Value::String(v.to_string())))
            .collect();
        Self::from_section(section)
    }

    fn from_section(section: Section) -> Result<Self, ConfigError> {
        let package_url = text(&section, "PackagePath")?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingKey("PackagePath"))?;

        let max_depth = section
            .get("maxdepth")
            .ok_or(ConfigError::MissingKey("MaxDepth"))
            .and_then(|v| positive_integer("MaxDepth", v))?;
        let max_depth = u32::try_from(max_depth).map_err(|_| ConfigError::InvalidValue {
            key: "MaxDepth",
            reason: format!("{} is too large", max_depth),
        })?;

        let timeout_secs = match section.get("timeout") {
            Some(v) => positive_integer("Timeout", v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let merge_policy = match text(&section, "MergePolicy")? {
            Some(s) => s
                .parse::<MergePolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "MergePolicy",
                    reason,
                })?,
            None => MergePolicy::default(),
        };

        Ok(Config {
            renderer_path: text(&section, "PlantUMLPath")?
                .unwrap_or_else(|| DEFAULT_RENDERER.to_string()),
            package_url,
            max_depth,
            output: text(&section, "Output")?
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            java: text(&section, "Java")?.unwrap_or_else(|| DEFAULT_JAVA.to_string()),
            merge_policy,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn toml_section(content: &str) -> Result<Section, ConfigError> {
    let doc: toml::Table = toml::from_str(content)?;
    let table = doc
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SECTION))
        .and_then(|(_, value)| match value {
            toml::Value::Table(table) => Some(table),
            _ => None,
        })
        .ok_or(ConfigError::MissingSection)?;

    Ok(table
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect())
}

/// Scalar value of `key` as text. Tables and arrays are rejected.
fn text(section: &Section, key: &'static str) -> Result<Option<String>, ConfigError> {
    match section.get(&key.to_lowercase()) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_))) => {
            Ok(Some(v.to_string()))
        }
        Some(v) => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected a string, got {}", v.type_str()),
        }),
    }
}

fn positive_integer(key: &'static str, value: &toml::Value) -> Result<u64, ConfigError> {
    let parsed = match value {
        toml::Value::Integer(i) => Some(*i),
        toml::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 1 => Ok(n as u64),
        Some(n) => Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be at least 1, got {}", n),
        }),
        None => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected an integer, got {}", value),
        }),
    }
}
