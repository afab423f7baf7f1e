//! # Configuration
//!
//! [`Config`] is the resolved value of every global option for one
//! invocation. It is built once, after argument parsing, and handed to the
//! selected action by reference through [`crate::command::Context`].
//!
//! ## Precedence
//!
//! For each registered option the first source that sets it wins:
//!
//! 1. the command line (`--log-level debug`)
//! 2. the option's environment variable (`CHAINBRIDGE_LOG_LEVEL=debug`)
//! 3. the configuration file
//! 4. the registered default
//!
//! ## Configuration File
//!
//! The file named by `--config`, or `<config dir>/<program>/config.yaml`
//! when that exists, is a flat map from option name to scalar value:
//!
//! ```yaml
//! log-level: debug
//! output: json
//! url: http://localhost:8545
//! ```
//!
//! YAML (`.yaml`, `.yml`), JSON (`.json`) and TOML (`.toml`) are accepted.
//! Underscores in keys are read as hyphens. Keys that are not registered
//! options are kept and can be read with [`Config::get`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::parser::ValueSource;
use clap::ArgMatches;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::{self, OptionKind, OptionSpec};

/// Resolved global options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    values: BTreeMap<String, String>,
    file: Option<PathBuf>,
}

/// A scalar read from a configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FileValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for FileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileValue::Bool(value) => write!(f, "{value}"),
            FileValue::Integer(value) => write!(f, "{value}"),
            FileValue::Float(value) => write!(f, "{value}"),
            FileValue::String(value) => f.write_str(value),
        }
    }
}

/// Output format requested with `--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl Config {
    /// Resolve every option in `globals` from parsed arguments, the
    /// configuration file, and defaults.
    ///
    /// `default_file` is used when the `config` option is unset and the path
    /// exists.
    pub fn resolve(
        globals: &[OptionSpec],
        matches: &ArgMatches,
        default_file: Option<&Path>,
    ) -> Result<Self> {
        let explicit = |spec: &OptionSpec| -> Option<String> {
            let name = spec.name();
            let from_user = matches!(
                matches.value_source(name),
                Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
            );
            if !from_user {
                return None;
            }
            match spec.kind() {
                OptionKind::Flag => Some(matches.get_flag(name).to_string()),
                OptionKind::Value => matches.get_one::<String>(name).cloned(),
            }
        };

        let file = globals
            .iter()
            .find(|spec| spec.name() == options::CONFIG)
            .and_then(&explicit)
            .map(PathBuf::from)
            .or_else(|| default_file.filter(|path| path.is_file()).map(Path::to_path_buf));

        let mut values = match &file {
            Some(path) => load_file(path)?,
            None => BTreeMap::new(),
        };

        for spec in globals {
            if let Some(value) = explicit(spec) {
                values.insert(spec.name().to_string(), value);
            } else if let Some(value) = values.get(spec.name()) {
                if let Some(path) = &file {
                    check_allowed(spec, value, path)?;
                }
            } else if let Some(default) = spec.default() {
                values.insert(spec.name().to_string(), default.to_string());
            } else if spec.kind() == OptionKind::Flag {
                values.insert(spec.name().to_string(), "false".to_string());
            }
        }

        if let Some(path) = &file {
            log::debug!("loaded configuration from {}", path.display());
        }
        Ok(Self { values, file })
    }

    /// Configuration built from explicit values, bypassing resolution.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            file: None,
        }
    }

    /// Raw value of an option or configuration file key.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether a flag option is set.
    ///
    /// Accepts `true`, `yes`, `on` and `1`, case-insensitively.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            )
        })
    }

    /// Parse an option into `T`.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(name)
            .map(|value| {
                value.parse::<T>().map_err(|e| Error::InvalidOptionValue {
                    name: name.to_string(),
                    value: value.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Level for the logger; `info` when unset.
    pub fn log_level(&self) -> Result<LevelFilter> {
        Ok(self
            .parse::<LevelFilter>(options::LOG_LEVEL)?
            .unwrap_or(LevelFilter::Info))
    }

    /// Value of `--color`; `auto` when unset.
    pub fn color(&self) -> &str {
        self.get(options::COLOR).unwrap_or("auto")
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        Ok(self
            .parse::<OutputFormat>(options::OUTPUT)?
            .unwrap_or_default())
    }

    /// The configuration file that was loaded, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Default configuration file location for `program`.
///
/// `~/.config/<program>/config.yaml` on Linux.
pub fn default_config_file(program: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(program).join("config.yaml"))
}

/// Reject a file value outside the option's allowed set, the same way the
/// command line and the environment are checked.
fn check_allowed(spec: &OptionSpec, value: &str, path: &Path) -> Result<()> {
    let allowed = spec.allowed_values();
    if allowed.is_empty() || allowed.iter().any(|candidate| candidate == value) {
        return Ok(());
    }
    Err(Error::Config {
        path: path.to_path_buf(),
        message: format!(
            "invalid value '{value}' for '{}' (expected one of: {})",
            spec.name(),
            allowed.join(", ")
        ),
    })
}

/// Read a flat configuration file into option name/value pairs.
pub fn load_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let error = |message: String| Error::Config {
        path: path.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let raw: BTreeMap<String, FileValue> = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|e| error(e.to_string()))?,
        Some("toml") => toml::from_str(&content).map_err(|e| error(e.to_string()))?,
        Some("yaml") | Some("yml") | None => {
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&content).map_err(|e| error(e.to_string()))?
            }
        }
        Some(other) => {
            return Err(error(format!(
                "unsupported configuration format '.{other}' (expected yaml, json or toml)"
            )))
        }
    };

    Ok(raw
        .into_iter()
        .map(|(key, value)| (key.replace('_', "-"), value.to_string()))
        .collect())
}
