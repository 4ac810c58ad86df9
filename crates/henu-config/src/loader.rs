//! Reading and parsing config files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error(
        "{}: unsupported config format {extension:?} (expected toml, yaml, yml, json or jsonc)",
        path.display()
    )]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Syntax or schema error from one of the supported formats.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Config file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    /// JSON with `//` and `/* */` comments allowed.
    Json,
}

impl Format {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" | "jsonc" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse `data` into a [`Config`]. Fields left out take their defaults.
    pub fn parse(self, data: &str) -> Result<Config, ParseError> {
        Ok(match self {
            Self::Toml => toml::from_str(data)?,
            Self::Yaml => serde_yaml::from_str(data)?,
            Self::Json => {
                serde_json::from_reader(json_comments::StripComments::new(data.as_bytes()))?
            }
        })
    }
}

/// Load a config file. The format is checked before the file is read.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let format = Format::from_extension(extension).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: extension.to_string(),
    })?;

    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
