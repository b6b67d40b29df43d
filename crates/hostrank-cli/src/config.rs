use anyhow::{Context, Result, bail};
use hostrank_core::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "hostrank.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset root walked by `hostrank batch` when no directory is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Only files directly inside directories with this name are analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: None,
            subdir: None,
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_source_column")]
    pub source_column: ColumnRef,
    #[serde(default = "default_dest_column")]
    pub dest_column: ColumnRef,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source_column: default_source_column(),
            dest_column: default_dest_column(),
            delimiter: default_delimiter(),
        }
    }
}

impl InputConfig {
    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match u8::try_from(self.delimiter) {
            Ok(b) if b.is_ascii() => Ok(b),
            _ => bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write attribute files here instead of beside each input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            suffix: default_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Files analyzed in parallel. 1 means sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

/// A CSV column, by header name or zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl FromStr for ColumnRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<usize>()
            .map_or_else(|_| Self::Name(s.to_string()), Self::Index))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

fn default_extension() -> String {
    "binetflow".to_string()
}

fn default_source_column() -> ColumnRef {
    ColumnRef::Name("SrcAddr".to_string())
}

fn default_dest_column() -> ColumnRef {
    ColumnRef::Name("DstAddr".to_string())
}

const fn default_delimiter() -> char {
    ','
}

fn default_suffix() -> String {
    "_attributes.csv".to_string()
}

const fn default_jobs() -> usize {
    1
}

/// Where the effective configuration came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RunConfig,
    pub source: Option<PathBuf>,
}

/// Load the run configuration.
///
/// Resolution: `explicit` (must exist) → `./hostrank.toml` →
/// `<config dir>/hostrank/config.toml` → defaults.
pub fn load_run_config(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        return Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
        });
    }

    let candidates = std::iter::once(cwd.join(LOCAL_CONFIG_FILE))
        .chain(dirs::config_dir().map(|dir| dir.join("hostrank/config.toml")));
    for path in candidates {
        if path.exists() {
            let config = read_config(&path)?;
            return Ok(LoadedConfig {
                config,
                source: Some(path),
            });
        }
    }

    Ok(LoadedConfig {
        config: RunConfig::default(),
        source: None,
    })
}

fn read_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str::<RunConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
