//! Server configuration from flags, environment and an optional TOML file.
//!
//! Precedence: command line / environment, then the config file, then defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
pub const DEFAULT_BOUNDARIES: &str = "data/indonesia_villages.geojson";
pub const DEFAULT_CODES: &str = "data/kode_wilayah.json";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "server")]
#[command(about = "Indonesian administrative region decoding server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, env = "GEODECODE_LISTEN")]
    pub listen: Option<String>,

    /// Boundary dataset (GeoJSON feature collection or border-record array)
    #[arg(short, long, env = "GEOJSON_PATH")]
    pub boundaries: Option<PathBuf>,

    /// Code table (JSON object of code to name)
    #[arg(long, env = "CODES_PATH")]
    pub codes: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long, env = "GEODECODE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub listen: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    pub boundaries: Option<PathBuf>,
    pub codes: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub listen: String,
    pub boundaries: PathBuf,
    pub codes: PathBuf,
}

impl Settings {
    /// Resolve settings, reading the config file if one is given.
    pub fn from_args(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Config file {}", path.display()))?,
            None => Config::default(),
        };
        Ok(Self::merge(args, file))
    }

    pub fn merge(args: Args, file: Config) -> Self {
        Self {
            listen: args
                .listen
                .or(file.server.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
            boundaries: args
                .boundaries
                .or(file.data.boundaries)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BOUNDARIES)),
            codes: args
                .codes
                .or(file.data.codes)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CODES)),
        }
    }
}
