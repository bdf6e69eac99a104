//! Configuration loading and validation for hdcat.
//!
//! Three layers, later wins: hard-coded defaults, a TOML file (an explicit
//! path, or `config.toml` in the platform config directory), and `HDCAT_*`
//! environment variables with `__` as the nesting separator — so
//! `HDCAT_ASSIST__API_KEY` lands in `assist.api_key`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hdcat_library::EmptyDrivePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub import: ImportConfig,
    pub assist: AssistConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Location of the catalog database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// What an import of a folder with no files should do.
    pub empty_drives: EmptyDrivePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// API key for the text-generation service. Absent means the assist
    /// features quietly degrade; nothing else is affected.
    pub api_key: Option<String>,
    /// Model override; the client's default applies when unset.
    pub model: Option<String>,
}

impl Config {
    /// Load configuration, layering defaults, a TOML file, and environment.
    ///
    /// With an explicit `file`, that exact file must be readable; otherwise
    /// the platform config path is merged only if it exists.
    pub fn load(file: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        figment = match file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration file");
                figment.merge(Toml::file_exact(path))
            },
            None => match default_config_path() {
                Some(path) => figment.merge(Toml::file(path)),
                None => figment,
            },
        };
        figment
            .merge(Env::prefixed("HDCAT_").split("__"))
            .extract()
            .or_raise(|| ErrorKind::Invalid)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "hdcat", "hdcat")
}

/// Platform path of the optional configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_database_path() -> PathBuf {
    // Falling back to the working directory only happens on systems with no
    // resolvable home directory at all.
    project_dirs()
        .map(|dirs| dirs.data_dir().join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("hdcat-catalog.db"))
}
