mod error;
mod log;
mod output_format;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use snafu::ResultExt;

pub use self::{error::Error, log::LogConfig, output_format::OutputFormat};
use crate::consts;

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace used when `--namespace` is not given.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Upper bound on a resolution, in seconds.
    #[serde(default = "default_resolve_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub resolve_timeout: Duration,

    #[serde(default)]
    pub output: OutputFormat,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            resolve_timeout: default_resolve_timeout(),
            output: OutputFormat::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// The first existing configuration file among the known locations.
    pub fn search_config_file_path() -> Option<PathBuf> {
        deploytree_base::config_file_candidates()
            .into_iter()
            .find(|path| path.try_exists().unwrap_or(false))
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let path =
                path.as_ref().try_resolve().map(|path| path.to_path_buf()).with_context(|_| {
                    error::ResolveFilePathSnafu { file_path: path.as_ref().to_path_buf() }
                })?;
            let data =
                std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
            serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })?
        };

        config.log.file_path = config
            .log
            .file_path
            .map(|path| {
                path.try_resolve()
                    .map(|resolved| resolved.to_path_buf())
                    .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
            })
            .transpose()?;

        Ok(config)
    }

    /// Loads `path` when given, otherwise the first configuration file found
    /// by [`Config::search_config_file_path`], falling back to defaults.
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self, Error> {
        match path.or_else(Self::search_config_file_path) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        serde_yaml::to_string(self).context(error::SerializeConfigSnafu)
    }
}

fn default_namespace() -> String { consts::DEFAULT_NAMESPACE.to_string() }

const fn default_resolve_timeout() -> Duration { consts::DEFAULT_RESOLVE_TIMEOUT }
