//! Server settings: `kernelboard.toml` overlaid by command-line flags.

use crate::error::CliError;
use kernelboard_report::DEFAULT_TITLE;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given and it exists.
pub(crate) const DEFAULT_CONFIG: &str = "kernelboard.toml";
pub(crate) const DEFAULT_PLAN: &str = "plan.yml";
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1";
pub(crate) const DEFAULT_PORT: u16 = 8501;

/// Contents of `kernelboard.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) plan: Option<PathBuf>,
    pub(crate) plans_dir: Option<PathBuf>,
    pub(crate) bind: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) title: Option<String>,
}

impl FileConfig {
    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `explicit` if given, else [`DEFAULT_CONFIG`] when present.
    pub(crate) fn discover(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path).map_err(|source| CliError::ConfigIo {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| CliError::Config {
            path: path.clone(),
            source,
        })?;
        log::info!("using config {}", path.display());
        Ok(config)
    }
}

/// Where the dashboard reads plans from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlanSource {
    File(PathBuf),
    Dir(PathBuf),
}

/// Values given on the command line for `serve`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ServeOverrides {
    pub(crate) plan: Option<PathBuf>,
    pub(crate) plans_dir: Option<PathBuf>,
    pub(crate) bind: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) title: Option<String>,
}

/// Effective `serve` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) source: PlanSource,
    pub(crate) bind: String,
    pub(crate) port: u16,
    pub(crate) title: String,
}

impl ServeConfig {
    /// Flags win over the file, the file wins over defaults. A plan source
    /// given on the command line replaces both sources from the file.
    pub(crate) fn resolve(flags: ServeOverrides, file: FileConfig) -> Self {
        let source = match (flags.plans_dir, flags.plan) {
            (Some(dir), _) => PlanSource::Dir(dir),
            (None, Some(plan)) => PlanSource::File(plan),
            (None, None) => match (file.plans_dir, file.plan) {
                (Some(dir), _) => PlanSource::Dir(dir),
                (None, Some(plan)) => PlanSource::File(plan),
                (None, None) => PlanSource::File(PathBuf::from(DEFAULT_PLAN)),
            },
        };
        Self {
            source,
            bind: flags
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: flags.port.or(file.port).unwrap_or(DEFAULT_PORT),
            title: flags
                .title
                .or(file.title)
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
