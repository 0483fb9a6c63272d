mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub install_path: Option<PathBuf>,
    pub search_index_path: Option<PathBuf>,
    pub search_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub install_path: PathBuf,
    pub search_index_path: PathBuf,
    /// `None` means searches run until done or interrupted.
    pub search_timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let install_path = file
            .install_path
            .map(PathBuf::from)
            .or_else(|| cli.install_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "install_path must be specified via --install-path or in config file"
                )
            })?;

        if !install_path.exists() {
            bail!("Install directory does not exist: {:?}", install_path);
        }
        if !install_path.is_dir() {
            bail!("install_path is not a directory: {:?}", install_path);
        }

        let search_index_path = file
            .search_index_path
            .map(PathBuf::from)
            .or_else(|| cli.search_index_path.clone())
            .unwrap_or_else(|| install_path.join("search-index").join("cars.db"));

        let search_timeout = file
            .search_timeout_ms
            .or(cli.search_timeout_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Ok(Self {
            install_path,
            search_index_path,
            search_timeout,
        })
    }

    pub fn cars_dir(&self) -> PathBuf {
        self.install_path.join("content").join("cars")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.install_path.join("results")
    }
}
