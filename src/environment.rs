// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 4002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub port: u16,
    /// Where the CLI writes exported PDFs.
    pub output_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            output_path: PathBuf::from("out"),
            log_path: PathBuf::from("logs/cv-builder.log"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load configuration for the current environment from `config.yaml`,
    /// falling back to defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);
        Self::load_from_file(Path::new(CONFIG_FILE), &environment)
    }

    fn get_environment() -> String {
        std::env::var("CV_BUILDER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        let env_config = if config_path.exists() {
            let config_content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config_file: ConfigFile = serde_yaml::from_str(&config_content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;

            match environment {
                "production" => config_file.production,
                _ => config_file.local,
            }
        } else {
            warn!(
                "{} not found, using default configuration",
                config_path.display()
            );
            Self::default()
        };

        let port = match std::env::var("ROCKET_PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("Invalid ROCKET_PORT: {value}"))?,
            Err(_) => env_config.port,
        };

        Ok(Self {
            port,
            output_path: Self::resolve_path(&env_config.output_path)?,
            log_path: Self::resolve_path(&env_config.log_path)?,
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Ensure the output and log directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_path)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.output_path.display()))?;

        if let Some(log_parent) = self.log_path.parent() {
            tokio::fs::create_dir_all(log_parent)
                .await
                .with_context(|| format!("Failed to create log directory: {}", log_parent.display()))?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}
