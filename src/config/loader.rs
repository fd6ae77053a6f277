//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/archwright/config.yaml)
//! 3. Project config (.archwright/config.yaml)
//! 4. Environment variables (ARCHWRIGHT_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{ArchError, Result};

const APP_DIR: &str = "archwright";
const CONFIG_FILE: &str = "config.yaml";
const ENV_PREFIX: &str = "ARCHWRIGHT_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolve the chain against explicit file locations
    pub fn load_layered(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Yaml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Yaml::file(project));
        }

        // ARCHWRIGHT_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ArchError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
            .map_err(|e| ArchError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/archwright/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".config")))
            .map(|p| p.join(APP_DIR))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join(CONFIG_FILE)
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".archwright")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print!("{}", serde_yaml::to_string(&config)?);
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ArchError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, force)?;
        Ok(global_dir)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        Self::write_default(&project_dir, force)?;
        Ok(project_dir)
    }

    /// Write the default config file into `dir`, keeping an existing one unless forced
    pub fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_yaml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Default config content (YAML)
    fn default_config_yaml() -> &'static str {
        r#"# Archwright Configuration
# API keys are read from GEMINI_API_KEY / OPENAI_API_KEY, never from this file.

version: "1.0"

llm:
  provider: gemini
  model: gemini-1.5-pro
  temperature: 0.7
  top_p: 0.8
  top_k: 40
  max_tokens: 8192
  timeout_secs: 120
  max_retries: 3
  retry_base_delay_ms: 1000

cloud:
  aws_region: us-east-1
  azure_location: eastus

learning:
  storage_path: .archwright/feedback.json

server:
  host: 127.0.0.1
  port: 8000
  enable_cors: true
  max_sessions: 1000
  session_ttl_secs: 3600

features:
  templates: true
  learning: true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_layered(None, &temp_dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.yaml");
        let project = temp_dir.path().join("project.yaml");
        fs::write(&global, "llm:\n  model: global-model\n  top_k: 10\n").unwrap();
        fs::write(&project, "llm:\n  model: project-model\n").unwrap();

        let config = ConfigLoader::load_layered(Some(&global), &project).unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.llm.top_k, 10);
    }

    #[test]
    fn test_written_default_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_default(temp_dir.path(), false).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.cloud.azure_location, "eastus");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "llm:\n  temperature: 3.5\n").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(ArchError::Config(_))
        ));
    }

    #[test]
    fn test_env_override() {
        // SAFETY: no other test reads this variable
        unsafe {
            std::env::set_var("ARCHWRIGHT_CLOUD__AWS_REGION", "eu-west-1");
        }
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_layered(None, &temp_dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config.cloud.aws_region, "eu-west-1");
        unsafe {
            std::env::remove_var("ARCHWRIGHT_CLOUD__AWS_REGION");
        }
    }
}
