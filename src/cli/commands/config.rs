//! Config Command
//!
//! Manage Archwright configuration.
//!
//! Usage:
//!   archwright config show [-g] [-f json]
//!   archwright config path
//!   archwright config init [-g] [--force]

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str, out: &Output) -> Result<()> {
    if !global {
        // Merged effective config
        return ConfigLoader::show_config(format == "json");
    }

    match ConfigLoader::global_config_path() {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            if format != "yaml" {
                println!("# Global Config: {}\n", path.display());
            }
            println!("{}", content);
        }
        Some(_) => {
            out.info("No global config found. Run 'archwright config init --global' to create one.");
        }
        None => out.warning("Cannot determine global config directory."),
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file, globally or for the current project
pub fn init(global: bool, force: bool, out: &Output) -> Result<()> {
    let dir = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    out.success(&format!(
        "Initialized {} configuration",
        if global { "global" } else { "project" }
    ));
    out.field("directory", dir.display());
    Ok(())
}
