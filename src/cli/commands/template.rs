//! Template Command
//!
//! Render a React or Java starter project and write it to disk.
//!
//! Usage:
//!   archwright template react --name shop --cloud aws -o ./shop-web
//!   archwright template java --name orders --cloud azure --database cosmosdb -o ./orders

use std::path::Path;

use crate::cli::Output;
use crate::config::Config;
use crate::templates::{self, TemplateConfig};
use crate::types::{ArchError, Result};

pub fn run(config: &Config, template: &TemplateConfig, output: &Path, out: &Output) -> Result<()> {
    if !config.features.templates {
        return Err(ArchError::Config(
            "Template generation is disabled (features.templates = false)".to_string(),
        ));
    }

    // Validation happens inside generate, so nothing is written on bad input
    let set = templates::generate(template)?;
    let written = templates::write_to_dir(&set, output)?;

    out.success(&format!(
        "Generated {} template for {} ({} files)",
        template.kind,
        template.app_name,
        written.len()
    ));
    for path in &written {
        out.field("", path.display());
    }
    Ok(())
}
