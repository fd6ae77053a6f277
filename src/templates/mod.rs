//! Starter-Code Templates
//!
//! Renders React frontends and Spring Boot services for a cloud provider.
//! Skeletons are plain text with `{{name}}` placeholders; conditional blocks
//! are assembled in Rust and substituted as ordinary variables, so output is
//! fully determined by the [`TemplateConfig`].

mod java;
mod react;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::constants::templates as defaults;
use crate::types::{ArchError, CloudProvider, DatabaseType, Result, ValidationError};

/// Relative path → file contents, ordered by path
pub type TemplateSet = BTreeMap<String, String>;

/// Placeholder values for [`render`]
pub type Vars = BTreeMap<&'static str, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([a-z_][a-z0-9_]*)\}\}").expect("valid placeholder regex"));

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)*$").expect("valid package regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    React,
    Java,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::React, TemplateKind::Java];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Java => "java",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "react" | "frontend" | "react-frontend" => Ok(Self::React),
            "java" | "spring" | "backend" | "java-microservices" => Ok(Self::Java),
            other => Err(
                ValidationError::field("kind", format!("unknown template kind '{}'", other)).into(),
            ),
        }
    }
}

/// Inputs for one template rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub app_name: String,
    /// Provider name, validated into [`CloudProvider`] before rendering
    pub provider: String,
    pub kind: TemplateKind,

    pub authentication: bool,
    pub pwa: bool,
    pub typescript: bool,
    pub cache: bool,
    pub security: bool,
    pub monitoring: bool,

    pub package_name: String,
    pub database: DatabaseType,
    pub java_version: String,
    pub spring_boot_version: String,
    pub api_endpoint: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            provider: CloudProvider::Aws.as_str().to_string(),
            kind: TemplateKind::React,
            authentication: true,
            pwa: true,
            typescript: true,
            cache: true,
            security: true,
            monitoring: true,
            package_name: defaults::DEFAULT_PACKAGE_NAME.to_string(),
            database: DatabaseType::default(),
            java_version: defaults::DEFAULT_JAVA_VERSION.to_string(),
            spring_boot_version: defaults::DEFAULT_SPRING_BOOT_VERSION.to_string(),
            api_endpoint: defaults::DEFAULT_API_ENDPOINT.to_string(),
        }
    }
}

impl TemplateConfig {
    pub fn new(app_name: impl Into<String>, provider: impl Into<String>, kind: TemplateKind) -> Self {
        Self {
            app_name: app_name.into(),
            provider: provider.into(),
            kind,
            ..Default::default()
        }
    }

    /// Check every input and resolve the provider
    pub fn validate(&self) -> Result<CloudProvider> {
        let provider: CloudProvider = self.provider.parse()?;

        if self.app_name.trim().is_empty() {
            return Err(ValidationError::field("app_name", "must not be empty").into());
        }
        if slug(&self.app_name).is_empty() {
            return Err(ValidationError::field(
                "app_name",
                format!("'{}' has no usable characters", self.app_name),
            )
            .into());
        }
        if !PACKAGE_NAME.is_match(&self.package_name) {
            return Err(ValidationError::field(
                "package_name",
                format!("'{}' is not a valid Java package name", self.package_name),
            )
            .into());
        }
        if self.java_version.trim().is_empty() || self.spring_boot_version.trim().is_empty() {
            return Err(ValidationError::field("java_version", "versions must not be empty").into());
        }

        Ok(provider)
    }
}

/// Substitute `{{name}}` placeholders. Unknown names are left verbatim.
pub fn render(skeleton: &str, vars: &Vars) -> String {
    PLACEHOLDER
        .replace_all(skeleton, |caps: &regex::Captures<'_>| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Validate the config and render the template set for its kind
pub fn generate(config: &TemplateConfig) -> Result<TemplateSet> {
    let provider = config.validate()?;

    let set = match config.kind {
        TemplateKind::React => react::generate(config, provider),
        TemplateKind::Java => java::generate(config, provider),
    };

    info!(
        kind = %config.kind,
        provider = %provider,
        app = %config.app_name,
        files = set.len(),
        "Template generated"
    );
    Ok(set)
}

/// Write a template set under `dir`, creating parent directories
pub fn write_to_dir(set: &TemplateSet, dir: &Path) -> Result<Vec<PathBuf>> {
    // Reject escaping paths before touching the filesystem
    for relative in set.keys() {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.as_os_str().is_empty() {
            return Err(ValidationError::field(
                "path",
                format!("'{}' is not a relative file path", relative),
            )
            .into());
        }
    }

    let mut written = Vec::with_capacity(set.len());
    for (relative, contents) in set {
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, contents)?;
        debug!(path = %target.display(), "Wrote template file");
        written.push(target);
    }
    Ok(written)
}

/// Lowercase, dash-separated form of a display name
pub(crate) fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&'static str, &str)]) -> Vars {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_known_and_unknown() {
        let out = render(
            "name={{app_name}} other={{missing}} jsx={{ a: 1 }}",
            &vars(&[("app_name", "shop")]),
        );
        assert_eq!(out, "name=shop other={{missing}} jsx={{ a: 1 }}");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("My Cool App"), "my-cool-app");
        assert_eq!(slug("  order_service "), "order-service");
        assert_eq!(slug("!!!"), "");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("React".parse::<TemplateKind>().unwrap(), TemplateKind::React);
        assert_eq!("java-microservices".parse::<TemplateKind>().unwrap(), TemplateKind::Java);
        assert!("cobol".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let gcp = TemplateConfig::new("shop", "gcp", TemplateKind::React);
        assert!(matches!(gcp.validate(), Err(ArchError::Validation(_))));

        let empty = TemplateConfig::new("  ", "aws", TemplateKind::React);
        assert!(empty.validate().is_err());

        let mut bad_pkg = TemplateConfig::new("shop", "azure", TemplateKind::Java);
        bad_pkg.package_name = "Com.Example-Shop".into();
        assert!(bad_pkg.validate().is_err());

        let ok = TemplateConfig::new("shop", "Azure", TemplateKind::Java);
        assert_eq!(ok.validate().unwrap(), CloudProvider::Azure);
    }

    #[test]
    fn test_unknown_provider_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = TemplateConfig::new("shop", "oracle", TemplateKind::Java);

        let result = generate(&config).and_then(|set| write_to_dir(&set, dir.path()));
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = TempDir::new().unwrap();
        let set = generate(&TemplateConfig::new("shop", "aws", TemplateKind::React)).unwrap();

        let written = write_to_dir(&set, dir.path()).unwrap();
        assert_eq!(written.len(), set.len());
        let app = std::fs::read_to_string(dir.path().join("src/App.tsx")).unwrap();
        assert_eq!(&app, &set["src/App.tsx"]);
    }

    #[test]
    fn test_write_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let mut set = TemplateSet::new();
        set.insert("../outside.txt".into(), "x".into());
        assert!(write_to_dir(&set, dir.path()).is_err());
    }

    #[test]
    fn test_no_placeholders_left() {
        for kind in TemplateKind::ALL {
            for provider in CloudProvider::ALL {
                let config = TemplateConfig::new("Order Service", provider.as_str(), kind);
                for (path, contents) in generate(&config).unwrap() {
                    assert!(
                        !PLACEHOLDER.is_match(&contents),
                        "unrendered placeholder in {}",
                        path
                    );
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_generation_deterministic(
            name in "[A-Za-z][A-Za-z0-9 ]{0,20}",
            azure in any::<bool>(),
            java in any::<bool>(),
            flags in any::<[bool; 6]>(),
        ) {
            let provider = if azure { "azure" } else { "aws" };
            let kind = if java { TemplateKind::Java } else { TemplateKind::React };
            let mut config = TemplateConfig::new(name, provider, kind);
            config.authentication = flags[0];
            config.pwa = flags[1];
            config.typescript = flags[2];
            config.cache = flags[3];
            config.security = flags[4];
            config.monitoring = flags[5];

            let first = generate(&config).unwrap();
            let second = generate(&config).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
