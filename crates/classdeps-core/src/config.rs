//! Analyzer configuration
//!
//! Deserialized from the `[analysis]` table of `classdeps.toml` by the CLI;
//! every field has a default so partial files are accepted.

use crate::catalog::CatalogError;
use crate::closure::{Namespace, NamespaceMode};
use crate::runtime::{ArchiveRuntime, LayeredRuntime, PackageRuntime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Archives to load, in order; later archives override earlier ones.
    #[serde(default)]
    pub archives: Vec<PathBuf>,
    /// Class globs selecting seeds.
    #[serde(default)]
    pub include: Vec<String>,
    /// Classes whose subclasses are seeds, the classes themselves included.
    #[serde(default)]
    pub derive_from: Vec<String>,
    #[serde(default)]
    pub namespace: NamespaceConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default = "default_namespace_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub mode: NamespaceMode,
}

fn default_namespace_pattern() -> String {
    "android".to_string()
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            pattern: default_namespace_pattern(),
            mode: NamespaceMode::default(),
        }
    }
}

impl NamespaceConfig {
    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.pattern.clone(), self.mode)
    }
}

/// Classes already present on the target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Package prefixes provided by the platform. Defaults to `java` and
    /// `javax`; an explicit empty list provides nothing.
    #[serde(default = "default_runtime_packages")]
    pub packages: Vec<String>,
    /// Platform archives whose classes are all provided.
    #[serde(default)]
    pub archives: Vec<PathBuf>,
}

fn default_runtime_packages() -> Vec<String> {
    vec!["java".to_string(), "javax".to_string()]
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            packages: default_runtime_packages(),
            archives: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Builds the oracle; an empty configuration provides nothing.
    pub fn build(&self) -> Result<LayeredRuntime, CatalogError> {
        let mut runtime = LayeredRuntime::new();
        if !self.packages.is_empty() {
            runtime.push(PackageRuntime::new(self.packages.iter().cloned()));
        }
        if !self.archives.is_empty() {
            runtime.push(ArchiveRuntime::load(&self.archives)?);
        }
        Ok(runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::BaseRuntime;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config: AnalyzerConfig = toml::from_str("").expect("empty config");
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.namespace.pattern, "android");
        assert_eq!(config.namespace.mode, NamespaceMode::Substring);
        assert_eq!(config.runtime.packages, ["java", "javax"]);
    }

    #[test]
    fn test_platform_packages_provided_by_default() {
        let runtime = RuntimeConfig::default().build().expect("no archives to read");
        assert!(runtime.provides("java.lang.String"));
        assert!(runtime.provides("javax.annotation.Nullable"));
        assert!(!runtime.provides("android.view.View"));

        let opted_out: AnalyzerConfig =
            toml::from_str("[runtime]\npackages = []\n").expect("valid config");
        let runtime = opted_out.runtime.build().expect("no archives to read");
        assert!(!runtime.provides("java.lang.String"));
    }

    #[test]
    fn test_full_config() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            archives = ["framework.jar", "ext.jar"]
            include = ["android.view.*", "com.android.internal.**"]
            derive_from = ["android.app.Activity"]

            [namespace]
            pattern = "android"
            mode = "prefix"

            [runtime]
            packages = ["java", "javax"]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.archives.len(), 2);
        assert_eq!(config.include[1], "com.android.internal.**");
        assert_eq!(config.derive_from, ["android.app.Activity"]);
        assert_eq!(config.namespace.namespace(), Namespace::prefix("android"));

        let runtime = config.runtime.build().expect("no archives to read");
        assert!(runtime.provides("java.util.List"));
        assert!(!runtime.provides("android.view.View"));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result: Result<AnalyzerConfig, _> = toml::from_str("[namespace]\nmode = \"regex\"\n");
        assert!(result.is_err());
    }
}
