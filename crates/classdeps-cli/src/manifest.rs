//! `classdeps.toml` loading and merging with command-line flags
//!
//! ```toml
//! [analysis]
//! archives = ["libs/framework.jar", "build/app.jar"]
//! include = ["com.example.**"]
//! derive_from = ["android.app.Activity"]
//!
//! [analysis.namespace]
//! pattern = "android"
//! mode = "prefix"
//!
//! [analysis.runtime]
//! packages = ["java", "javax"]
//!
//! [output]
//! format = "json"
//! ```

use crate::report::ReportFormat;
use anyhow::{Context, Result};
use clap::ValueEnum;
use classdeps_core::{AnalyzerConfig, NamespaceMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub analysis: AnalyzerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ReportFormat,
    /// Print counts only, without class names.
    #[serde(default)]
    pub summary: bool,
    /// Write the report here instead of stdout.
    pub path: Option<PathBuf>,
}

/// `--namespace-mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Substring,
    Prefix,
}

impl From<ModeArg> for NamespaceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Substring => NamespaceMode::Substring,
            ModeArg::Prefix => NamespaceMode::Prefix,
        }
    }
}

/// Values given on the command line. Lists extend the manifest, single
/// values replace it.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub archives: Vec<PathBuf>,
    pub include: Vec<String>,
    pub derive_from: Vec<String>,
    pub namespace: Option<String>,
    pub namespace_mode: Option<ModeArg>,
    pub runtime_packages: Vec<String>,
    pub runtime_archives: Vec<PathBuf>,
    pub format: Option<ReportFormat>,
    pub summary: bool,
    pub output: Option<PathBuf>,
}

impl Manifest {
    /// Load manifest from file. Relative archive paths are resolved against
    /// the manifest's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let mut manifest: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            manifest.resolve_paths(base);
        }
        Ok(manifest)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |paths: &mut Vec<PathBuf>| {
            for path in paths.iter_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        resolve(&mut self.analysis.archives);
        resolve(&mut self.analysis.runtime.archives);
        if let Some(output) = self.output.path.as_mut() {
            if output.is_relative() {
                *output = base.join(&*output);
            }
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        let analysis = &mut self.analysis;
        analysis.archives.extend(overrides.archives);
        analysis.include.extend(overrides.include);
        analysis.derive_from.extend(overrides.derive_from);
        analysis.runtime.packages.extend(overrides.runtime_packages);
        analysis.runtime.archives.extend(overrides.runtime_archives);
        if let Some(pattern) = overrides.namespace {
            analysis.namespace.pattern = pattern;
        }
        if let Some(mode) = overrides.namespace_mode {
            analysis.namespace.mode = mode.into();
        }

        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        self.output.summary |= overrides.summary;
        if let Some(path) = overrides.output {
            self.output.path = Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_manifest() -> Result<()> {
        let manifest: Manifest = toml::from_str("")?;
        assert_eq!(manifest, Manifest::default());
        assert_eq!(manifest.output.format, ReportFormat::Text);
        Ok(())
    }

    #[test]
    fn test_flags_extend_and_override() -> Result<()> {
        let mut manifest: Manifest = toml::from_str(
            r#"
            [analysis]
            archives = ["a.jar"]
            include = ["com.a.*"]

            [analysis.namespace]
            pattern = "android"
            "#,
        )?;

        manifest.apply(Overrides {
            archives: vec![PathBuf::from("b.jar")],
            include: vec!["com.b.**".to_string()],
            namespace: Some("com.vendor".to_string()),
            namespace_mode: Some(ModeArg::Prefix),
            format: Some(ReportFormat::Json),
            ..Default::default()
        });

        assert_eq!(
            manifest.analysis.archives,
            [PathBuf::from("a.jar"), PathBuf::from("b.jar")]
        );
        assert_eq!(manifest.analysis.include, ["com.a.*", "com.b.**"]);
        assert_eq!(manifest.analysis.namespace.pattern, "com.vendor");
        assert_eq!(manifest.analysis.namespace.mode, NamespaceMode::Prefix);
        assert_eq!(manifest.output.format, ReportFormat::Json);
        assert!(!manifest.output.summary);
        Ok(())
    }
}
