//! Classification report rendering

use anyhow::Result;
use clap::ValueEnum;
use classdeps_core::Analysis;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Names and counts of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub catalog_size: usize,
    pub seeds: usize,
    pub rounds: usize,
    pub kept: Vec<String>,
    pub dependencies: Vec<String>,
}

impl Report {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            catalog_size: analysis.catalog_size,
            seeds: analysis.seeds,
            rounds: analysis.closure.rounds(),
            kept: analysis.closure.kept().keys().cloned().collect(),
            dependencies: analysis.closure.dependencies().keys().cloned().collect(),
        }
    }

    pub fn render(&self, format: ReportFormat, summary: bool) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text(summary)),
            ReportFormat::Json if summary => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "catalog_size": self.catalog_size,
                "seeds": self.seeds,
                "rounds": self.rounds,
                "kept": self.kept.len(),
                "dependencies": self.dependencies.len(),
            }))?),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_text(&self, summary: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Catalog: {} classes", self.catalog_size);
        let _ = writeln!(out, "Seeds: {} classes", self.seeds);
        let _ = writeln!(out, "Rounds: {}", self.rounds);
        for (title, names) in [("Keep", &self.kept), ("Dependencies", &self.dependencies)] {
            let _ = writeln!(out, "{}: {} classes", title, names.len());
            if !summary {
                for name in names {
                    let _ = writeln!(out, "  {}", name);
                }
            }
        }
        out
    }
}
