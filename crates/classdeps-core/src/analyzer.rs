//! One-call analysis: load, select, close

use crate::catalog::Catalog;
use crate::closure::{Closure, ClosureEngine};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::glob::{ClassGlob, GlobError};
use crate::runtime::BaseRuntime;
use crate::seeds::select_seeds;
use tracing::info;

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub catalog_size: usize,
    pub seeds: usize,
    pub closure: Closure,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Loads the configured archives and analyzes them.
    pub fn analyze(&self, runtime: &dyn BaseRuntime) -> Result<Analysis, AnalyzerError> {
        info!("Loading {} archives", self.config.archives.len());
        let catalog = Catalog::load(&self.config.archives)?;
        self.analyze_catalog(&catalog, runtime)
    }

    pub fn analyze_catalog(
        &self,
        catalog: &Catalog,
        runtime: &dyn BaseRuntime,
    ) -> Result<Analysis, AnalyzerError> {
        let globs = self.compile_globs()?;
        let seeds = select_seeds(&globs, &self.config.derive_from, catalog)?;
        info!("Found {} classes to keep from {} in the catalog", seeds.len(), catalog.len());

        let seed_count = seeds.len();
        let engine = ClosureEngine::new(catalog, runtime, self.config.namespace.namespace());
        let closure = engine.close(seeds);

        Ok(Analysis {
            catalog_size: catalog.len(),
            seeds: seed_count,
            closure,
        })
    }

    pub fn compile_globs(&self) -> Result<Vec<ClassGlob>, GlobError> {
        self.config
            .include
            .iter()
            .map(|pattern| ClassGlob::compile(pattern))
            .collect()
    }
}
