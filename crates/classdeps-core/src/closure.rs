//! Dependency closure
//!
//! Starting from the seed classes, the engine repeatedly walks newly found
//! classes and sorts every class they reference into one of two sets:
//!
//! - **kept**: classes outside the dependency namespace, carried over as-is
//! - **dependencies**: classes inside the namespace, which need a placeholder
//!
//! Names missing from the catalog and names the base runtime provides are
//! dropped. Each class is walked once; the run stops when a round discovers
//! nothing new.

use crate::catalog::Catalog;
use crate::references::extract_references;
use crate::runtime::BaseRuntime;
use crate::seeds::ClassSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// How [`Namespace::contains`] compares a class name with the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceMode {
    /// The name contains the pattern anywhere.
    #[default]
    Substring,
    /// The name is the pattern or lies under it as a package prefix.
    Prefix,
}

/// The set of names treated as dependencies rather than kept classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pattern: String,
    mode: NamespaceMode,
}

impl Namespace {
    pub fn new(pattern: impl Into<String>, mode: NamespaceMode) -> Self {
        Self {
            pattern: pattern.into(),
            mode,
        }
    }

    pub fn substring(pattern: impl Into<String>) -> Self {
        Self::new(pattern, NamespaceMode::Substring)
    }

    pub fn prefix(pattern: impl Into<String>) -> Self {
        Self::new(pattern, NamespaceMode::Prefix)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mode(&self) -> NamespaceMode {
        self.mode
    }

    /// The empty pattern contains every name.
    pub fn contains(&self, name: &str) -> bool {
        if self.pattern.is_empty() {
            return true;
        }
        match self.mode {
            NamespaceMode::Substring => name.contains(self.pattern.as_str()),
            NamespaceMode::Prefix => name
                .strip_prefix(self.pattern.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
        }
    }
}

/// Classes discovered during the current round, not yet merged.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    pub kept: ClassSet,
    pub dependencies: ClassSet,
}

impl Frontier {
    pub fn contains(&self, name: &str) -> bool {
        self.kept.contains_key(name) || self.dependencies.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty() && self.dependencies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kept.len() + self.dependencies.len()
    }
}

/// Outcome of classifying one referenced name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Already kept, already a dependency, or already in the frontier.
    Known,
    /// Not in the catalog.
    Unknown,
    /// Provided by the base runtime.
    BaseRuntime,
    /// New dependency.
    Dependency,
    /// New kept class.
    Keep,
}

/// Decides where a referenced name belongs. Checks run in order: known,
/// catalog, base runtime, namespace.
pub struct Classifier<'a> {
    catalog: &'a Catalog,
    runtime: &'a dyn BaseRuntime,
    namespace: &'a Namespace,
}

impl<'a> Classifier<'a> {
    pub fn new(
        catalog: &'a Catalog,
        runtime: &'a dyn BaseRuntime,
        namespace: &'a Namespace,
    ) -> Self {
        Self {
            catalog,
            runtime,
            namespace,
        }
    }

    pub fn classify(
        &self,
        name: &str,
        kept: &ClassSet,
        dependencies: &ClassSet,
        frontier: &Frontier,
    ) -> Classification {
        if kept.contains_key(name) || dependencies.contains_key(name) || frontier.contains(name) {
            return Classification::Known;
        }
        if !self.catalog.contains(name) {
            return Classification::Unknown;
        }
        if self.runtime.provides(name) {
            return Classification::BaseRuntime;
        }
        if self.namespace.contains(name) {
            Classification::Dependency
        } else {
            Classification::Keep
        }
    }
}

/// Final kept and dependency sets.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    kept: ClassSet,
    dependencies: ClassSet,
    rounds: usize,
}

impl Closure {
    pub fn kept(&self) -> &ClassSet {
        &self.kept
    }

    pub fn dependencies(&self) -> &ClassSet {
        &self.dependencies
    }

    /// Number of walking passes, the seed pass included.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

/// Fixpoint expansion of a seed set over a catalog.
pub struct ClosureEngine<'a> {
    catalog: &'a Catalog,
    runtime: &'a dyn BaseRuntime,
    namespace: Namespace,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(catalog: &'a Catalog, runtime: &'a dyn BaseRuntime, namespace: Namespace) -> Self {
        Self {
            catalog,
            runtime,
            namespace,
        }
    }

    pub fn classifier(&self) -> Classifier<'_> {
        Classifier::new(self.catalog, self.runtime, &self.namespace)
    }

    #[instrument(skip_all, fields(seeds = seeds.len()))]
    pub fn close(&self, seeds: ClassSet) -> Closure {
        let classifier = self.classifier();
        let mut kept = seeds;
        let mut dependencies = ClassSet::new();
        let mut frontier = Frontier::default();

        let mut pending: Vec<Arc<_>> = kept.values().cloned().collect();
        let mut rounds = 0;

        loop {
            rounds += 1;
            for record in &pending {
                for name in extract_references(record) {
                    let classification =
                        classifier.classify(&name, &kept, &dependencies, &frontier);
                    trace!("{} -> {} is {:?}", record.name, name, classification);
                    self.admit(name, classification, &mut frontier);
                }
            }

            if frontier.is_empty() {
                break;
            }

            let Frontier {
                kept: new_kept,
                dependencies: new_dependencies,
            } = std::mem::take(&mut frontier);
            pending = new_kept.values().chain(new_dependencies.values()).cloned().collect();
            kept.extend(new_kept);
            dependencies.extend(new_dependencies);

            debug!(
                "Round {}: {} to keep, {} dependencies",
                rounds,
                kept.len(),
                dependencies.len()
            );
        }

        info!(
            "Closure complete after {} rounds: {} to keep, {} dependencies",
            rounds,
            kept.len(),
            dependencies.len()
        );

        Closure {
            kept,
            dependencies,
            rounds,
        }
    }

    fn admit(&self, name: String, classification: Classification, frontier: &mut Frontier) {
        let bucket = match classification {
            Classification::Keep => &mut frontier.kept,
            Classification::Dependency => &mut frontier.dependencies,
            Classification::Known | Classification::Unknown | Classification::BaseRuntime => return,
        };
        if let Some(record) = self.catalog.get(&name) {
            bucket.insert(name, Arc::clone(record));
        }
    }
}
