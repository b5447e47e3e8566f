//! Dependency closure over JVM class archives
//!
//! Loads the classes of one or more JAR files, selects seed classes by glob
//! and by ancestry, and follows every type reference until the set of
//! reachable classes is closed. Reachable classes are split into classes to
//! keep and dependencies that need a placeholder.

pub mod analyzer;
pub mod ancestry;
pub mod catalog;
pub mod classfile;
pub mod closure;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod glob;
pub mod references;
pub mod runtime;
pub mod seeds;
pub mod signature;

pub use analyzer::{Analysis, Analyzer};
pub use catalog::{Catalog, CatalogError};
pub use classfile::{parse_class, ClassParseError, ClassRecord};
pub use closure::{
    Classification, Classifier, Closure, ClosureEngine, Frontier, Namespace, NamespaceMode,
};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use glob::{ClassGlob, GlobError};
pub use references::extract_references;
pub use runtime::{ArchiveRuntime, BaseRuntime, LayeredRuntime, NoBaseRuntime, PackageRuntime};
pub use seeds::{select_seeds, ClassSet, SelectionError};
