//! Seed selection: the classes a run starts from

use crate::ancestry::descendants_of;
use crate::catalog::Catalog;
use crate::classfile::ClassRecord;
use crate::glob::ClassGlob;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Name-ordered set of classes, each backed by its catalog record.
pub type ClassSet = BTreeMap<String, Arc<ClassRecord>>;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("class {name} not found in any of the archives: {}", format_archives(.archives))]
    NotFound {
        name: String,
        archives: Vec<PathBuf>,
    },
}

fn format_archives(archives: &[PathBuf]) -> String {
    if archives.is_empty() {
        return "(none)".to_string();
    }
    archives
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Selects every catalog class matched by one of `globs`, plus every class
/// deriving from one of `ancestors` and each ancestor present in the catalog.
///
/// A literal glob naming a class the catalog does not contain is an error.
#[instrument(skip_all, fields(globs = globs.len(), ancestors = ancestors.len()))]
pub fn select_seeds<S: AsRef<str>>(
    globs: &[ClassGlob],
    ancestors: &[S],
    catalog: &Catalog,
) -> Result<ClassSet, SelectionError> {
    let mut seeds = ClassSet::new();

    for glob in globs {
        if glob.is_literal() && !catalog.contains(glob.as_str()) {
            return Err(SelectionError::NotFound {
                name: glob.as_str().to_string(),
                archives: catalog.archives().to_vec(),
            });
        }

        let before = seeds.len();
        let mut matched = 0usize;
        for (name, record) in catalog.iter() {
            if glob.matches(name) {
                matched += 1;
                seeds
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::clone(record));
            }
        }
        if matched == 0 {
            warn!("Pattern {} matched no class", glob);
        } else {
            debug!(
                "Pattern {} matched {} classes ({} new)",
                glob,
                matched,
                seeds.len() - before
            );
        }
    }

    for ancestor in ancestors {
        let ancestor = ancestor.as_ref();
        let descendants = descendants_of(ancestor, catalog);

        match catalog.get(ancestor) {
            Some(record) => {
                seeds
                    .entry(ancestor.to_string())
                    .or_insert_with(|| Arc::clone(record));
            }
            None if descendants.is_empty() => {
                warn!("Ancestor {} is not in the catalog and has no subclasses", ancestor);
            }
            None => {}
        }

        debug!("Ancestor {} has {} subclasses", ancestor, descendants.len());
        for name in descendants {
            if let Some(record) = catalog.get(&name) {
                seeds.entry(name).or_insert_with(|| Arc::clone(record));
            }
        }
    }

    debug!("Selected {} seed classes", seeds.len());
    Ok(seeds)
}
