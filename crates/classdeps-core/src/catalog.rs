//! The class catalog: every class of the input archives, by binary name

use crate::classfile::{parse_class, ClassParseError, ClassRecord};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ZIP error while reading {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("Class parse error in {path}!{entry}: {source}")]
    ClassFile {
        path: PathBuf,
        entry: String,
        #[source]
        source: ClassParseError,
    },
}

/// Insertion-ordered map from binary class name to its decoded record.
///
/// When several archives contain the same class, the one loaded last wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: IndexMap<String, Arc<ClassRecord>>,
    archives: Vec<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every `.class` entry of every archive, in order.
    #[instrument(skip_all, fields(archives = archives.len()))]
    pub fn load<P: AsRef<Path>>(archives: &[P]) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for archive in archives {
            catalog.load_archive(archive.as_ref())?;
        }
        info!(
            "Loaded {} classes from {} archives",
            catalog.len(),
            catalog.archives.len()
        );
        Ok(catalog)
    }

    /// Builds a catalog from already decoded records, later duplicates winning.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ClassRecord>,
    {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    fn load_archive(&mut self, path: &Path) -> Result<(), CatalogError> {
        debug!("Scanning archive {}", path.display());

        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|source| CatalogError::Zip {
                path: path.to_path_buf(),
                source,
            })?;

        let before = self.len();
        let mut buffer = Vec::new();

        for idx in 0..archive.len() {
            let mut entry = archive.by_index(idx).map_err(|source| CatalogError::Zip {
                path: path.to_path_buf(),
                source,
            })?;

            if entry.is_dir() || !entry.name().ends_with(".class") {
                continue;
            }
            let name = entry.name().to_string();

            buffer.clear();
            entry
                .read_to_end(&mut buffer)
                .map_err(|source| CatalogError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;

            let record = parse_class(&buffer).map_err(|source| CatalogError::ClassFile {
                path: path.to_path_buf(),
                entry: name.clone(),
                source,
            })?;
            trace!("{} -> {}", name, record.name);
            self.insert(record);
        }

        debug!(
            "Archive {} contributed {} new classes",
            path.display(),
            self.len() - before
        );
        self.archives.push(path.to_path_buf());
        Ok(())
    }

    /// Inserts a record under its own name, replacing any previous entry.
    pub fn insert(&mut self, record: ClassRecord) {
        self.classes.insert(record.name.clone(), Arc::new(record));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ClassRecord>> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ClassRecord>)> {
        self.classes.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Archives loaded so far, in load order.
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }
}
