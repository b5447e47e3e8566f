//! Base-runtime oracles
//!
//! A [`BaseRuntime`] answers whether the target platform already provides a
//! class. Provided classes are neither kept nor turned into dependencies.

use crate::catalog::CatalogError;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Resolvability oracle consulted for every newly discovered class.
///
/// Implementations must be pure: the same name always gets the same answer.
pub trait BaseRuntime {
    fn provides(&self, name: &str) -> bool;
}

impl<F> BaseRuntime for F
where
    F: Fn(&str) -> bool,
{
    fn provides(&self, name: &str) -> bool {
        self(name)
    }
}

/// Provides nothing: every catalog class is either kept or a dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseRuntime;

impl BaseRuntime for NoBaseRuntime {
    fn provides(&self, _name: &str) -> bool {
        false
    }
}

/// Provides every class in one of a list of packages, sub-packages included.
#[derive(Debug, Clone, Default)]
pub struct PackageRuntime {
    packages: Vec<String>,
}

impl PackageRuntime {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// `java.**` and `javax.**`.
    pub fn java_platform() -> Self {
        Self::new(["java", "javax"])
    }
}

impl BaseRuntime for PackageRuntime {
    fn provides(&self, name: &str) -> bool {
        self.packages.iter().any(|package| {
            name.strip_prefix(package.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

/// Provides every class stored in a set of platform archives such as
/// `android.jar`. Only entry names are read; the classes are not decoded.
#[derive(Debug, Clone, Default)]
pub struct ArchiveRuntime {
    classes: HashSet<String>,
}

impl ArchiveRuntime {
    pub fn load<P: AsRef<Path>>(archives: &[P]) -> Result<Self, CatalogError> {
        let mut classes = HashSet::new();
        for archive in archives {
            let path = archive.as_ref();
            let file = File::open(path).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut zip =
                ZipArchive::new(BufReader::new(file)).map_err(|source| CatalogError::Zip {
                    path: path.to_path_buf(),
                    source,
                })?;
            let before = classes.len();
            for idx in 0..zip.len() {
                let entry = zip.by_index(idx).map_err(|source| CatalogError::Zip {
                    path: path.to_path_buf(),
                    source,
                })?;
                if let Some(stem) = entry.name().strip_suffix(".class") {
                    classes.insert(stem.replace('/', "."));
                }
            }
            debug!(
                "Base runtime archive {} provides {} classes",
                path.display(),
                classes.len() - before
            );
        }
        Ok(Self { classes })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl BaseRuntime for ArchiveRuntime {
    fn provides(&self, name: &str) -> bool {
        self.classes.contains(name)
    }
}

/// Union of several oracles.
#[derive(Default)]
pub struct LayeredRuntime {
    layers: Vec<Box<dyn BaseRuntime>>,
}

impl LayeredRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl BaseRuntime + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn push(&mut self, layer: impl BaseRuntime + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for LayeredRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredRuntime")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl BaseRuntime for LayeredRuntime {
    fn provides(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.provides(name))
    }
}
